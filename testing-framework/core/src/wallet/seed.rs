use std::fmt;

use super::WalletError;

/// Bytes of entropy behind every family seed.
pub const ENTROPY_LEN: usize = 16;

const SECP256K1_SEED_PREFIX: &[u8] = &[0x21];
const ED25519_SEED_PREFIX: &[u8] = &[0x01, 0xE1, 0x4B];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyType {
    Secp256k1,
    #[default]
    Ed25519,
}

impl KeyType {
    /// Name understood by the node's `key_type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
        }
    }

    const fn seed_prefix(self) -> &'static [u8] {
        match self {
            Self::Secp256k1 => SECP256K1_SEED_PREFIX,
            Self::Ed25519 => ED25519_SEED_PREFIX,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entropy plus the key algorithm it is expanded with.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    entropy: [u8; ENTROPY_LEN],
    key_type: KeyType,
}

impl Seed {
    #[must_use]
    pub const fn new(entropy: [u8; ENTROPY_LEN], key_type: KeyType) -> Self {
        Self { entropy, key_type }
    }

    /// Builds a seed from the first [`ENTROPY_LEN`] bytes of `bytes`.
    pub fn from_entropy_prefix(bytes: &[u8], key_type: KeyType) -> Result<Self, WalletError> {
        let prefix = bytes
            .get(..ENTROPY_LEN)
            .ok_or(WalletError::ShortEntropy(bytes.len()))?;
        let mut entropy = [0u8; ENTROPY_LEN];
        entropy.copy_from_slice(prefix);
        Ok(Self::new(entropy, key_type))
    }

    /// Parses a base58check family seed (`s...` or `sEd...`).
    pub fn decode(encoded: &str) -> Result<Self, WalletError> {
        let payload = bs58::decode(encoded.trim())
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check(None)
            .into_vec()?;

        let key_type = [KeyType::Ed25519, KeyType::Secp256k1]
            .into_iter()
            .find(|key_type| {
                let prefix = key_type.seed_prefix();
                payload.len() == prefix.len() + ENTROPY_LEN && payload.starts_with(prefix)
            })
            .ok_or(WalletError::UnknownSeedFormat { len: payload.len() })?;

        Self::from_entropy_prefix(&payload[key_type.seed_prefix().len()..], key_type)
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let mut payload = self.key_type.seed_prefix().to_vec();
        payload.extend_from_slice(&self.entropy);
        bs58::encode(payload)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check()
            .into_string()
    }

    #[must_use]
    pub const fn entropy(&self) -> &[u8; ENTROPY_LEN] {
        &self.entropy
    }

    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Upper-case hex of the entropy, as accepted by `seed_hex`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.entropy)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}
