mod keys;
mod seed;

use std::fmt;

use rand::{RngCore as _, SeedableRng as _};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

pub use keys::{PublicKeyBytes, address_for, derive_public_key};
pub use seed::{ENTROPY_LEN, KeyType, Seed};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("seed is not valid base58check: {0}")]
    Base58(#[from] bs58::decode::Error),
    #[error("unrecognised family seed ({len} byte payload)")]
    UnknownSeedFormat { len: usize },
    #[error("entropy must be at least {ENTROPY_LEN} bytes, got {0}")]
    ShortEntropy(usize),
    #[error("secp256k1 key derivation failed: {0}")]
    Secp256k1(#[from] secp256k1::Error),
    #[error("seed does not expand to a valid key")]
    KeyDerivation,
}

/// Account identity plus the seed the node signs with.
#[derive(Clone, PartialEq, Eq)]
pub struct Wallet {
    address: String,
    public_key: PublicKeyBytes,
    seed: Seed,
}

impl Wallet {
    pub fn from_seed(seed: Seed) -> Result<Self, WalletError> {
        let public_key = derive_public_key(&seed)?;
        Ok(Self {
            address: address_for(&public_key),
            public_key,
            seed,
        })
    }

    /// Parses a family seed such as the genesis `snoPB...` secret.
    pub fn from_family_seed(encoded: &str) -> Result<Self, WalletError> {
        Self::from_seed(Seed::decode(encoded)?)
    }

    /// ed25519 wallet from raw entropy; bytes past the first 16 are ignored.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, WalletError> {
        Self::from_seed(Seed::from_entropy_prefix(entropy, KeyType::Ed25519)?)
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub const fn public_key(&self) -> &PublicKeyBytes {
        &self.public_key
    }

    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key)
    }

    #[must_use]
    pub const fn seed(&self) -> &Seed {
        &self.seed
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("key_type", &self.seed.key_type())
            .finish_non_exhaustive()
    }
}

/// Maps a wallet index to stable entropy. Nothing here reads the clock, so
/// the same index names the same account on every run.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum WalletDerivation {
    /// `"*** {index} entropy ***"` truncated to 16 bytes.
    #[default]
    Labelled,
    /// ChaCha20 stream seeded by `SHA256(key || index)`.
    Keyed { key: Vec<u8> },
}

impl WalletDerivation {
    #[must_use]
    pub fn keyed(key: impl Into<Vec<u8>>) -> Self {
        Self::Keyed { key: key.into() }
    }

    #[must_use]
    pub fn entropy(&self, index: u64) -> [u8; ENTROPY_LEN] {
        let mut entropy = [0u8; ENTROPY_LEN];
        match self {
            Self::Labelled => {
                // The label is at least 17 bytes long for any index.
                let label = format!("*** {index} entropy ***");
                entropy.copy_from_slice(&label.as_bytes()[..ENTROPY_LEN]);
            }
            Self::Keyed { key } => {
                let digest = Sha256::new()
                    .chain_update(key)
                    .chain_update(index.to_be_bytes())
                    .finalize();
                let mut rng_seed = [0u8; 32];
                rng_seed.copy_from_slice(&digest);
                ChaCha20Rng::from_seed(rng_seed).fill_bytes(&mut entropy);
            }
        }
        entropy
    }

    pub fn derive(&self, index: u64) -> Result<Wallet, WalletError> {
        Wallet::from_seed(Seed::new(self.entropy(index), KeyType::Ed25519))
    }
}

impl fmt::Debug for WalletDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labelled => f.write_str("Labelled"),
            Self::Keyed { .. } => f.write_str("Keyed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_GENESIS_SEED;

    #[test]
    fn genesis_seed_derives_known_account() {
        let genesis = Wallet::from_family_seed(DEFAULT_GENESIS_SEED).expect("genesis seed");

        assert_eq!(genesis.seed().key_type(), KeyType::Secp256k1);
        assert_eq!(genesis.seed().to_hex(), "DEDCE9CE67B451D852FD4E846FCDE31C");
        assert_eq!(
            genesis.public_key_hex(),
            "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020"
        );
        assert_eq!(genesis.address(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
    }

    #[test]
    fn family_seed_encoding_is_stable() {
        let genesis = Seed::decode(DEFAULT_GENESIS_SEED).expect("decode");
        assert_eq!(genesis.encode(), DEFAULT_GENESIS_SEED);

        let ed = Seed::new([7u8; ENTROPY_LEN], KeyType::Ed25519);
        let encoded = ed.encode();
        assert!(encoded.starts_with("sEd"), "ed25519 seeds start with sEd: {encoded}");
        assert_eq!(Seed::decode(&encoded).expect("decode ed25519"), ed);
    }

    #[test]
    fn corrupted_seed_is_rejected() {
        let mut corrupted = DEFAULT_GENESIS_SEED.to_owned();
        corrupted.replace_range(5..6, "z");
        assert!(Seed::decode(&corrupted).is_err());
    }

    #[test]
    fn labelled_entropy_is_truncated_label() {
        let derivation = WalletDerivation::Labelled;
        assert_eq!(&derivation.entropy(0), b"*** 0 entropy **");
        assert_eq!(&derivation.entropy(1000), b"*** 1000 entropy");
    }

    #[test]
    fn same_index_same_address() {
        for derivation in [WalletDerivation::Labelled, WalletDerivation::keyed(*b"fixture-key")] {
            let first = derivation.derive(42).expect("derive");
            let again = derivation.derive(42).expect("derive");
            let other = derivation.derive(43).expect("derive");

            assert_eq!(first.address(), again.address());
            assert_ne!(first.address(), other.address());
            assert!(first.address().starts_with('r'));
            assert_eq!(first.public_key()[0], 0xED);
        }
    }

    #[test]
    fn keyed_derivation_depends_on_key() {
        let a = WalletDerivation::keyed(*b"alpha").derive(1).expect("derive");
        let b = WalletDerivation::keyed(*b"beta").derive(1).expect("derive");
        let labelled = WalletDerivation::Labelled.derive(1).expect("derive");

        assert_ne!(a.address(), b.address());
        assert_ne!(a.address(), labelled.address());
    }

    #[test]
    fn short_entropy_is_rejected() {
        assert!(matches!(
            Wallet::from_entropy(b"too short"),
            Err(WalletError::ShortEntropy(9))
        ));
    }
}
