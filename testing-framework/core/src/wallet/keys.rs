use ed25519_dalek::SigningKey;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::{Digest as _, Sha256, Sha512};

use super::{KeyType, Seed, WalletError};

/// Compressed secp256k1 point, or `0xED` followed by the ed25519 key.
pub type PublicKeyBytes = [u8; 33];

const ED25519_KEY_PREFIX: u8 = 0xED;
const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Expands a seed into the public key of its first (and only) account.
pub fn derive_public_key(seed: &Seed) -> Result<PublicKeyBytes, WalletError> {
    match seed.key_type() {
        KeyType::Ed25519 => Ok(ed25519_public_key(seed.entropy())),
        KeyType::Secp256k1 => secp256k1_public_key(seed.entropy()),
    }
}

/// Base58check address of the account controlled by `public_key`.
#[must_use]
pub fn address_for(public_key: &[u8]) -> String {
    let account_id = Ripemd160::digest(Sha256::digest(public_key));
    let mut payload = Vec::with_capacity(1 + account_id.len());
    payload.push(ACCOUNT_ID_VERSION);
    payload.extend_from_slice(&account_id);
    bs58::encode(payload)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

fn ed25519_public_key(entropy: &[u8]) -> PublicKeyBytes {
    let signing_key = SigningKey::from_bytes(&sha512_half(&[entropy]));
    let mut public_key = [0u8; 33];
    public_key[0] = ED25519_KEY_PREFIX;
    public_key[1..].copy_from_slice(signing_key.verifying_key().as_bytes());
    public_key
}

fn secp256k1_public_key(entropy: &[u8]) -> Result<PublicKeyBytes, WalletError> {
    let secp = Secp256k1::signing_only();

    // Root key: first hash of (entropy, seq) that is a valid scalar.
    let root = (0u32..)
        .find_map(|seq| SecretKey::from_slice(&sha512_half(&[entropy, &seq.to_be_bytes()])).ok())
        .ok_or(WalletError::KeyDerivation)?;
    let root_public = PublicKey::from_secret_key(&secp, &root).serialize();

    // Account 0 of the root generator.
    let account_index = 0u32.to_be_bytes();
    let tweak = (0u32..)
        .find_map(|subseq| {
            let hash = sha512_half(&[&root_public, &account_index, &subseq.to_be_bytes()]);
            Scalar::from_be_bytes(hash)
                .ok()
                .filter(|scalar| *scalar != Scalar::ZERO)
        })
        .ok_or(WalletError::KeyDerivation)?;

    let account = root.add_tweak(&tweak)?;
    Ok(PublicKey::from_secret_key(&secp, &account).serialize())
}

fn sha512_half(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    half
}
