//! Long-term identity keys and ephemeral keys (spec §4.2).

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::AlgoChatError;
use crate::primitives::hkdf_sha256;

const IDENTITY_SALT: &[u8] = b"AlgoChat-v1-encryption";
const IDENTITY_INFO: &[u8] = b"x25519-key";

/// A long-term X25519 key pair. `secret` zeroizes its bytes on drop
/// (`x25519_dalek::StaticSecret` implements `Zeroize`/`ZeroizeOnDrop`).
pub struct KeyPair {
    pub secret: StaticSecret,
    pub public: PublicKey,
}

impl KeyPair {
    pub fn public_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }
}

/// Derive the long-term encryption key pair from a 32-byte account seed.
///
/// `secret = HKDF(ikm=seed, salt="AlgoChat-v1-encryption", info="x25519-key")`.
/// This binds the encryption identity to the account without reusing a
/// signing key for Diffie-Hellman.
pub fn derive_identity_keys(seed: &[u8]) -> Result<KeyPair, AlgoChatError> {
    if seed.len() != 32 {
        return Err(AlgoChatError::InvalidKeyLength);
    }
    let secret_bytes = hkdf_sha256(seed, IDENTITY_SALT, IDENTITY_INFO);
    let secret = StaticSecret::from(secret_bytes);
    let public = PublicKey::from(&secret);
    Ok(KeyPair { secret, public })
}

/// Generate a fresh ephemeral X25519 key pair.
///
/// The encryption protocol performs two Diffie-Hellman computations against
/// this same ephemeral secret (one for the recipient, one for self-recovery),
/// so a reusable `StaticSecret` is used rather than the single-use
/// `EphemeralSecret` — the caller is expected to let it drop as soon as both
/// computations are done, which zeroizes it the same way.
pub fn generate_ephemeral() -> (StaticSecret, PublicKey) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    (secret, public)
}
