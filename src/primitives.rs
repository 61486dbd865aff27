//! Fixed bindings to the cryptographic primitives the protocol uses.
//!
//! X25519 for Diffie-Hellman, ChaCha20-Poly1305 for AEAD, HKDF-SHA256 for
//! every key derivation, and the OS CSPRNG for nonces and ephemeral secrets.
//! None of this is configurable — see spec §4.1.

use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

use crate::error::AlgoChatError;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// `HKDF(ikm, salt, info, L=32)`. Every call site uses a distinct
/// `(salt, info)` pair to guarantee domain separation across derivations.
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut out = [0u8; 32];
    hk.expand(info, &mut out)
        .expect("32-byte HKDF output is always a valid length");
    out
}

/// Fresh random bytes from the OS CSPRNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    rand::rngs::OsRng.fill_bytes(&mut out);
    out
}

/// `true` iff every byte of `bytes` is zero — used to reject a degenerate
/// X25519 shared secret.
pub fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

/// ChaCha20-Poly1305 seal with no associated data.
pub fn aead_seal(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, AlgoChatError> {
    let cipher = ChaCha20Poly1305::new(key.into());
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| AlgoChatError::DecryptFailed)
}

/// ChaCha20-Poly1305 open with no associated data. Any failure — wrong key,
/// tampered ciphertext, truncated tag — collapses to `DecryptFailed`.
pub fn aead_open(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, AlgoChatError> {
    let cipher = ChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| AlgoChatError::DecryptFailed)
}
