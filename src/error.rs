//! Flat error taxonomy for the AlgoChat message layer.
//!
//! One enum, one variant per failure kind in the spec. Nothing here retries,
//! logs, or panics — see the crate-level docs for the propagation policy.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AlgoChatError {
    #[error("envelope shorter than the header-plus-tag minimum")]
    TooShort,

    #[error("unsupported envelope version")]
    UnsupportedVersion,

    #[error("unsupported protocol identifier")]
    UnsupportedProtocol,

    #[error("plaintext exceeds the protocol's maximum payload size")]
    PayloadTooLarge,

    #[error("key or PSK material must be exactly 32 bytes")]
    InvalidKeyLength,

    #[error("Diffie-Hellman output was all-zero")]
    BadDHOutput,

    #[error("decryption failed")]
    DecryptFailed,

    #[error("send counter exhausted its 32-bit range")]
    CounterOverflow,

    #[error("counter already seen")]
    CounterReplay,

    #[error("counter outside the sliding window")]
    CounterOutOfWindow,

    #[error("no PSK session established for this peer")]
    NoSessionKey,

    #[error("malformed exchange URI")]
    InvalidURI,

    #[error("counter state blob failed to deserialise")]
    StateCorrupt,
}
