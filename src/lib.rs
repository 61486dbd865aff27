//! Cryptographic message layer for the AlgoChat end-to-end encrypted
//! messaging protocol.
//!
//! This crate is a pure library: deterministic given its inputs, no I/O, no
//! global state beyond the per-peer [`counter::CounterState`] the caller
//! owns. It implements the wire envelopes, the hybrid ECDH(+PSK) encryption,
//! the two-level HKDF ratchet, and the sliding-window replay protection that
//! let two independent clients exchange end-to-end encrypted messages inside
//! a single blockchain transaction note (at most 1024 bytes).
//!
//! Two wire-compatible protocols coexist:
//! - [`envelope::BaseEnvelope`] / [`crypto::base`] — forward-secret through
//!   ephemeral keys alone.
//! - [`envelope::PskEnvelope`] / [`crypto::psk`] — a hybrid of ephemeral
//!   ECDH and a ratcheted pre-shared key, adding replay protection via
//!   [`counter::CounterState`].
//!
//! Out of scope: the UI, routing, blockchain-node clients, indexer queries,
//! key-publish discovery, contact labels/block lists, QR rendering, and
//! at-rest storage encryption — all of these are external collaborators
//! that consume this crate through [`envelope`]'s encode/decode,
//! [`crypto`]'s encrypt/decrypt, and [`counter`]'s advance/validate.

pub mod counter;
pub mod crypto;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod primitives;
pub mod ratchet;
pub mod uri;

pub use counter::{CounterState, ValidateOutcome};
pub use crypto::{base, psk, DecryptedContent, Plaintext};
pub use dispatch::{dispatch, Dispatched};
pub use envelope::{is_base, is_psk, BaseEnvelope, PskEnvelope};
pub use error::AlgoChatError;
pub use keys::{derive_identity_keys, KeyPair};
pub use ratchet::{derive_message_key, COUNTER_WINDOW, SESSION_SIZE};
pub use uri::{decode as decode_uri, encode as encode_uri, ExchangeUri};
