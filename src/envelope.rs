//! Wire envelopes for the base and PSK protocols (spec §3, §4.3, §4.4).
//!
//! Both envelopes share the same field order; the PSK variant inserts a
//! 4-byte big-endian counter right after `protocol_id` and shifts every
//! subsequent offset by 4. All integers are big-endian; there is no padding.

use crate::error::AlgoChatError;

pub const VERSION: u8 = 0x01;
pub const PROTOCOL_BASE: u8 = 0x01;
pub const PROTOCOL_PSK: u8 = 0x02;

const PUBKEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
pub const ENCRYPTED_SENDER_KEY_LEN: usize = 48;
const TAG_LEN: usize = 16;

/// `version(1) + protocol_id(1) + sender_pk(32) + eph_pk(32) + nonce(12) + esk(48)`.
pub const BASE_HEADER_LEN: usize = 1 + 1 + PUBKEY_LEN + PUBKEY_LEN + NONCE_LEN + ENCRYPTED_SENDER_KEY_LEN;
pub const BASE_MIN_LEN: usize = BASE_HEADER_LEN + TAG_LEN;
/// Total envelope size is capped at 1024 bytes (it rides in a transaction note).
pub const MAX_ENVELOPE_LEN: usize = 1024;
/// `1024 - BASE_HEADER_LEN - TAG_LEN`.
pub const BASE_MAX_PLAINTEXT_LEN: usize = MAX_ENVELOPE_LEN - BASE_HEADER_LEN - TAG_LEN;

const COUNTER_LEN: usize = 4;
/// Base header plus the 4-byte counter.
pub const PSK_HEADER_LEN: usize = BASE_HEADER_LEN + COUNTER_LEN;
pub const PSK_MIN_LEN: usize = PSK_HEADER_LEN + TAG_LEN;
pub const PSK_MAX_PLAINTEXT_LEN: usize = MAX_ENVELOPE_LEN - PSK_HEADER_LEN - TAG_LEN;

/// The base (non-PSK) envelope: forward-secret through ephemeral keys alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEnvelope {
    pub sender_pubkey: [u8; 32],
    pub ephemeral_pubkey: [u8; 32],
    pub nonce: [u8; NONCE_LEN],
    pub encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_LEN],
    pub ciphertext: Vec<u8>,
}

impl BaseEnvelope {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BASE_HEADER_LEN + self.ciphertext.len());
        out.push(VERSION);
        out.push(PROTOCOL_BASE);
        out.extend_from_slice(&self.sender_pubkey);
        out.extend_from_slice(&self.ephemeral_pubkey);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.encrypted_sender_key);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, AlgoChatError> {
        if bytes.len() < BASE_MIN_LEN {
            return Err(AlgoChatError::TooShort);
        }
        if bytes[0] != VERSION {
            return Err(AlgoChatError::UnsupportedVersion);
        }
        if bytes[1] != PROTOCOL_BASE {
            return Err(AlgoChatError::UnsupportedProtocol);
        }
        if bytes.len() > MAX_ENVELOPE_LEN {
            return Err(AlgoChatError::PayloadTooLarge);
        }

        let mut off = 2;
        let sender_pubkey = read_32(bytes, &mut off);
        let ephemeral_pubkey = read_32(bytes, &mut off);
        let nonce = read_n::<NONCE_LEN>(bytes, &mut off);
        let encrypted_sender_key = read_n::<ENCRYPTED_SENDER_KEY_LEN>(bytes, &mut off);
        let ciphertext = bytes[off..].to_vec();

        Ok(BaseEnvelope {
            sender_pubkey,
            ephemeral_pubkey,
            nonce,
            encrypted_sender_key,
            ciphertext,
        })
    }
}

/// The PSK envelope: hybrid of ephemeral ECDH and a ratcheted pre-shared key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PskEnvelope {
    pub counter: u32,
    pub sender_pubkey: [u8; 32],
    pub ephemeral_pubkey: [u8; 32],
    pub nonce: [u8; NONCE_LEN],
    pub encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_LEN],
    pub ciphertext: Vec<u8>,
}

impl PskEnvelope {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PSK_HEADER_LEN + self.ciphertext.len());
        out.push(VERSION);
        out.push(PROTOCOL_PSK);
        out.extend_from_slice(&self.counter.to_be_bytes());
        out.extend_from_slice(&self.sender_pubkey);
        out.extend_from_slice(&self.ephemeral_pubkey);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.encrypted_sender_key);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, AlgoChatError> {
        if bytes.len() < PSK_MIN_LEN {
            return Err(AlgoChatError::TooShort);
        }
        if bytes[0] != VERSION {
            return Err(AlgoChatError::UnsupportedVersion);
        }
        if bytes[1] != PROTOCOL_PSK {
            return Err(AlgoChatError::UnsupportedProtocol);
        }
        if bytes.len() > MAX_ENVELOPE_LEN {
            return Err(AlgoChatError::PayloadTooLarge);
        }

        let mut off = 2;
        let counter = u32::from_be_bytes(bytes[off..off + 4].try_into().unwrap());
        off += 4;
        let sender_pubkey = read_32(bytes, &mut off);
        let ephemeral_pubkey = read_32(bytes, &mut off);
        let nonce = read_n::<NONCE_LEN>(bytes, &mut off);
        let encrypted_sender_key = read_n::<ENCRYPTED_SENDER_KEY_LEN>(bytes, &mut off);
        let ciphertext = bytes[off..].to_vec();

        Ok(PskEnvelope {
            counter,
            sender_pubkey,
            ephemeral_pubkey,
            nonce,
            encrypted_sender_key,
            ciphertext,
        })
    }
}

fn read_32(bytes: &[u8], off: &mut usize) -> [u8; 32] {
    read_n::<32>(bytes, off)
}

fn read_n<const N: usize>(bytes: &[u8], off: &mut usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[*off..*off + N]);
    *off += N;
    out
}

/// `true` iff `bytes` looks like a base envelope by magic bytes and length
/// alone — use [`BaseEnvelope::decode`] to fully verify.
pub fn is_base(bytes: &[u8]) -> bool {
    bytes.len() >= BASE_MIN_LEN && bytes.first() == Some(&VERSION) && bytes.get(1) == Some(&PROTOCOL_BASE)
}

/// `true` iff `bytes` looks like a PSK envelope by magic bytes and length
/// alone — use [`PskEnvelope::decode`] to fully verify.
pub fn is_psk(bytes: &[u8]) -> bool {
    bytes.len() >= PSK_MIN_LEN && bytes.first() == Some(&VERSION) && bytes.get(1) == Some(&PROTOCOL_PSK)
}
