//! Two-level HKDF ratchet from an initial PSK to a per-message key (spec §4.5).
//!
//! ```text
//! session_index = c / SESSION_SIZE
//! position      = c mod SESSION_SIZE
//! session_psk   = HKDF(ikm=initial_psk, salt="AlgoChat-PSK-Session", info=be32(session_index))
//! message_psk   = HKDF(ikm=session_psk,  salt="AlgoChat-PSK-Position", info=be32(position))
//! ```
//!
//! Session granularity bounds the blast radius of a leaked key: recovering
//! `message_psk` for one counter reveals nothing else; recovering a
//! `session_psk` compromises only the 100 messages in that session.

use crate::primitives::hkdf_sha256;

pub const SESSION_SIZE: u32 = 100;
pub const COUNTER_WINDOW: u32 = 200;

const SESSION_SALT: &[u8] = b"AlgoChat-PSK-Session";
const POSITION_SALT: &[u8] = b"AlgoChat-PSK-Position";

/// `session_psk = HKDF(ikm=initial_psk, salt="AlgoChat-PSK-Session", info=be32(session_index))`.
pub fn derive_session_psk(initial_psk: &[u8; 32], session_index: u32) -> [u8; 32] {
    hkdf_sha256(initial_psk, SESSION_SALT, &session_index.to_be_bytes())
}

/// `message_psk = HKDF(ikm=session_psk, salt="AlgoChat-PSK-Position", info=be32(position))`.
pub fn derive_message_key(initial_psk: &[u8; 32], counter: u32) -> [u8; 32] {
    let session_index = counter / SESSION_SIZE;
    let position = counter % SESSION_SIZE;
    let session_psk = derive_session_psk(initial_psk, session_index);
    hkdf_sha256(&session_psk, POSITION_SALT, &position.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PSK_AA: [u8; 32] = [0xAA; 32];

    #[test]
    fn message_key_is_deterministic() {
        let a = derive_message_key(&PSK_AA, 12345);
        let b = derive_message_key(&PSK_AA, 12345);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_counters_distinct_keys() {
        let a = derive_message_key(&PSK_AA, 0);
        let b = derive_message_key(&PSK_AA, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn same_session_different_position() {
        let a = derive_message_key(&PSK_AA, 0);
        let b = derive_message_key(&PSK_AA, 99);
        assert_ne!(a, b);
    }

    #[test]
    fn session_boundary_changes_session_psk() {
        let s0 = derive_session_psk(&PSK_AA, 0);
        let s1 = derive_session_psk(&PSK_AA, 1);
        assert_ne!(s0, s1);

        // counter 99 is the last position of session 0, counter 100 the
        // first position of session 1 — they must use different session keys.
        let k99 = derive_message_key(&PSK_AA, 99);
        let k100 = derive_message_key(&PSK_AA, 100);
        assert_ne!(k99, k100);
    }

    // Known-answer vectors from the spec (scenario 2-4, §8).
    #[test]
    fn known_answer_session_psk_0() {
        let got = derive_session_psk(&PSK_AA, 0);
        assert_eq!(
            hex::encode(got),
            "a031707ea9e9e50bd8ea4eb9a2bd368465ea1aff14caab293d38954b4717e888"
        );
    }

    #[test]
    fn known_answer_session_psk_1() {
        let got = derive_session_psk(&PSK_AA, 1);
        assert_eq!(
            hex::encode(got),
            "994cffbb4f84fa5410d44574bb9fa7408a8c2f1ed2b3a00f5168fc74c71f7cea"
        );
    }

    #[test]
    fn known_answer_message_key_0() {
        let got = derive_message_key(&PSK_AA, 0);
        assert_eq!(
            hex::encode(got),
            "2918fd486b9bd024d712f6234b813c0f4167237d60c2c1fca37326b20497c165"
        );
    }

    #[test]
    fn known_answer_message_key_99() {
        let got = derive_message_key(&PSK_AA, 99);
        assert_eq!(
            hex::encode(got),
            "5b48a50a25261f6b63fe9c867b46be46de4d747c3477db6290045ba519a4d38b"
        );
    }

    #[test]
    fn known_answer_message_key_100() {
        let got = derive_message_key(&PSK_AA, 100);
        assert_eq!(
            hex::encode(got),
            "7a15d3add6a28858e6a1f1ea0d22bdb29b7e129a1330c4908d9b46a460992694"
        );
    }
}
