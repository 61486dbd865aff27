//! Known-answer scenarios from the spec (§8), exercised across module
//! boundaries through the public crate API.

use algochat_core::counter::{CounterState, ValidateOutcome};
use algochat_core::crypto::{base, psk, DecryptedContent};
use algochat_core::keys::derive_identity_keys;
use algochat_core::ratchet::{derive_message_key, derive_session_psk};
use algochat_core::uri;

fn text_of(content: DecryptedContent) -> String {
    match content {
        DecryptedContent::Plaintext(p) => p.text,
        DecryptedContent::KeyPublish => panic!("expected plaintext, got key-publish"),
    }
}

#[test]
fn scenario_1_psk_roundtrip_known_identities() {
    let alice_seed = {
        let mut s = [0u8; 32];
        s[31] = 0x01;
        s
    };
    let bob_seed = {
        let mut s = [0u8; 32];
        s[31] = 0x02;
        s
    };
    let alice = derive_identity_keys(&alice_seed).unwrap();
    let bob = derive_identity_keys(&bob_seed).unwrap();

    let initial_psk = [0xAAu8; 32];
    let message_psk = derive_message_key(&initial_psk, 0);

    let envelope = psk::encrypt(
        b"Hello PSK!",
        &alice.public_bytes(),
        &bob.public_bytes(),
        &message_psk,
        0,
    )
    .unwrap();

    let bytes = envelope.encode();
    let decoded = algochat_core::envelope::PskEnvelope::decode(&bytes).unwrap();
    assert_eq!(decoded.counter, 0);

    let content = psk::decrypt(&decoded, &bob.secret, &bob.public_bytes(), &message_psk).unwrap();
    assert_eq!(text_of(content), "Hello PSK!");
}

#[test]
fn scenario_2_3_4_ratchet_known_answers() {
    let psk = [0xAAu8; 32];

    assert_eq!(
        hex::encode(derive_session_psk(&psk, 0)),
        "a031707ea9e9e50bd8ea4eb9a2bd368465ea1aff14caab293d38954b4717e888"
    );
    assert_eq!(
        hex::encode(derive_session_psk(&psk, 1)),
        "994cffbb4f84fa5410d44574bb9fa7408a8c2f1ed2b3a00f5168fc74c71f7cea"
    );
    assert_eq!(
        hex::encode(derive_message_key(&psk, 0)),
        "2918fd486b9bd024d712f6234b813c0f4167237d60c2c1fca37326b20497c165"
    );
    assert_eq!(
        hex::encode(derive_message_key(&psk, 99)),
        "5b48a50a25261f6b63fe9c867b46be46de4d747c3477db6290045ba519a4d38b"
    );
    assert_eq!(
        hex::encode(derive_message_key(&psk, 100)),
        "7a15d3add6a28858e6a1f1ea0d22bdb29b7e129a1330c4908d9b46a460992694"
    );
}

#[test]
fn scenario_5_uri_roundtrip() {
    let psk = [0x42u8; 32];
    let encoded = uri::encode("ADDR", &psk, "Bob & Alice <3").unwrap();
    let decoded = uri::decode(&encoded).unwrap();
    assert_eq!(decoded.addr, "ADDR");
    assert_eq!(decoded.psk, psk);
    assert_eq!(decoded.label, "Bob & Alice <3");
}

#[test]
fn scenario_6_counter_state_lifecycle() {
    let mut state = CounterState::new();
    assert_eq!(state.advance_send().unwrap(), 0);
    assert_eq!(state.advance_send().unwrap(), 1);
    assert_eq!(state.advance_send().unwrap(), 2);
    assert_eq!(state.send_counter(), 3);

    state.record_receive(0);
    state.record_receive(100);
    state.record_receive(500);

    // receive_high - COUNTER_WINDOW = 500 - 200 = 300, so 0 drops out of the window.
    assert_eq!(state.validate_receive(0), ValidateOutcome::OutOfWindow);
}

#[test]
fn base_and_psk_envelopes_cross_protocol_classification() {
    let alice = derive_identity_keys(&[9u8; 32]).unwrap();
    let bob = derive_identity_keys(&[10u8; 32]).unwrap();

    let base_env = base::encrypt(b"base message", &alice.public_bytes(), &bob.public_bytes()).unwrap();
    let base_bytes = base_env.encode();
    assert!(algochat_core::is_base(&base_bytes));
    assert!(!algochat_core::is_psk(&base_bytes));

    let message_psk = derive_message_key(&[0x11u8; 32], 3);
    let psk_env = psk::encrypt(
        b"psk message",
        &alice.public_bytes(),
        &bob.public_bytes(),
        &message_psk,
        3,
    )
    .unwrap();
    let psk_bytes = psk_env.encode();
    assert!(algochat_core::is_psk(&psk_bytes));
    assert!(!algochat_core::is_base(&psk_bytes));
}
