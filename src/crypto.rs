//! Hybrid ECDH(+PSK) encryption and the decrypted-content sub-format (spec §4.6).
//!
//! Both protocols share the same shape: derive a symmetric key from an X25519
//! exchange (optionally mixed with a ratcheted PSK), seal the plaintext under
//! a random nonce, then separately seal the symmetric key itself under a
//! sender-specific key so the sender can recover their own outgoing messages
//! from the ledger without ever storing plaintext at rest.

use serde::Deserialize;
use serde_json::Value;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::envelope::{
    BaseEnvelope, PskEnvelope, BASE_MAX_PLAINTEXT_LEN, ENCRYPTED_SENDER_KEY_LEN,
    PSK_MAX_PLAINTEXT_LEN,
};
use crate::error::AlgoChatError;
use crate::keys::generate_ephemeral;
use crate::primitives::{aead_open, aead_seal, hkdf_sha256, is_all_zero, random_bytes};

const BASE_SYM_INFO_PREFIX: &[u8] = b"AlgoChatV1";
const BASE_SENDER_KEK_INFO_PREFIX: &[u8] = b"AlgoChatV1-SenderKey";
const PSK_SYM_INFO_PREFIX: &[u8] = b"AlgoChatV1-PSK";
const PSK_SENDER_KEK_INFO_PREFIX: &[u8] = b"AlgoChatV1-PSK-SenderKey";

/// The decrypted content sub-format: either application text, or a control
/// sentinel that callers are expected to filter out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptedContent {
    Plaintext(Plaintext),
    KeyPublish,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext {
    pub text: String,
    pub reply_to_id: Option<String>,
    pub reply_to_preview: Option<String>,
}

#[derive(Deserialize)]
struct ReplyToJson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    preview: Option<String>,
}

/// Parse a decrypted byte blob into its content sub-format.
///
/// If the first byte is `{`, attempt a JSON parse. A `type == "key-publish"`
/// object yields the `KeyPublish` sentinel. A string `text` field yields a
/// `Plaintext` drawn from `text` and an optional `replyTo` sub-object.
/// Anything else — not JSON, or JSON without those shapes — is returned
/// verbatim as `text`.
pub fn parse_content(bytes: &[u8]) -> DecryptedContent {
    if bytes.first() == Some(&b'{') {
        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            if value.get("type").and_then(Value::as_str) == Some("key-publish") {
                return DecryptedContent::KeyPublish;
            }
            if let Some(text) = value.get("text").and_then(Value::as_str) {
                let (reply_to_id, reply_to_preview) = value
                    .get("replyTo")
                    .and_then(|v| serde_json::from_value::<ReplyToJson>(v.clone()).ok())
                    .map(|r| (r.id, r.preview))
                    .unwrap_or((None, None));
                return DecryptedContent::Plaintext(Plaintext {
                    text: text.to_string(),
                    reply_to_id,
                    reply_to_preview,
                });
            }
        }
    }
    DecryptedContent::Plaintext(Plaintext {
        text: String::from_utf8_lossy(bytes).into_owned(),
        reply_to_id: None,
        reply_to_preview: None,
    })
}

fn exchange_info(prefix: &[u8], sender_pubkey: &[u8; 32], recipient_pubkey: &[u8; 32]) -> Vec<u8> {
    let mut info = Vec::with_capacity(prefix.len() + 64);
    info.extend_from_slice(prefix);
    info.extend_from_slice(sender_pubkey);
    info.extend_from_slice(recipient_pubkey);
    info
}

fn sender_kek_info(prefix: &[u8], sender_pubkey: &[u8; 32]) -> Vec<u8> {
    let mut info = Vec::with_capacity(prefix.len() + 32);
    info.extend_from_slice(prefix);
    info.extend_from_slice(sender_pubkey);
    info
}

struct SealedParts {
    nonce: [u8; 12],
    ciphertext: Vec<u8>,
    encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_LEN],
}

/// Shared machinery for both protocols' encrypt side. `psk_extra` is the
/// ratcheted message key mixed into both derivations for the PSK protocol,
/// or empty for the base protocol.
#[allow(clippy::too_many_arguments)]
fn seal(
    plaintext: &[u8],
    eph_secret: &StaticSecret,
    eph_public: &PublicKey,
    sender_pubkey: &[u8; 32],
    recipient_pubkey: &PublicKey,
    psk_extra: &[u8],
    sym_info_prefix: &[u8],
    sender_kek_info_prefix: &[u8],
) -> Result<SealedParts, AlgoChatError> {
    let ss_recipient = eph_secret.diffie_hellman(recipient_pubkey);
    if is_all_zero(ss_recipient.as_bytes()) {
        return Err(AlgoChatError::BadDHOutput);
    }

    let mut sym_ikm = Zeroizing::new(ss_recipient.as_bytes().to_vec());
    sym_ikm.extend_from_slice(psk_extra);
    let recipient_pk_bytes = *recipient_pubkey.as_bytes();
    let sym_info = exchange_info(sym_info_prefix, sender_pubkey, &recipient_pk_bytes);
    let sym_key = Zeroizing::new(hkdf_sha256(&sym_ikm, eph_public.as_bytes(), &sym_info));

    let nonce = random_bytes::<12>();
    let ciphertext = aead_seal(&sym_key, &nonce, plaintext)?;

    let sender_pk_public = PublicKey::from(*sender_pubkey);
    let ss_self = eph_secret.diffie_hellman(&sender_pk_public);
    let mut sender_kek_ikm = Zeroizing::new(ss_self.as_bytes().to_vec());
    sender_kek_ikm.extend_from_slice(psk_extra);
    let sender_kek_info = sender_kek_info(sender_kek_info_prefix, sender_pubkey);
    let sender_kek = Zeroizing::new(hkdf_sha256(&sender_kek_ikm, eph_public.as_bytes(), &sender_kek_info));

    let encrypted_sender_key_vec = aead_seal(&sender_kek, &nonce, &sym_key[..])?;
    let encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_LEN] = encrypted_sender_key_vec
        .try_into()
        .map_err(|_| AlgoChatError::DecryptFailed)?;

    Ok(SealedParts {
        nonce,
        ciphertext,
        encrypted_sender_key,
    })
}

/// Shared machinery for both protocols' decrypt side. When `is_self` the
/// caller's own secret plays the sender role (self-recovery path); otherwise
/// it plays the recipient role.
#[allow(clippy::too_many_arguments)]
fn open(
    ciphertext: &[u8],
    encrypted_sender_key: &[u8; ENCRYPTED_SENDER_KEY_LEN],
    nonce: &[u8; 12],
    my_secret: &StaticSecret,
    eph_public: &PublicKey,
    sender_pubkey: &[u8; 32],
    recipient_pubkey_bytes: &[u8; 32],
    is_self: bool,
    psk_extra: &[u8],
    sym_info_prefix: &[u8],
    sender_kek_info_prefix: &[u8],
) -> Result<Vec<u8>, AlgoChatError> {
    if is_self {
        let ss_self = my_secret.diffie_hellman(eph_public);
        if is_all_zero(ss_self.as_bytes()) {
            return Err(AlgoChatError::BadDHOutput);
        }
        let mut sender_kek_ikm = Zeroizing::new(ss_self.as_bytes().to_vec());
        sender_kek_ikm.extend_from_slice(psk_extra);
        let sender_kek_info = sender_kek_info(sender_kek_info_prefix, sender_pubkey);
        let sender_kek = Zeroizing::new(hkdf_sha256(&sender_kek_ikm, eph_public.as_bytes(), &sender_kek_info));
        let sym_key_vec = aead_open(&sender_kek, nonce, encrypted_sender_key)?;
        let sym_key: Zeroizing<[u8; 32]> = Zeroizing::new(
            sym_key_vec.try_into().map_err(|_| AlgoChatError::DecryptFailed)?,
        );
        aead_open(&sym_key, nonce, ciphertext)
    } else {
        let ss_recipient = my_secret.diffie_hellman(eph_public);
        if is_all_zero(ss_recipient.as_bytes()) {
            return Err(AlgoChatError::BadDHOutput);
        }
        let mut sym_ikm = Zeroizing::new(ss_recipient.as_bytes().to_vec());
        sym_ikm.extend_from_slice(psk_extra);
        let sym_info = exchange_info(sym_info_prefix, sender_pubkey, recipient_pubkey_bytes);
        let sym_key = Zeroizing::new(hkdf_sha256(&sym_ikm, eph_public.as_bytes(), &sym_info));
        aead_open(&sym_key, nonce, ciphertext)
    }
}

// ── Base protocol ──────────────────────────────────────────────────────────

pub mod base {
    use super::*;

    pub fn encrypt(
        text: &[u8],
        sender_pubkey: &[u8; 32],
        recipient_pubkey: &[u8; 32],
    ) -> Result<BaseEnvelope, AlgoChatError> {
        if text.len() > BASE_MAX_PLAINTEXT_LEN {
            return Err(AlgoChatError::PayloadTooLarge);
        }
        let (eph_secret, eph_public) = generate_ephemeral();
        let recipient_pk = PublicKey::from(*recipient_pubkey);

        let parts = seal(
            text,
            &eph_secret,
            &eph_public,
            sender_pubkey,
            &recipient_pk,
            &[],
            BASE_SYM_INFO_PREFIX,
            BASE_SENDER_KEK_INFO_PREFIX,
        )?;

        Ok(BaseEnvelope {
            sender_pubkey: *sender_pubkey,
            ephemeral_pubkey: *eph_public.as_bytes(),
            nonce: parts.nonce,
            encrypted_sender_key: parts.encrypted_sender_key,
            ciphertext: parts.ciphertext,
        })
    }

    pub fn decrypt(
        envelope: &BaseEnvelope,
        my_secret: &StaticSecret,
        my_pubkey: &[u8; 32],
    ) -> Result<DecryptedContent, AlgoChatError> {
        let eph_public = PublicKey::from(envelope.ephemeral_pubkey);
        let is_self = envelope.sender_pubkey == *my_pubkey;

        let plaintext = open(
            &envelope.ciphertext,
            &envelope.encrypted_sender_key,
            &envelope.nonce,
            my_secret,
            &eph_public,
            &envelope.sender_pubkey,
            my_pubkey,
            is_self,
            &[],
            BASE_SYM_INFO_PREFIX,
            BASE_SENDER_KEK_INFO_PREFIX,
        )?;

        Ok(parse_content(&plaintext))
    }
}

// ── PSK protocol ───────────────────────────────────────────────────────────

pub mod psk {
    use super::*;

    pub use crate::ratchet::derive_message_key;

    pub fn encrypt(
        text: &[u8],
        sender_pubkey: &[u8; 32],
        recipient_pubkey: &[u8; 32],
        message_psk: &[u8; 32],
        counter: u32,
    ) -> Result<PskEnvelope, AlgoChatError> {
        if text.len() > PSK_MAX_PLAINTEXT_LEN {
            return Err(AlgoChatError::PayloadTooLarge);
        }
        let (eph_secret, eph_public) = generate_ephemeral();
        let recipient_pk = PublicKey::from(*recipient_pubkey);

        let parts = seal(
            text,
            &eph_secret,
            &eph_public,
            sender_pubkey,
            &recipient_pk,
            message_psk,
            PSK_SYM_INFO_PREFIX,
            PSK_SENDER_KEK_INFO_PREFIX,
        )?;

        Ok(PskEnvelope {
            counter,
            sender_pubkey: *sender_pubkey,
            ephemeral_pubkey: *eph_public.as_bytes(),
            nonce: parts.nonce,
            encrypted_sender_key: parts.encrypted_sender_key,
            ciphertext: parts.ciphertext,
        })
    }

    pub fn decrypt(
        envelope: &PskEnvelope,
        my_secret: &StaticSecret,
        my_pubkey: &[u8; 32],
        message_psk: &[u8; 32],
    ) -> Result<DecryptedContent, AlgoChatError> {
        let eph_public = PublicKey::from(envelope.ephemeral_pubkey);
        let is_self = envelope.sender_pubkey == *my_pubkey;

        let plaintext = open(
            &envelope.ciphertext,
            &envelope.encrypted_sender_key,
            &envelope.nonce,
            my_secret,
            &eph_public,
            &envelope.sender_pubkey,
            my_pubkey,
            is_self,
            message_psk,
            PSK_SYM_INFO_PREFIX,
            PSK_SENDER_KEK_INFO_PREFIX,
        )?;

        Ok(parse_content(&plaintext))
    }
}
