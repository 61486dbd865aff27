//! Classify a raw note's first bytes and route to the matching codec and
//! crypto (spec §4.9). This is the only entry point a collaborator that
//! just sees bytes on the ledger needs.

use x25519_dalek::StaticSecret;

use crate::counter::CounterState;
use crate::crypto::{base, psk, DecryptedContent};
use crate::envelope::{is_base, is_psk, BaseEnvelope, PskEnvelope};
use crate::error::AlgoChatError;
use crate::ratchet::derive_message_key;

/// Outcome of dispatching a raw note.
pub enum Dispatched {
    Base(DecryptedContent),
    Psk(DecryptedContent),
    /// Neither classifier matched — not an error, the caller should skip
    /// this transaction as unrelated to the protocol.
    NotAChatMessage,
}

/// Classify `bytes` and route to the matching codec + decrypt.
///
/// `psk_for_peer` supplies `(initial_psk, counter_state)` for the envelope's
/// sender, if a PSK session exists; `None` makes a PSK-classified envelope
/// fail with `NoSessionKey`. On success for the PSK path, `counter_state` is
/// updated via `record_receive` — the caller is responsible for persisting
/// it afterward.
pub fn dispatch(
    bytes: &[u8],
    my_secret: &StaticSecret,
    my_pubkey: &[u8; 32],
    psk_for_peer: Option<(&[u8; 32], &mut CounterState)>,
) -> Result<Dispatched, AlgoChatError> {
    if is_base(bytes) {
        let envelope = BaseEnvelope::decode(bytes)?;
        let content = base::decrypt(&envelope, my_secret, my_pubkey)?;
        return Ok(Dispatched::Base(content));
    }

    if is_psk(bytes) {
        let envelope = PskEnvelope::decode(bytes)?;
        let (initial_psk, state) = psk_for_peer.ok_or(AlgoChatError::NoSessionKey)?;

        match state.validate_receive(envelope.counter) {
            crate::counter::ValidateOutcome::Replay => return Err(AlgoChatError::CounterReplay),
            crate::counter::ValidateOutcome::OutOfWindow => {
                return Err(AlgoChatError::CounterOutOfWindow)
            }
            crate::counter::ValidateOutcome::Ok => {}
        }

        let message_psk = derive_message_key(initial_psk, envelope.counter);
        let content = psk::decrypt(&envelope, my_secret, my_pubkey, &message_psk)?;

        // Only record after a successful decryption — an attacker who
        // forges a plausible counter but bad ciphertext must not be able
        // to poison the window.
        state.record_receive(envelope.counter);

        return Ok(Dispatched::Psk(content));
    }

    Ok(Dispatched::NotAChatMessage)
}
