//! Sliding-window replay protection and monotonic send counter (spec §4.7).
//!
//! Owned by the caller, one instance per peer. The core only ever borrows it
//! `&mut` for the duration of a single operation — see spec §5 for the
//! concurrency contract.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::AlgoChatError;
use crate::ratchet::COUNTER_WINDOW;

/// Outcome of validating an incoming counter against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateOutcome {
    Ok,
    Replay,
    OutOfWindow,
}

/// Per-peer PSK counter state. `seen` is a sorted set so serialisation is
/// stable and pruning is a cheap range removal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterState {
    send_counter: u32,
    receive_high: u32,
    seen: BTreeSet<u32>,
}

impl CounterState {
    /// A freshly initialised state for a peer a PSK has just been adopted for.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_counter(&self) -> u32 {
        self.send_counter
    }

    pub fn receive_high(&self) -> u32 {
        self.receive_high
    }

    /// Emit the next send counter and advance past it.
    pub fn advance_send(&mut self) -> Result<u32, AlgoChatError> {
        if self.send_counter == u32::MAX {
            return Err(AlgoChatError::CounterOverflow);
        }
        let c = self.send_counter;
        self.send_counter += 1;
        Ok(c)
    }

    /// Check whether an incoming counter should be accepted, without
    /// mutating state. Call this before attempting AEAD decryption.
    pub fn validate_receive(&self, c: u32) -> ValidateOutcome {
        if self.seen.contains(&c) {
            return ValidateOutcome::Replay;
        }
        if self.seen.is_empty() {
            // Bootstrap: the very first received message is accepted
            // unconditionally, regardless of its counter value.
            return ValidateOutcome::Ok;
        }
        let low = self.receive_high.saturating_sub(COUNTER_WINDOW);
        let high = self.receive_high.saturating_add(COUNTER_WINDOW);
        if c >= low && c <= high {
            ValidateOutcome::Ok
        } else {
            ValidateOutcome::OutOfWindow
        }
    }

    /// Record a counter that has just been successfully authenticated.
    /// Must only be called after AEAD decryption succeeds — recording an
    /// unauthenticated counter would let an attacker poison the window.
    pub fn record_receive(&mut self, c: u32) {
        self.seen.insert(c);
        if c > self.receive_high {
            self.receive_high = c;
        }
        let floor = self.receive_high.saturating_sub(COUNTER_WINDOW);
        self.seen.retain(|&x| x >= floor);
    }

    pub fn serialize(&self) -> Result<Vec<u8>, AlgoChatError> {
        serde_json::to_vec(self).map_err(|_| AlgoChatError::StateCorrupt)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, AlgoChatError> {
        serde_json::from_slice(bytes).map_err(|_| AlgoChatError::StateCorrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_send_emits_gapless_sequence() {
        let mut state = CounterState::new();
        assert_eq!(state.advance_send().unwrap(), 0);
        assert_eq!(state.advance_send().unwrap(), 1);
        assert_eq!(state.advance_send().unwrap(), 2);
        assert_eq!(state.send_counter(), 3);
    }

    #[test]
    fn advance_send_overflow_errors() {
        let mut state = CounterState {
            send_counter: u32::MAX,
            ..Default::default()
        };
        assert_eq!(state.advance_send().unwrap_err(), AlgoChatError::CounterOverflow);
    }

    #[test]
    fn bootstrap_accepts_any_first_counter() {
        let state = CounterState::new();
        assert_eq!(state.validate_receive(999_999), ValidateOutcome::Ok);
    }

    #[test]
    fn replay_is_rejected() {
        let mut state = CounterState::new();
        state.record_receive(10);
        assert_eq!(state.validate_receive(10), ValidateOutcome::Replay);
    }

    #[test]
    fn out_of_window_is_rejected() {
        let mut state = CounterState::new();
        state.record_receive(500);
        assert_eq!(state.validate_receive(0), ValidateOutcome::OutOfWindow);
        assert_eq!(state.validate_receive(299), ValidateOutcome::OutOfWindow);
        assert_eq!(state.validate_receive(300), ValidateOutcome::Ok);
        assert_eq!(state.validate_receive(700), ValidateOutcome::Ok);
        assert_eq!(state.validate_receive(701), ValidateOutcome::OutOfWindow);
    }

    #[test]
    fn record_prunes_below_window() {
        let mut state = CounterState::new();
        state.record_receive(0);
        state.record_receive(100);
        state.record_receive(500);
        // receive_high - COUNTER_WINDOW = 500 - 200 = 300, so 0 and 100 are pruned.
        assert!(!state.seen.contains(&0));
        assert!(!state.seen.contains(&100));
        assert!(state.seen.contains(&500));
    }

    #[test]
    fn serialize_roundtrip() {
        let mut state = CounterState::new();
        state.advance_send().unwrap();
        state.record_receive(7);
        let bytes = state.serialize().unwrap();
        let back = CounterState::deserialize(&bytes).unwrap();
        assert_eq!(back.send_counter(), state.send_counter());
        assert_eq!(back.receive_high(), state.receive_high());
    }

    #[test]
    fn malformed_blob_is_state_corrupt() {
        assert_eq!(
            CounterState::deserialize(b"not json").unwrap_err(),
            AlgoChatError::StateCorrupt
        );
    }
}
