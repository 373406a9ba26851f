//! Reconnection policy for the gateway socket.
//!
//! Pure state machine: the connection loop asks it whether and when to try
//! again, and reports attempt outcomes back. At most one reconnect attempt
//! is ever in flight.

use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 2000;
const MAX_DELAY_MS: u64 = 10_000;

/// Close codes after which reconnecting would be wrong: the far end ended
/// the conversation on purpose.
const CLEAN_CLOSE_CODES: [u16; 2] = [1000, 1001];

/// Whether a close code marks a deliberate goodbye rather than a failure.
/// `None` means the connection died without a close frame.
pub fn is_clean_close(close_code: Option<u16>) -> bool {
    matches!(close_code, Some(code) if CLEAN_CLOSE_CODES.contains(&code))
}

#[derive(Debug)]
pub struct ReconnectPolicy {
    attempts: u32,
    in_flight: bool,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            in_flight: false,
        }
    }

    /// Whether a drop with this close code warrants a reconnect at all
    pub fn should_reconnect(&self, close_code: Option<u16>) -> bool {
        if is_clean_close(close_code) {
            return false;
        }
        self.attempts < MAX_ATTEMPTS && !self.in_flight
    }

    /// Claim the next attempt and return how long to wait before it.
    /// Returns `None` once the budget is spent or an attempt is in flight.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= MAX_ATTEMPTS || self.in_flight {
            return None;
        }
        let delay = BASE_DELAY_MS
            .saturating_mul(1 << self.attempts)
            .min(MAX_DELAY_MS);
        self.attempts += 1;
        self.in_flight = true;
        Some(Duration::from_millis(delay))
    }

    /// A reconnect attempt finished; success resets the backoff budget.
    pub fn attempt_finished(&mut self, success: bool) {
        self.in_flight = false;
        if success {
            self.attempts = 0;
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}
