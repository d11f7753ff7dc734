//! Per-prompt turn counting.
//!
//! A turn is one assistant reply or the final result. The counter lives inside
//! a single relay invocation and is reset when the next prompt starts.

/// Counts turns within one prompt invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TurnCounter {
    count: u64,
}

impl TurnCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one and return the new count.
    pub fn increment(&mut self) -> u64 {
        self.count += 1;
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
