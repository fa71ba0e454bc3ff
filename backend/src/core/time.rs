//! Tick counter for the Terminal Network.
//!
//! Grounded on the teacher's `TimeManager`: deterministic, monotonic
//! advancement with no wall-clock dependency. The day/end-of-day concept
//! is dropped — the network has no multi-day notion, only a flat tick
//! sequence.

use serde::{Deserialize, Serialize};

/// Tracks ticks elapsed since the network started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickCounter {
    current_tick: usize,
}

impl TickCounter {
    pub fn new() -> Self {
        Self { current_tick: 0 }
    }

    pub fn advance(&mut self) {
        self.current_tick += 1;
    }

    pub fn current(&self) -> usize {
        self.current_tick
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_advances_monotonically() {
        let mut counter = TickCounter::new();
        assert_eq!(counter.current(), 0);
        counter.advance();
        counter.advance();
        assert_eq!(counter.current(), 2);
    }
}
