//! Relay flow-control bookkeeping
//!
//! The driver asks the UI for permission (GO) before sending bulk data and
//! waits for an ACK. [`HandshakeBudget`] counts unanswered requests and tells
//! the driver when to cool down and when to give up for good.

use crate::config::HandshakeConfig;

/// What to do after an unanswered GO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollVerdict {
    /// Send another GO right away
    Retry,
    /// A cycle ended: sleep the cooldown, then retry
    Cooldown,
    /// Last cycle ended: sleep the cooldown, then disable the relay
    Exhausted,
}

/// Retry counter for one handshake
#[derive(Debug, Clone)]
pub struct HandshakeBudget {
    config: HandshakeConfig,
    polls: u16,
    cycles: u16,
}

impl HandshakeBudget {
    /// Fresh budget
    pub fn new(config: HandshakeConfig) -> Self {
        Self {
            config,
            polls: 0,
            cycles: 0,
        }
    }

    /// Record one GO that got no ACK
    pub fn record_miss(&mut self) -> PollVerdict {
        self.polls += 1;
        if self.polls < self.config.polls_per_cycle {
            return PollVerdict::Retry;
        }
        self.polls = 0;
        self.cycles += 1;
        if self.cycles >= self.config.max_cycles {
            PollVerdict::Exhausted
        } else {
            PollVerdict::Cooldown
        }
    }

    /// Completed cooldown cycles
    pub fn cycles(&self) -> u16 {
        self.cycles
    }

    /// Cooldown length
    pub fn cooldown_ms(&self) -> u32 {
        self.config.cooldown_ms
    }
}
