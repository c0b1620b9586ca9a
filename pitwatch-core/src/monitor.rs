//! Per-channel trend monitor
//!
//! Owns exactly one (window, policy) pair. The consumer feeds it one
//! decoded reading per delivered message; it answers with either a warming
//! report or a classification. This replaces the module-level history
//! buffer of earlier designs: all state is encapsulated here and nothing
//! is shared across channels.

use crate::policy::{AlertPolicy, Evaluation};
use crate::reading::{ChannelId, Reading};
use crate::window::{SlidingWindow, WindowState, MAX_WINDOW};

/// What a single observed reading amounted to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Window not yet full; no classification was made
    Warming {
        /// Readings held so far
        have: usize,
        /// Readings required before evaluation starts
        need: usize,
        /// The observed reading's value, for status logging
        current: f32,
    },
    /// Window full; trend computed and classified
    Classified(Evaluation),
}

/// Sliding-window trend monitor for one channel
pub struct TrendMonitor<const N: usize = MAX_WINDOW> {
    channel: ChannelId,
    policy: AlertPolicy,
    window: SlidingWindow<N>,
}

impl<const N: usize> TrendMonitor<N> {
    /// Create a monitor with an empty window sized by the policy
    pub fn new(channel: ChannelId, policy: AlertPolicy) -> Self {
        Self {
            channel,
            window: SlidingWindow::new(policy.capacity),
            policy,
        }
    }

    /// Observe one reading: update the window, evaluate if full
    pub fn observe(&mut self, reading: Reading) -> Outcome {
        let value = reading.value;

        match self.window.push(reading) {
            WindowState::Warming { have, need } => Outcome::Warming {
                have,
                need,
                current: value,
            },
            WindowState::Full => match self.window.trend() {
                Ok(trend) => Outcome::Classified(self.policy.evaluate(trend, value)),
                // push reported Full, so the window cannot be short; report
                // the remaining gap rather than panicking if it ever is
                Err(_) => Outcome::Warming {
                    have: self.window.len(),
                    need: self.window.capacity(),
                    current: value,
                },
            },
        }
    }

    /// Channel this monitor is bound to
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// The policy this monitor evaluates against
    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Read-only view of the current window
    pub fn window(&self) -> &SlidingWindow<N> {
        &self.window
    }
}
