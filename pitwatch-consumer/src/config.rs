//! Per-channel consumer configuration
//!
//! Supplied once at process start; there is no runtime reconfiguration.
//! The two named constructors mirror the deployed channels: the smoker
//! queue watches for a fast temperature drop, the food queue for a stall.

use clap::ValueEnum;

use pitwatch_core::{AlertPolicy, TrendDirection};

/// What to do with a message whose body fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodePolicy {
    /// Acknowledge, log, and move on (default)
    ///
    /// Contains the damage to the one bad message and keeps the queue
    /// moving.
    Skip,
    /// Tear the consumer down, leaving the message unacknowledged
    ///
    /// The broker redelivers it after reconnect, so a permanently
    /// malformed message will stall the queue until an operator steps in.
    Fail,
}

/// Everything one consumer instance needs to run
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Broker hostname or IP
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Durable queue name for this channel, also its identifier
    pub queue: String,
    /// Sliding window capacity in readings
    pub window_capacity: usize,
    /// Alert threshold in degrees
    pub threshold: f32,
    /// Direction of change to alert on
    pub direction: TrendDirection,
    /// Bad-message policy
    pub decode_policy: DecodePolicy,
    /// Discard stale backlog from a prior run before consuming
    pub purge_backlog: bool,
}

impl ChannelConfig {
    /// Smoker channel: alert when the pit drops 15 degrees in 2.5 minutes
    pub fn smoker(host: impl Into<String>, port: u16) -> Self {
        let policy = AlertPolicy::smoker();
        Self {
            host: host.into(),
            port,
            queue: "01-smoker".to_string(),
            window_capacity: policy.capacity,
            threshold: policy.threshold,
            direction: policy.direction,
            decode_policy: DecodePolicy::Skip,
            purge_backlog: false,
        }
    }

    /// Food channel: alert when food A changes less than 1 degree in 10 minutes
    pub fn food_a(host: impl Into<String>, port: u16) -> Self {
        let policy = AlertPolicy::food_stall();
        Self {
            host: host.into(),
            port,
            queue: "02-food-A".to_string(),
            window_capacity: policy.capacity,
            threshold: policy.threshold,
            direction: policy.direction,
            decode_policy: DecodePolicy::Skip,
            purge_backlog: false,
        }
    }

    /// The alert policy this configuration describes
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy::new(self.window_capacity, self.threshold, self.direction)
    }

    /// Stable client identifier, one per channel queue
    ///
    /// Must stay stable across restarts so the broker can associate the
    /// persistent session (and redeliver unacknowledged messages).
    pub fn client_id(&self) -> String {
        format!("pitwatch-{}", self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwatch_core::TrendDirection;

    #[test]
    fn smoker_preset_matches_deployed_policy() {
        let config = ChannelConfig::smoker("localhost", 1883);
        assert_eq!(config.queue, "01-smoker");
        assert_eq!(config.window_capacity, 5);
        assert_eq!(config.threshold, 15.0);
        assert_eq!(config.direction, TrendDirection::Decrease);
        assert_eq!(config.decode_policy, DecodePolicy::Skip);
    }

    #[test]
    fn food_preset_matches_deployed_policy() {
        let config = ChannelConfig::food_a("localhost", 1883);
        assert_eq!(config.queue, "02-food-A");
        assert_eq!(config.window_capacity, 20);
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.direction, TrendDirection::Plateau);
    }

    #[test]
    fn client_id_is_stable_per_queue() {
        let config = ChannelConfig::smoker("localhost", 1883);
        assert_eq!(config.client_id(), "pitwatch-01-smoker");
        assert_eq!(config.client_id(), config.client_id());
    }
}
