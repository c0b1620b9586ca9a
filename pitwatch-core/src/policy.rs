//! Alert policies and trend classification
//!
//! A policy is declarative per-channel configuration: window capacity,
//! threshold in degrees, and the direction of change it watches for. It is
//! immutable for the process lifetime. Evaluation is a pure function over
//! a trend value - no error conditions, no side effects; the caller
//! decides what to do with the classification.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of change a policy watches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrendDirection {
    /// Alert when the value drops by at least the threshold over the window
    Decrease,
    /// Alert when the value changes by less than the threshold (stall)
    Plateau,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Decrease => f.write_str("decrease"),
            TrendDirection::Plateau => f.write_str("plateau"),
        }
    }
}

/// Per-channel alert configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertPolicy {
    /// Window capacity in readings
    pub capacity: usize,
    /// Threshold in degrees, always non-negative
    pub threshold: f32,
    /// Direction of change to alert on
    pub direction: TrendDirection,
}

impl AlertPolicy {
    /// Create a policy with explicit parameters
    pub fn new(capacity: usize, threshold: f32, direction: TrendDirection) -> Self {
        Self {
            capacity,
            threshold: abs(threshold),
            direction,
        }
    }

    /// Smoker-temperature policy: 15 degree drop over 5 readings
    ///
    /// At one reading every 30 seconds the window spans 2.5 minutes.
    pub fn smoker() -> Self {
        Self {
            capacity: 5,
            threshold: 15.0,
            direction: TrendDirection::Decrease,
        }
    }

    /// Food-stall policy: under 1 degree of change over 20 readings
    ///
    /// At one reading every 30 seconds the window spans 10 minutes.
    pub fn food_stall() -> Self {
        Self {
            capacity: 20,
            threshold: 1.0,
            direction: TrendDirection::Plateau,
        }
    }

    /// Classify a trend value against this policy
    ///
    /// `current` is the newest reading's value, carried along for
    /// logging/signaling by the caller.
    pub fn evaluate(&self, trend: f32, current: f32) -> Evaluation {
        let alerted = match self.direction {
            TrendDirection::Decrease => trend <= -self.threshold,
            TrendDirection::Plateau => abs(trend) < self.threshold,
        };

        Evaluation {
            classification: if alerted {
                Classification::Alert
            } else {
                Classification::Normal
            },
            trend,
            current,
        }
    }
}

/// Outcome of evaluating a full window against a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Trend crossed the policy threshold
    Alert,
    /// Trend within normal bounds
    Normal,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Alert => f.write_str("ALERT"),
            Classification::Normal => f.write_str("NORMAL"),
        }
    }
}

/// Classification plus the values that triggered it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// ALERT or NORMAL
    pub classification: Classification,
    /// Computed trend (newest minus oldest) in degrees
    pub trend: f32,
    /// Newest reading's value in degrees
    pub current: f32,
}

// f32::abs lives in std; keep the engine no_std-clean
#[inline]
fn abs(x: f32) -> f32 {
    if x.is_sign_negative() {
        -x
    } else {
        x
    }
}
