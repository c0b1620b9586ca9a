//! Trend detection engine for pitwatch
//!
//! Maintains a bounded sliding window of recent readings per channel and
//! classifies the time-windowed delta against a declarative alert policy.
//!
//! Key constraints:
//! - No heap allocation in the per-message path
//! - One window and one policy per channel, never shared
//! - Window state is volatile; a restart rebuilds it from scratch
//!
//! ```
//! use pitwatch_core::{AlertPolicy, ChannelId, Outcome, Reading, TrendMonitor};
//!
//! let channel = ChannelId::new("01-smoker").unwrap();
//! let mut monitor: TrendMonitor = TrendMonitor::new(channel, AlertPolicy::smoker());
//!
//! let reading = Reading::decode(channel, b"09/01/26 12:00:00,205.2").unwrap();
//! match monitor.observe(reading) {
//!     Outcome::Warming { .. } => {}    // window not yet full
//!     Outcome::Classified(_eval) => {} // ALERT or NORMAL
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod monitor;
pub mod policy;
pub mod reading;
pub mod window;

// Public API
pub use errors::{DecodeError, TrendError};
pub use monitor::{Outcome, TrendMonitor};
pub use policy::{AlertPolicy, Classification, Evaluation, TrendDirection};
pub use reading::{ChannelId, Reading, TimeToken};
pub use window::{SlidingWindow, WindowState, MAX_WINDOW};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
