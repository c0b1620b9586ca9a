//! Error types for decode and trend failures
//!
//! Errors are kept small and `Copy`: they are returned on the per-message
//! path and carry only inline context, no `String`. A `DecodeError` is
//! always confined to the single message that produced it; whether it is
//! fatal is a policy decision made by the consumer, not here.

use thiserror_no_std::Error;

/// Failures while decoding a queue message body into a [`Reading`]
///
/// The wire format is a delimited text record `"<timestamp>,<value>"`.
/// Anything else decodes to one of these.
///
/// [`Reading`]: crate::reading::Reading
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Message body is not valid UTF-8 text
    #[error("message body is not valid UTF-8")]
    NotUtf8,

    /// No comma-separated value field after the timestamp
    #[error("message body has no value field")]
    MissingValue,

    /// Value field did not parse as a finite number
    #[error("value field is not a finite number")]
    BadValue,
}

/// Failures when asking a window for its trend
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendError {
    /// The window has not seen enough readings yet
    ///
    /// Trend evaluation is only meaningful once the window holds exactly
    /// `required` readings; until then no classification is produced.
    #[error("insufficient data: need {required} readings, have {available}")]
    InsufficientData {
        /// Window capacity the trend is defined over
        required: usize,
        /// Readings currently held
        available: usize,
    },
}
