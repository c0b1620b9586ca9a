//! Error taxonomy for the consumer process
//!
//! Connection-level failures are fatal and never retried here, matching
//! the deliberately minimal reliability model: the process logs the cause
//! and exits non-zero. Decode failures are contained to the one message
//! that produced them unless configuration says otherwise.

use thiserror::Error;

use pitwatch_core::DecodeError;

/// Failures at the broker seam
#[derive(Debug, Error)]
pub enum SourceError {
    /// Broker unreachable or the connection dropped
    #[error("connection to broker failed: {0}")]
    Connection(String),

    /// Subscription to the channel queue was refused
    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// Acknowledgment could not be sent
    #[error("acknowledgment failed: {0}")]
    Ack(String),

    /// `ack` called with no delivery outstanding
    #[error("no delivery pending acknowledgment")]
    NothingPending,
}

/// Failures that end the consume loop
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The broker seam failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A message body failed to decode under [`DecodePolicy::Fail`]
    ///
    /// The message is left unacknowledged, so the broker redelivers it
    /// after reconnect - the operator opted into that behavior.
    ///
    /// [`DecodePolicy::Fail`]: crate::config::DecodePolicy::Fail
    #[error("failed to decode message body: {0}")]
    Decode(DecodeError),

    /// The source reported end of stream; the broker should never do this
    #[error("reading source closed unexpectedly")]
    SourceClosed,
}
