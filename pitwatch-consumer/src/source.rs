//! The broker seam
//!
//! Everything the consume loop needs from a message broker, and nothing
//! more: suspend until the next delivery, acknowledge the one delivery in
//! flight, close the connection. Keeping the seam this narrow lets the
//! loop run unchanged against the MQTT source in production and a
//! scripted in-memory source in tests.

use async_trait::async_trait;

use crate::error::SourceError;

/// One message pulled from the channel queue, not yet acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Raw message body as published
    pub body: Vec<u8>,
    /// Whether the broker flagged this as a redelivery
    pub redelivered: bool,
}

impl Delivery {
    /// Convenience constructor for fresh (non-redelivered) messages
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            redelivered: false,
        }
    }
}

/// Source of readings for one channel
///
/// Implementations must deliver a channel's messages in publish order and
/// keep at most one delivery outstanding: the loop never calls `recv`
/// again before acknowledging the previous delivery, and the ordering of
/// the window depends on that discipline.
#[async_trait]
pub trait ReadingSource: Send {
    /// Suspend until the next delivery arrives
    ///
    /// `Ok(None)` means the source has closed and no further deliveries
    /// will come.
    async fn recv(&mut self) -> Result<Option<Delivery>, SourceError>;

    /// Acknowledge the delivery most recently returned by `recv`
    ///
    /// Exactly one acknowledgment per delivery; the broker may then
    /// discard the message.
    async fn ack(&mut self) -> Result<(), SourceError>;

    /// Close the underlying connection; idempotent
    async fn close(&mut self);
}
