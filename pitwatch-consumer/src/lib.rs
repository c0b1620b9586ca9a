//! Per-channel queue consumer for pitwatch
//!
//! Bridges a durable per-channel queue to the trend engine in
//! `pitwatch-core` with at-least-once semantics: one delivery in flight,
//! one acknowledgment per fully processed message, issued only after the
//! window update and classification complete.
//!
//! The broker is reached through the [`source::ReadingSource`] seam; the
//! shipped implementation is [`mqtt::MqttSource`] (QoS 1, manual acks,
//! persistent session). Tests drive the same loop with an in-memory
//! source.

pub mod config;
pub mod consumer;
pub mod error;
pub mod mqtt;
pub mod source;

pub use config::{ChannelConfig, DecodePolicy};
pub use consumer::TrendConsumer;
pub use error::{ConsumerError, SourceError};
pub use mqtt::MqttSource;
pub use source::{Delivery, ReadingSource};
