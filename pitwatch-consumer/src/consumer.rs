//! The consume loop
//!
//! A strictly sequential receive -> decode -> window push -> evaluate ->
//! log -> acknowledge cycle. The acknowledgment always comes last: a crash
//! mid-processing leaves the message unacknowledged, and the broker
//! redelivers it (at-least-once). There is no internal queue or buffering;
//! backpressure is the single in-flight delivery.

use tracing::{info, warn};

use pitwatch_core::{Classification, Outcome, Reading, TrendMonitor};

use crate::config::DecodePolicy;
use crate::error::ConsumerError;
use crate::source::{Delivery, ReadingSource};

/// Trend-monitoring consumer for one channel
pub struct TrendConsumer<S: ReadingSource> {
    source: S,
    monitor: TrendMonitor,
    decode_policy: DecodePolicy,
}

impl<S: ReadingSource> TrendConsumer<S> {
    /// Build a consumer over an already-prepared source
    pub fn new(source: S, monitor: TrendMonitor, decode_policy: DecodePolicy) -> Self {
        Self {
            source,
            monitor,
            decode_policy,
        }
    }

    /// Consume until the source fails or closes
    ///
    /// Cancellation-safe at the receive point: dropping the future while
    /// it awaits a delivery loses nothing, since nothing is in flight
    /// until `recv` returns.
    pub async fn run(&mut self) -> Result<(), ConsumerError> {
        loop {
            let delivery = match self.source.recv().await? {
                Some(delivery) => delivery,
                None => return Err(ConsumerError::SourceClosed),
            };
            self.process(delivery).await?;
        }
    }

    async fn process(&mut self, delivery: Delivery) -> Result<(), ConsumerError> {
        let channel = *self.monitor.channel();

        if delivery.redelivered {
            info!(channel = %channel, "processing a redelivered message");
        }

        let reading = match Reading::decode(channel, &delivery.body) {
            Ok(reading) => reading,
            Err(e) => match self.decode_policy {
                DecodePolicy::Skip => {
                    warn!(channel = %channel, error = %e, "skipping undecodable message");
                    self.source.ack().await?;
                    return Ok(());
                }
                DecodePolicy::Fail => return Err(ConsumerError::Decode(e)),
            },
        };

        match self.monitor.observe(reading) {
            Outcome::Warming { have, need, current } => {
                info!(
                    channel = %channel,
                    value = current,
                    have,
                    need,
                    "reading received, window warming up"
                );
            }
            Outcome::Classified(eval) => {
                let policy = self.monitor.policy();
                match eval.classification {
                    Classification::Alert => warn!(
                        channel = %channel,
                        value = eval.current,
                        trend = eval.trend,
                        threshold = policy.threshold,
                        direction = %policy.direction,
                        "ALERT: trend crossed threshold"
                    ),
                    Classification::Normal => info!(
                        channel = %channel,
                        value = eval.current,
                        trend = eval.trend,
                        "reading received, trend normal"
                    ),
                }
            }
        }

        // only now is the message done; release it from the queue
        self.source.ack().await?;
        Ok(())
    }

    /// Close the source connection; call on every exit path
    pub async fn shutdown(&mut self) {
        self.source.close().await;
    }

    /// The underlying source (used by tests to inspect acknowledgments)
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The monitor driven by this consumer
    pub fn monitor(&self) -> &TrendMonitor {
        &self.monitor
    }
}
