//! Consume-loop semantics against a scripted in-memory source
//!
//! Verifies the delivery contract the broker seam promises: one
//! acknowledgment per processed message, issued only after processing, a
//! single delivery in flight, and window contents that follow delivered
//! order.

use std::collections::VecDeque;

use async_trait::async_trait;

use pitwatch_consumer::{
    ConsumerError, DecodePolicy, Delivery, ReadingSource, SourceError, TrendConsumer,
};
use pitwatch_core::{AlertPolicy, ChannelId, Classification, TrendDirection, TrendMonitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Delivered,
    Acked,
}

/// In-memory source that hands out a fixed script of message bodies
struct ScriptedSource {
    queue: VecDeque<Delivery>,
    ops: Vec<Op>,
    pending: bool,
    closed: bool,
}

impl ScriptedSource {
    fn new(bodies: &[&str]) -> Self {
        Self {
            queue: bodies.iter().map(|b| Delivery::new(*b)).collect(),
            ops: Vec::new(),
            pending: false,
            closed: false,
        }
    }

    fn acked(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Acked).count()
    }
}

#[async_trait]
impl ReadingSource for ScriptedSource {
    async fn recv(&mut self) -> Result<Option<Delivery>, SourceError> {
        // in-flight limit of 1: the loop must never fetch a second
        // delivery before acknowledging the first
        assert!(
            !self.pending,
            "recv called with a delivery still unacknowledged"
        );

        match self.queue.pop_front() {
            Some(delivery) => {
                self.pending = true;
                self.ops.push(Op::Delivered);
                Ok(Some(delivery))
            }
            None => Ok(None),
        }
    }

    async fn ack(&mut self) -> Result<(), SourceError> {
        if !self.pending {
            return Err(SourceError::NothingPending);
        }
        self.pending = false;
        self.ops.push(Op::Acked);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

fn smoker_consumer(bodies: &[&str], policy: DecodePolicy) -> TrendConsumer<ScriptedSource> {
    let channel = ChannelId::new("01-smoker").unwrap();
    TrendConsumer::new(
        ScriptedSource::new(bodies),
        TrendMonitor::new(channel, AlertPolicy::smoker()),
        policy,
    )
}

#[tokio::test]
async fn acknowledges_each_message_exactly_once_after_processing() {
    let mut consumer = smoker_consumer(
        &[
            "08:30:01,200",
            "08:30:31,198",
            "08:31:01,195",
            "08:31:31,190",
            "08:32:01,183",
        ],
        DecodePolicy::Skip,
    );

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::SourceClosed)));

    let source = consumer.source();
    assert_eq!(source.acked(), 5);

    // strict alternation: every delivery is acknowledged before the next
    // one is fetched
    for pair in source.ops.chunks(2) {
        assert_eq!(pair, [Op::Delivered, Op::Acked]);
    }

    // the window absorbed all five readings and classified the drop
    let window = consumer.monitor().window();
    assert!(window.is_full());
    assert_eq!(window.trend(), Ok(-17.0));
}

#[tokio::test]
async fn warming_messages_are_still_acknowledged() {
    let mut consumer = smoker_consumer(
        &["08:30:01,200", "08:30:31,198", "08:31:01,195"],
        DecodePolicy::Skip,
    );

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::SourceClosed)));

    assert_eq!(consumer.source().acked(), 3);
    assert!(!consumer.monitor().window().is_full());
    assert!(consumer.monitor().window().trend().is_err());
}

#[tokio::test]
async fn skip_policy_acks_bad_messages_and_keeps_consuming() {
    let mut consumer = smoker_consumer(
        &[
            "08:30:01,200",
            "garbage-without-a-value",
            "08:30:31,198",
            "08:31:01,not-a-number",
            "08:31:31,195",
        ],
        DecodePolicy::Skip,
    );

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::SourceClosed)));

    // bad messages were acknowledged too, so the queue never stalls
    assert_eq!(consumer.source().acked(), 5);

    // only the three good readings reached the window
    assert_eq!(consumer.monitor().window().len(), 3);
}

#[tokio::test]
async fn fail_policy_stops_without_acknowledging() {
    let mut consumer = smoker_consumer(
        &["garbage-without-a-value", "08:30:01,200"],
        DecodePolicy::Fail,
    );

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::Decode(_))));

    // no acknowledgment: the broker will redeliver after reconnect
    let source = consumer.source();
    assert_eq!(source.acked(), 0);
    assert_eq!(source.ops, vec![Op::Delivered]);
    assert_eq!(consumer.monitor().window().len(), 0);
}

#[tokio::test]
async fn window_reflects_delivered_order() {
    let channel = ChannelId::new("01-smoker").unwrap();
    let policy = AlertPolicy::new(3, 10.0, TrendDirection::Decrease);

    // values published as 200, 190, 180 but delivered reversed
    let mut consumer = TrendConsumer::new(
        ScriptedSource::new(&["t3,180", "t2,190", "t1,200"]),
        TrendMonitor::new(channel, policy),
        DecodePolicy::Skip,
    );

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::SourceClosed)));

    // delivered order gives a rising trend, so no alert fires even though
    // the chronological data dropped 20 degrees
    let window = consumer.monitor().window();
    assert_eq!(window.trend(), Ok(20.0));
    assert_eq!(
        policy.evaluate(window.trend().unwrap(), 200.0).classification,
        Classification::Normal
    );
}

#[tokio::test]
async fn shutdown_closes_the_source() {
    let mut consumer = smoker_consumer(&[], DecodePolicy::Skip);

    let result = consumer.run().await;
    assert!(matches!(result, Err(ConsumerError::SourceClosed)));

    consumer.shutdown().await;
    assert!(consumer.source().closed);
}
