//! MQTT reading source
//!
//! Maps the channel queue contract onto MQTT at-least-once semantics:
//!
//! - durable named queue -> persistent session + QoS 1 subscription on the
//!   channel topic
//! - idempotent queue declare -> subscribe (safe to repeat)
//! - optional backlog purge -> one clean-session connect cycle before the
//!   durable session is opened, discarding state from a prior run
//! - per-consumer in-flight cap of 1 -> manual acks and a strictly
//!   sequential poll/ack loop; no second delivery is processed before the
//!   first acknowledgment
//! - redelivery of unacknowledged messages on reconnect is QoS 1 behavior
//!
//! Connection failures here are fatal for the process; there is no
//! retry/backoff layer.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, Publish, QoS};
use tracing::{debug, warn};

use crate::config::ChannelConfig;
use crate::error::SourceError;
use crate::source::{Delivery, ReadingSource};

/// How many pending requests the client channel buffers
const CLIENT_QUEUE_CAP: usize = 10;

const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Reading source backed by an MQTT broker
pub struct MqttSource {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    /// Publishes that arrived while waiting for a control packet
    ///
    /// A persistent session can start pushing queued messages right after
    /// the connection acknowledgment, before our subscribe round-trips.
    stash: VecDeque<Publish>,
    /// The one delivery handed out by `recv` and not yet acknowledged
    inflight: Option<Publish>,
}

impl MqttSource {
    /// Connect to the broker configured for this channel
    ///
    /// Blocks until the broker acknowledges the session; an unreachable
    /// broker surfaces as [`SourceError::Connection`]. With
    /// `purge_backlog` set, a throwaway clean-session connect first
    /// discards any stale session and queued backlog from a prior run.
    pub async fn connect(config: &ChannelConfig) -> Result<Self, SourceError> {
        if config.purge_backlog {
            purge_session(config).await?;
        }

        let mut options = base_options(config);
        options.set_clean_session(false);
        options.set_manual_acks(true);

        let (client, mut eventloop) = AsyncClient::new(options, CLIENT_QUEUE_CAP);
        wait_for_connack(&mut eventloop).await?;

        Ok(Self {
            client,
            eventloop,
            topic: config.queue.clone(),
            stash: VecDeque::new(),
            inflight: None,
        })
    }

    /// (Re)declare the channel subscription; idempotent
    pub async fn subscribe(&mut self) -> Result<(), SourceError> {
        self.client
            .subscribe(&self.topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| SourceError::Subscribe(e.to_string()))?;

        // drive the event loop until the broker confirms the subscription,
        // stashing any deliveries the persistent session pushes early
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::SubAck(_))) => return Ok(()),
                Ok(Event::Incoming(Packet::Publish(publish))) => self.stash.push_back(publish),
                Ok(_) => continue,
                Err(e) => return Err(SourceError::Subscribe(e.to_string())),
            }
        }
    }
}

#[async_trait]
impl ReadingSource for MqttSource {
    async fn recv(&mut self) -> Result<Option<Delivery>, SourceError> {
        if let Some(publish) = self.stash.pop_front() {
            let delivery = Delivery {
                body: publish.payload.to_vec(),
                redelivered: publish.dup,
            };
            self.inflight = Some(publish);
            return Ok(Some(delivery));
        }

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let delivery = Delivery {
                        body: publish.payload.to_vec(),
                        redelivered: publish.dup,
                    };
                    self.inflight = Some(publish);
                    return Ok(Some(delivery));
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("broker requested disconnect");
                    return Ok(None);
                }
                Ok(event) => {
                    debug!(?event, "ignoring non-delivery event");
                    continue;
                }
                Err(e) => return Err(SourceError::Connection(e.to_string())),
            }
        }
    }

    async fn ack(&mut self) -> Result<(), SourceError> {
        let publish = self.inflight.take().ok_or(SourceError::NothingPending)?;
        self.client
            .ack(&publish)
            .await
            .map_err(|e| SourceError::Ack(e.to_string()))
    }

    async fn close(&mut self) {
        // a failed disconnect just means the connection is already gone
        let _ = self.client.disconnect().await;
    }
}

fn base_options(config: &ChannelConfig) -> MqttOptions {
    let mut options = MqttOptions::new(config.client_id(), config.host.as_str(), config.port);
    options.set_keep_alive(KEEP_ALIVE);
    options
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), SourceError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
            Ok(_) => continue,
            Err(e) => return Err(SourceError::Connection(e.to_string())),
        }
    }
}

/// Open and drop a clean session so the broker forgets queued backlog
async fn purge_session(config: &ChannelConfig) -> Result<(), SourceError> {
    let mut options = base_options(config);
    options.set_clean_session(true);

    let (client, mut eventloop) = AsyncClient::new(options, CLIENT_QUEUE_CAP);
    wait_for_connack(&mut eventloop).await?;

    debug!(queue = %config.queue, "purged stale session state");

    client
        .disconnect()
        .await
        .map_err(|e| SourceError::Connection(e.to_string()))?;

    // drain until the disconnect goes out
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => return Ok(()),
            Ok(_) => continue,
        }
    }
}
