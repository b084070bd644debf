//! MqttLink - telemetry over an MQTT broker
//!
//! The link is split in two halves:
//! - `MqttLink`, owned by the plugin and polled from the host frame thread
//! - an event-loop future that must be spawned on the async runtime; it drives
//!   the connection and forwards inbound publishes into a bounded queue

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use contracts::{MqttConfig, PluginError};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::link::{InboundMessage, TelemetryLink};
use crate::metrics::LinkMetrics;

/// Event-loop half of an MQTT link; spawn it on the runtime
pub type EventLoopTask = Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send>>;

/// Link to an MQTT broker
pub struct MqttLink {
    name: String,
    client: AsyncClient,
    inbound: mpsc::Receiver<InboundMessage>,
    metrics: Arc<LinkMetrics>,
}

impl std::fmt::Debug for MqttLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttLink").field("name", &self.name).finish()
    }
}

impl MqttLink {
    /// Connect to the broker and wait for its CONNACK
    ///
    /// The handshake is bounded by `connect_timeout_secs`. The returned
    /// event-loop task must be spawned for the link to make progress.
    ///
    /// # Errors
    /// Returns `PluginError::Connection` if the broker is unreachable, refuses
    /// the connection, or does not answer in time.
    #[instrument(name = "mqtt_link_connect", skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(
        config: &MqttConfig,
        client_id: &str,
    ) -> Result<(Self, EventLoopTask), PluginError> {
        let mut options = MqttOptions::new(client_id, config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        options.set_max_packet_size(config.max_packet_size, config.max_packet_size);

        let (client, mut eventloop) = AsyncClient::new(options, config.request_capacity);

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        tokio::time::timeout(timeout, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| {
                PluginError::connection(format!(
                    "no CONNACK from {}:{} within {}s",
                    config.host, config.port, config.connect_timeout_secs
                ))
            })??;

        info!(client_id, "connected to mqtt broker");

        let (tx, rx) = mpsc::channel(config.inbound_capacity);
        let metrics = Arc::new(LinkMetrics::new());
        let task: EventLoopTask = Box::pin(forward_inbound(
            eventloop,
            tx,
            Arc::clone(&metrics),
            client_id.to_string(),
        ));

        Ok((
            Self {
                name: client_id.to_string(),
                client,
                inbound: rx,
                metrics,
            },
            task,
        ))
    }

    /// Subscribe to a topic (QoS 1)
    pub async fn subscribe(&self, topic: &str) -> Result<(), PluginError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| PluginError::subscribe(topic, e.to_string()))?;
        debug!(link = %self.name, topic, "subscribed");
        Ok(())
    }
}

impl TelemetryLink for MqttLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_recv(&mut self) -> Option<InboundMessage> {
        self.inbound.try_recv().ok()
    }

    fn try_publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PluginError> {
        match self
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
        {
            Ok(()) => {
                self.metrics.inc_published_count();
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_publish_failure_count();
                Err(PluginError::publish(topic, e.to_string()))
            }
        }
    }

    fn close(&mut self) -> Result<(), PluginError> {
        self.inbound.close();
        self.client
            .try_disconnect()
            .map_err(|e| PluginError::connection(format!("disconnect failed: {e}")))?;
        debug!(link = %self.name, "MqttLink closed");
        Ok(())
    }

    fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }
}

/// Poll until the broker acknowledges the connection
async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), PluginError> {
    loop {
        let event = eventloop
            .poll()
            .await
            .map_err(|e| PluginError::connection(e.to_string()))?;

        if let Event::Incoming(Packet::ConnAck(ack)) = event {
            if ack.code == ConnectReturnCode::Success {
                return Ok(());
            }
            return Err(PluginError::connection(format!(
                "broker refused connection: {:?}",
                ack.code
            )));
        }
    }
}

/// Event loop: forwards inbound publishes until the link goes away
#[instrument(name = "mqtt_event_loop", skip(eventloop, tx, metrics), fields(link = %name))]
async fn forward_inbound(
    mut eventloop: EventLoop,
    tx: mpsc::Sender<InboundMessage>,
    metrics: Arc<LinkMetrics>,
    name: String,
) -> Result<(), PluginError> {
    debug!(link = %name, "event loop started");

    loop {
        let event = match eventloop.poll().await {
            Ok(event) => event,
            Err(e) if tx.is_closed() => {
                debug!(link = %name, error = %e, "event loop stopped after close");
                return Ok(());
            }
            Err(e) => {
                error!(link = %name, error = %e, "mqtt event loop failed");
                return Err(PluginError::connection(e.to_string()));
            }
        };

        let Event::Incoming(Packet::Publish(publish)) = event else {
            continue;
        };

        let payload = match String::from_utf8(publish.payload.to_vec()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(link = %name, topic = %publish.topic, error = %e, "non UTF-8 payload dropped");
                continue;
            }
        };

        match tx.try_send(InboundMessage::new(publish.topic, payload)) {
            Ok(()) => metrics.inc_received_count(),
            Err(mpsc::error::TrySendError::Full(message)) => {
                metrics.inc_dropped_count();
                observability::record_inbound_dropped(&message.topic);
                warn!(link = %name, topic = %message.topic, "inbound queue full, message dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(link = %name, "inbound receiver gone, stopping event loop");
                return Ok(());
            }
        }
    }
}
