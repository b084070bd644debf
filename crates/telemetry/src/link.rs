//! TelemetryLink trait - the plugin's view of its message broker

use std::sync::Arc;

use contracts::PluginError;

use crate::metrics::LinkMetrics;

/// Message received on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Bidirectional, non-blocking message link
///
/// Called from the host's frame thread, so no method may block on the network.
pub trait TelemetryLink: Send {
    /// Link name (used for logging)
    fn name(&self) -> &str;

    /// Take the next queued inbound message, if any
    fn try_recv(&mut self) -> Option<InboundMessage>;

    /// Queue a message for publishing
    ///
    /// # Errors
    /// Returns `PluginError::Publish` if the message could not be queued
    fn try_publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PluginError>;

    /// Close the link
    fn close(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Shared link counters
    fn metrics(&self) -> &Arc<LinkMetrics>;
}
