//! Mock telemetry link
//!
//! In-memory link for tests. Clones share state, so a test can keep one
//! handle to inject commands and inspect publishes while the plugin owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::PluginError;

use crate::link::{InboundMessage, TelemetryLink};
use crate::metrics::LinkMetrics;

/// Message captured by `MockLink::try_publish`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    /// Payload as UTF-8 text (lossy)
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[derive(Debug, Default)]
struct MockState {
    inbound: VecDeque<InboundMessage>,
    published: Vec<PublishedMessage>,
    fail_publish: bool,
    closed: bool,
}

/// Mock telemetry link
#[derive(Debug, Clone)]
pub struct MockLink {
    name: String,
    state: Arc<Mutex<MockState>>,
    metrics: Arc<LinkMetrics>,
}

impl MockLink {
    /// Create an empty mock link
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
            metrics: Arc::new(LinkMetrics::new()),
        }
    }

    /// Queue an inbound message
    pub fn push_inbound(&self, topic: impl Into<String>, payload: impl Into<String>) {
        self.state()
            .inbound
            .push_back(InboundMessage::new(topic, payload));
        self.metrics.inc_received_count();
    }

    /// Inbound messages not yet consumed
    pub fn pending_inbound(&self) -> usize {
        self.state().inbound.len()
    }

    /// Every message published so far
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state().published.clone()
    }

    /// Payloads published on `topic`, as text
    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.state()
            .published
            .iter()
            .filter(|m| m.topic == topic)
            .map(PublishedMessage::payload_str)
            .collect()
    }

    /// Make subsequent publishes fail
    pub fn set_fail_publish(&self, fail: bool) {
        self.state().fail_publish = fail;
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetryLink for MockLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_recv(&mut self) -> Option<InboundMessage> {
        self.state().inbound.pop_front()
    }

    fn try_publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PluginError> {
        let mut state = self.state();
        if state.closed || state.fail_publish {
            self.metrics.inc_publish_failure_count();
            let reason = if state.closed { "link closed" } else { "mock failure" };
            return Err(PluginError::publish(topic, reason));
        }

        state.published.push(PublishedMessage {
            topic: topic.to_string(),
            payload,
        });
        self.metrics.inc_published_count();
        Ok(())
    }

    fn close(&mut self) -> Result<(), PluginError> {
        self.state().closed = true;
        Ok(())
    }

    fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }
}
