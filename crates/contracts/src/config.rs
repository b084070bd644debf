//! PluginConfig - Config Loader output
//!
//! Describes the broker link, per-frame behaviour, runtime sizing and logging.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Complete plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Telemetry broker settings
    #[serde(default)]
    pub mqtt: MqttConfig,

    /// Per-frame behaviour
    #[serde(default)]
    pub frame: FrameConfig,

    /// Async runtime sizing
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Logging and metrics
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// MQTT broker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host
    #[serde(default = "default_mqtt_host")]
    pub host: String,

    /// Broker port
    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    /// Client id prefix; a random suffix is appended per connection
    #[serde(default = "default_client_id_prefix")]
    pub client_id_prefix: String,

    /// Keep-alive interval (seconds)
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Max incoming/outgoing packet size (bytes)
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,

    /// Capacity of the outgoing request queue
    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,

    /// Capacity of the inbound message queue
    #[serde(default = "default_inbound_capacity")]
    pub inbound_capacity: usize,

    /// Connection handshake timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Topic carrying inbound commands
    #[serde(default = "default_command_topic")]
    pub command_topic: String,

    /// Topic receiving published frames
    #[serde(default = "default_frame_topic")]
    pub frame_topic: String,
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id_prefix() -> String {
    "rusty_bind".to_string()
}

fn default_keep_alive_secs() -> u64 {
    5
}

fn default_max_packet_size() -> usize {
    1_000_000
}

fn default_request_capacity() -> usize {
    10
}

fn default_inbound_capacity() -> usize {
    256
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_command_topic() -> String {
    "rusty_bind/command".to_string()
}

fn default_frame_topic() -> String {
    "rusty_bind/frame".to_string()
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            client_id_prefix: default_client_id_prefix(),
            keep_alive_secs: default_keep_alive_secs(),
            max_packet_size: default_max_packet_size(),
            request_capacity: default_request_capacity(),
            inbound_capacity: default_inbound_capacity(),
            connect_timeout_secs: default_connect_timeout_secs(),
            command_topic: default_command_topic(),
            frame_topic: default_frame_topic(),
        }
    }
}

/// Per-frame behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Publish a `FrameSnapshot` every frame
    #[serde(default = "default_publish_frames")]
    pub publish_frames: bool,

    /// Synchronous work simulated on the host thread (milliseconds)
    #[serde(default = "default_work_delay_ms")]
    pub work_delay_ms: u64,

    /// Duration of the background task spawned each frame (microseconds, 0 = none)
    #[serde(default = "default_background_task_us")]
    pub background_task_us: u64,

    /// Frame-rate reporting interval (seconds)
    #[serde(default = "default_fps_interval_secs")]
    pub fps_interval_secs: f64,
}

fn default_publish_frames() -> bool {
    true
}

fn default_work_delay_ms() -> u64 {
    100
}

fn default_background_task_us() -> u64 {
    10
}

fn default_fps_interval_secs() -> f64 {
    1.0
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            publish_frames: default_publish_frames(),
            work_delay_ms: default_work_delay_ms(),
            background_task_us: default_background_task_us(),
            fps_interval_secs: default_fps_interval_secs(),
        }
    }
}

/// Async runtime sizing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Worker thread count (None = one per core)
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

/// Logging and metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default log level (`RUST_LOG` takes precedence)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PluginConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.command_topic, "rusty_bind/command");
        assert_eq!(config.frame.work_delay_ms, 100);
        assert_eq!(config.observability.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: PluginConfig =
            serde_json::from_str(r#"{"mqtt": {"host": "broker.local"}}"#).unwrap();
        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.mqtt.keep_alive_secs, 5);
        assert_eq!(config.mqtt.max_packet_size, 1_000_000);
    }

    #[test]
    fn test_log_format_snake_case() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"log_format": "json"}"#).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
