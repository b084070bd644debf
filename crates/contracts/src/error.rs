//! Layered error definitions
//!
//! Categorized by source: config / link / command / runtime

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum PluginError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Link Errors =====
    /// Broker connection error
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Subscription error
    #[error("subscribe to '{topic}' failed: {message}")]
    Subscribe { topic: String, message: String },

    /// Publish error
    #[error("publish to '{topic}' failed: {message}")]
    Publish { topic: String, message: String },

    // ===== Command Errors =====
    /// Inbound command could not be parsed
    #[error("unrecognized command payload '{payload}': {message}")]
    CommandParse { payload: String, message: String },

    /// Outbound payload could not be serialized
    #[error("serialize error: {message}")]
    Serialize { message: String },

    // ===== Runtime Errors =====
    /// Async runtime error
    #[error("runtime error: {message}")]
    Runtime { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PluginError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create subscribe error
    pub fn subscribe(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subscribe {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create command parse error
    pub fn command_parse(payload: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandParse {
            payload: payload.into(),
            message: message.into(),
        }
    }

    /// Create runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = PluginError::config_validation("mqtt.port", "port must be non-zero");
        assert_eq!(
            err.to_string(),
            "config validation error at 'mqtt.port': port must be non-zero"
        );

        let err = PluginError::publish("rusty_bind/frame", "request queue full");
        assert!(err.to_string().contains("rusty_bind/frame"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PluginError = io.into();
        assert!(matches!(err, PluginError::Io(_)));
    }
}
