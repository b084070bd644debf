//! Inbound control commands.
//!
//! Commands arrive as untagged JSON objects; the first shape that parses wins:
//! - `{"shutdown": true}` asks the host to shut its interface down
//! - `{"speed_test": true}` switches the plugin into minimal-work mode

use serde::{Deserialize, Serialize};

use crate::PluginError;

/// Control command received on the command topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Shutdown { shutdown: bool },
    SpeedTest { speed_test: bool },
}

impl Command {
    /// Parse a command from its JSON payload
    ///
    /// # Errors
    /// Returns `PluginError::CommandParse` if the payload matches no command shape
    pub fn parse(payload: &str) -> Result<Self, PluginError> {
        serde_json::from_str(payload)
            .map_err(|e| PluginError::command_parse(payload, e.to_string()))
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Shutdown { .. } => "shutdown",
            Command::SpeedTest { .. } => "speed_test",
        }
    }
}
