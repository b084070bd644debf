//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Apply environment overrides (`MQTT_HOST`, `MQTT_PORT`)
//! - Validate configuration legality
//! - Generate `PluginConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//!
//! let config = ConfigLoader::from_env().unwrap();
//! println!("Broker: {}:{}", config.mqtt.host, config.mqtt.port);
//! ```

mod parser;
mod validator;

pub use contracts::PluginConfig;
pub use parser::ConfigFormat;

use contracts::PluginError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a configuration file
pub const CONFIG_PATH_ENV: &str = "RUSTY_BIND_CONFIG";

/// Environment variable overriding the broker host
pub const MQTT_HOST_ENV: &str = "MQTT_HOST";

/// Environment variable overriding the broker port
pub const MQTT_PORT_ENV: &str = "MQTT_PORT";

/// Configuration loader
///
/// Provides static methods to load configuration from files, strings or the environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PluginConfig, PluginError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<PluginConfig, PluginError> {
        Self::parse_and_validate(content, format)
    }

    /// Load configuration the way the plugin does at startup
    ///
    /// Reads the file named by `RUSTY_BIND_CONFIG` (defaults when unset), then
    /// applies `MQTT_HOST` / `MQTT_PORT` overrides and validates the result.
    pub fn from_env() -> Result<PluginConfig, PluginError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigLoader::from_env`] with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<PluginConfig, PluginError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                debug!(path = %path.display(), "loading plugin config file");
                let format = Self::detect_format(&path)?;
                parser::parse(&Self::read_file(&path)?, format)?
            }
            None => PluginConfig::default(),
        };

        Self::apply_overrides(&mut config, &lookup)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize PluginConfig to TOML string
    pub fn to_toml(config: &PluginConfig) -> Result<String, PluginError> {
        toml::to_string_pretty(config)
            .map_err(|e| PluginError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PluginConfig to JSON string
    pub fn to_json(config: &PluginConfig) -> Result<String, PluginError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| PluginError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, PluginError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            PluginError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            PluginError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, PluginError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Apply environment overrides on top of file values
    fn apply_overrides<F>(config: &mut PluginConfig, lookup: &F) -> Result<(), PluginError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(MQTT_HOST_ENV) {
            config.mqtt.host = host;
        }

        if let Some(port) = lookup(MQTT_PORT_ENV) {
            config.mqtt.port = port.trim().parse().map_err(|e| {
                PluginError::config_validation(MQTT_PORT_ENV, format!("invalid port '{port}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<PluginConfig, PluginError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[mqtt]
host = "broker.local"
frame_topic = "sim/frame"

[frame]
work_delay_ms = 5
"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.frame.work_delay_ms, 5);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = "[mqtt]\nframe_topic = \"sim/#\"\n";
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("wildcards"));
    }

    #[test]
    fn test_oversized_fps_interval_rejected() {
        let content = "[frame]\nfps_interval_secs = 1e20\n";
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, PluginError::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.mqtt.frame_topic, "sim/frame");
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ConfigLoader::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn test_from_lookup_env_overrides() {
        let config =
            ConfigLoader::from_lookup(lookup(&[("MQTT_HOST", "10.0.0.7"), ("MQTT_PORT", "1884")]))
                .unwrap();
        assert_eq!(config.mqtt.host, "10.0.0.7");
        assert_eq!(config.mqtt.port, 1884);
    }

    #[test]
    fn test_from_lookup_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"mqtt": {"host": "from-file", "port": 2000}}"#)
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = ConfigLoader::from_lookup(lookup(&[
            ("RUSTY_BIND_CONFIG", path.as_str()),
            ("MQTT_HOST", "from-env"),
        ]))
        .unwrap();
        assert_eq!(config.mqtt.host, "from-env");
        assert_eq!(config.mqtt.port, 2000);
    }

    #[test]
    fn test_from_lookup_invalid_port() {
        let err = ConfigLoader::from_lookup(lookup(&[("MQTT_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, PluginError::ConfigValidation { .. }));

        let err = ConfigLoader::from_lookup(lookup(&[("MQTT_PORT", "0")])).unwrap_err();
        assert!(err.to_string().contains("mqtt.port"));
    }

    #[test]
    fn test_from_lookup_missing_file() {
        let err = ConfigLoader::from_lookup(lookup(&[(
            "RUSTY_BIND_CONFIG",
            "/nonexistent/rusty_bind.toml",
        )]))
        .unwrap_err();
        assert!(matches!(err, PluginError::Io(_)));
    }
}
