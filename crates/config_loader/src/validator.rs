//! 配置校验模块
//!
//! 校验规则：
//! - broker 地址非空，端口非 0
//! - client id 前缀非空
//! - 队列容量、包大小、超时均 > 0
//! - topic 非空，frame topic 不含通配符
//! - fps_interval_secs 为有限正数，且可表示为 Duration
//! - worker_threads (若设置) > 0

use std::time::Duration;

use contracts::{PluginConfig, PluginError};

/// 校验 PluginConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &PluginConfig) -> Result<(), PluginError> {
    validate_mqtt(config)?;
    validate_topics(config)?;
    validate_frame(config)?;
    validate_runtime(config)?;
    validate_observability(config)?;
    Ok(())
}

/// 校验 broker 连接参数
fn validate_mqtt(config: &PluginConfig) -> Result<(), PluginError> {
    let mqtt = &config.mqtt;

    if mqtt.host.trim().is_empty() {
        return Err(PluginError::config_validation(
            "mqtt.host",
            "host cannot be empty",
        ));
    }

    if mqtt.port == 0 {
        return Err(PluginError::config_validation(
            "mqtt.port",
            "port must be non-zero",
        ));
    }

    if mqtt.client_id_prefix.trim().is_empty() {
        return Err(PluginError::config_validation(
            "mqtt.client_id_prefix",
            "client id prefix cannot be empty",
        ));
    }

    let positive = [
        ("mqtt.max_packet_size", mqtt.max_packet_size),
        ("mqtt.request_capacity", mqtt.request_capacity),
        ("mqtt.inbound_capacity", mqtt.inbound_capacity),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(PluginError::config_validation(field, "must be > 0"));
        }
    }

    if mqtt.connect_timeout_secs == 0 {
        return Err(PluginError::config_validation(
            "mqtt.connect_timeout_secs",
            "must be > 0",
        ));
    }

    Ok(())
}

/// 校验 topic
fn validate_topics(config: &PluginConfig) -> Result<(), PluginError> {
    let mqtt = &config.mqtt;

    if mqtt.command_topic.is_empty() {
        return Err(PluginError::config_validation(
            "mqtt.command_topic",
            "topic cannot be empty",
        ));
    }

    if mqtt.frame_topic.is_empty() {
        return Err(PluginError::config_validation(
            "mqtt.frame_topic",
            "topic cannot be empty",
        ));
    }

    // 发布 topic 不允许通配符
    if mqtt.frame_topic.contains(['+', '#']) {
        return Err(PluginError::config_validation(
            "mqtt.frame_topic",
            format!(
                "publish topic '{}' must not contain wildcards",
                mqtt.frame_topic
            ),
        ));
    }

    Ok(())
}

/// 校验帧处理参数
fn validate_frame(config: &PluginConfig) -> Result<(), PluginError> {
    let interval = config.frame.fps_interval_secs;
    if !interval.is_finite() || interval <= 0.0 {
        return Err(PluginError::config_validation(
            "frame.fps_interval_secs",
            format!("fps_interval_secs must be > 0, got {}", interval),
        ));
    }
    if Duration::try_from_secs_f64(interval).is_err() {
        return Err(PluginError::config_validation(
            "frame.fps_interval_secs",
            format!("fps_interval_secs is out of range, got {}", interval),
        ));
    }
    Ok(())
}

/// 校验运行时参数
fn validate_runtime(config: &PluginConfig) -> Result<(), PluginError> {
    if config.runtime.worker_threads == Some(0) {
        return Err(PluginError::config_validation(
            "runtime.worker_threads",
            "worker_threads must be > 0 when set",
        ));
    }
    Ok(())
}

fn validate_observability(config: &PluginConfig) -> Result<(), PluginError> {
    if config.observability.log_level.trim().is_empty() {
        return Err(PluginError::config_validation(
            "observability.log_level",
            "log level cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&PluginConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_host() {
        let mut config = PluginConfig::default();
        config.mqtt.host = "  ".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("mqtt.host"));
    }

    #[test]
    fn test_zero_port() {
        let mut config = PluginConfig::default();
        config.mqtt.port = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("mqtt.port"));
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = PluginConfig::default();
        config.mqtt.inbound_capacity = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("mqtt.inbound_capacity"));
    }

    #[test]
    fn test_frame_topic_wildcard() {
        let mut config = PluginConfig::default();
        config.mqtt.frame_topic = "rusty_bind/#".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("wildcards"));
    }

    #[test]
    fn test_command_topic_wildcard_allowed() {
        let mut config = PluginConfig::default();
        config.mqtt.command_topic = "rusty_bind/+/command".into();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_fps_interval() {
        let mut config = PluginConfig::default();
        config.frame.fps_interval_secs = 0.0;
        assert!(validate(&config).is_err());

        config.frame.fps_interval_secs = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_fps_interval_too_large() {
        let mut config = PluginConfig::default();
        config.frame.fps_interval_secs = 1e20;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        config.frame.fps_interval_secs = 3600.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_worker_threads() {
        let mut config = PluginConfig::default();
        config.runtime.worker_threads = Some(0);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("runtime.worker_threads"));
    }
}
