//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - Prometheus 指标导出 (可选)
//! - 帧率计数与帧统计聚合
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_with_config, metrics};
//!
//! // 初始化
//! observability::init_with_config(&config.observability)?;
//!
//! // 记录帧指标
//! metrics::record_frame_processed(interface.frame());
//! ```

pub mod fps;
pub mod metrics;

use anyhow::{Context, Result};
use contracts::{LogFormat, ObservabilityConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::fps::FrameRateCounter;
pub use crate::metrics::{
    record_command, record_command_rejected, record_fps, record_frame_processed,
    record_frame_published, record_inbound_dropped, FrameMetricsAggregator, FrameSummary,
    FpsStats, FpsSummary,
};

/// 使用默认配置初始化 (Compact 日志，无 Prometheus)
pub fn init() -> Result<()> {
    init_with_config(&ObservabilityConfig::default())
}

/// 使用自定义配置初始化
///
/// 宿主进程可能多次加载插件；重复初始化返回错误，由调用方决定是否忽略。
pub fn init_with_config(config: &ObservabilityConfig) -> Result<()> {
    // 1. Initialize Tracing
    init_tracing(config)?;

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅初始化 Tracing
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

/// 仅初始化 Prometheus 指标（不初始化 Tracing）
///
/// 用于 Tracing 已由其他模块初始化的场景。
pub fn init_metrics_only(port: u16) -> Result<()> {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
