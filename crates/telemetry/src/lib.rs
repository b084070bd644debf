//! # Telemetry
//!
//! 遥测链路模块。
//!
//! 负责：
//! - 从 broker 接收控制命令 (非阻塞，供宿主帧线程轮询)
//! - 发布帧快照 (fire-and-forget)
//! - 入站队列有界，慢消费者只丢消息不阻塞事件循环

pub mod link;
pub mod metrics;
pub mod mock;
pub mod mqtt;

pub use link::{InboundMessage, TelemetryLink};
pub use metrics::{LinkMetrics, MetricsSnapshot};
pub use mock::{MockLink, PublishedMessage};
pub use mqtt::{EventLoopTask, MqttLink};
