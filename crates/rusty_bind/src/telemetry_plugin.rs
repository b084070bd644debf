//! TelemetryPlugin - the frame plugin shipped in this library.
//!
//! Every host frame it:
//! - reports the frame rate once per interval
//! - drains control commands (`shutdown`, `speed_test`) from the telemetry link
//! - publishes a `FrameSnapshot` of the host's frame counter and position
//! - spawns a short background task and simulates synchronous work
//!
//! In speed-test mode it stops right after command handling, doing the
//! minimum per frame.

use std::time::Duration;

use contracts::{Command, FrameConfig, FrameSnapshot, HostInterface, PluginConfig, PluginError};
use num_format::{Locale, ToFormattedString};
use observability::{FrameMetricsAggregator, FrameRateCounter};
use telemetry::{MqttLink, TelemetryLink};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::context::Context;
use crate::plugin::FramePlugin;

/// Frame plugin reporting host state over a telemetry link
pub struct TelemetryPlugin<L> {
    link: L,
    frame_config: FrameConfig,
    frame_topic: String,
    speed_test: bool,
    fps: FrameRateCounter,
    stats: FrameMetricsAggregator,
}

impl<L: TelemetryLink> std::fmt::Debug for TelemetryPlugin<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryPlugin")
            .field("link", &self.link.name())
            .field("speed_test", &self.speed_test)
            .finish()
    }
}

impl TelemetryPlugin<MqttLink> {
    /// Connect to the configured broker and subscribe to the command topic
    ///
    /// Blocks the calling host thread until the broker has acknowledged the
    /// connection, so frames are never processed without a link.
    #[instrument(name = "telemetry_plugin_connect", skip_all, fields(host = %config.mqtt.host))]
    pub fn connect(context: &Context, config: &PluginConfig) -> Result<Self, PluginError> {
        let client_id = format!("{}-{}", config.mqtt.client_id_prefix, Uuid::new_v4());
        info!(client_id = %client_id, "constructing telemetry plugin");

        let (link, event_loop) = context.block_on(async {
            let (link, event_loop) = MqttLink::connect(&config.mqtt, &client_id).await?;
            link.subscribe(&config.mqtt.command_topic).await?;
            Ok::<_, PluginError>((link, event_loop))
        })?;

        context.spawn(async move {
            if let Err(e) = event_loop.await {
                error!(error = %e, "telemetry event loop stopped");
            }
        });

        Ok(Self::new(link, config))
    }
}

impl<L: TelemetryLink> TelemetryPlugin<L> {
    /// Plugin over an already connected link
    ///
    /// An fps interval that does not fit a `Duration` falls back to one second.
    pub fn new(link: L, config: &PluginConfig) -> Self {
        let fps_interval = Duration::try_from_secs_f64(config.frame.fps_interval_secs)
            .unwrap_or_else(|e| {
                warn!(
                    interval = config.frame.fps_interval_secs,
                    error = %e,
                    "invalid fps interval, reporting every second"
                );
                Duration::from_secs(1)
            });

        Self {
            link,
            frame_config: config.frame.clone(),
            frame_topic: config.mqtt.frame_topic.clone(),
            speed_test: false,
            fps: FrameRateCounter::new(fps_interval),
            stats: FrameMetricsAggregator::new(),
        }
    }

    /// Whether speed-test mode is on
    pub fn speed_test(&self) -> bool {
        self.speed_test
    }

    /// Aggregated frame statistics
    pub fn stats(&self) -> &FrameMetricsAggregator {
        &self.stats
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    fn report_frame_rate(&mut self) {
        if let Some(fps) = self.fps.tick() {
            self.stats.update_fps(fps);
            observability::record_fps(fps);
            info!(fps = %(fps.round() as u64).to_formatted_string(&Locale::en), "frame rate");
        }
    }

    /// Drain and apply queued commands
    ///
    /// A payload that is not a command aborts the drain; later messages stay
    /// queued for the next frame.
    fn handle_commands(&mut self, interface: &dyn HostInterface) -> Result<(), PluginError> {
        while let Some(message) = self.link.try_recv() {
            debug!(topic = %message.topic, payload = %message.payload, "received message");

            let command = Command::parse(&message.payload)
                .inspect_err(|_| observability::record_command_rejected())?;
            self.stats.update_command();
            observability::record_command(command.kind());

            match command {
                Command::Shutdown { shutdown: true } => {
                    info!(name = %interface.name(), "shutdown requested");
                    interface.shutdown();
                }
                Command::Shutdown { shutdown: false } => {}
                Command::SpeedTest { speed_test } => {
                    if speed_test != self.speed_test {
                        info!(speed_test, "speed test mode changed");
                    }
                    self.speed_test = speed_test;
                }
            }
        }
        Ok(())
    }

    fn publish_frame(&mut self, snapshot: &FrameSnapshot) -> Result<(), PluginError> {
        let payload = serde_json::to_vec(snapshot).map_err(|e| PluginError::Serialize {
            message: e.to_string(),
        })?;

        let result = self.link.try_publish(&self.frame_topic, payload);
        observability::record_frame_published(&self.frame_topic, result.is_ok());
        if result.is_err() {
            self.stats.update_publish_failure();
        }
        result
    }
}

impl<L: TelemetryLink> FramePlugin for TelemetryPlugin<L> {
    fn on_frame(
        &mut self,
        context: &Context,
        interface: &dyn HostInterface,
    ) -> Result<(), PluginError> {
        self.report_frame_rate();
        self.handle_commands(interface)?;

        if self.speed_test {
            return Ok(());
        }

        let snapshot = FrameSnapshot {
            frame: interface.frame(),
            position: interface.position(),
        };
        debug!(
            name = %interface.name(),
            frame = snapshot.frame,
            position = ?snapshot.position,
            "on_frame"
        );
        self.stats.update_frame(snapshot.frame);
        observability::record_frame_processed(snapshot.frame);

        if self.frame_config.publish_frames {
            self.publish_frame(&snapshot)?;
        }

        if self.frame_config.background_task_us > 0 {
            let duration = Duration::from_micros(self.frame_config.background_task_us);
            context.spawn(async move {
                debug!("background task started");
                tokio::time::sleep(duration).await;
                debug!("background task completed");
            });
        }

        if self.frame_config.work_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.frame_config.work_delay_ms));
        }

        Ok(())
    }

    fn on_exit(&mut self, _context: &Context) -> Result<(), PluginError> {
        let summary = self.stats.summary();
        info!(
            link = %self.link.name(),
            frames = summary.total_frames,
            skipped = summary.skipped_frames,
            commands = summary.commands,
            publish_failures = summary.publish_failures,
            "telemetry plugin exiting\n{summary}"
        );
        self.link.close()
    }
}
