//! 帧指标收集模块
//!
//! 记录插件每帧处理、命令、发布的运行指标，并在内存中聚合统计。

use metrics::{counter, gauge, histogram};

/// 记录一帧处理完成
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_processed;
///
/// record_frame_processed(interface.frame());
/// ```
pub fn record_frame_processed(frame: u64) {
    counter!("rusty_bind_frames_total").increment(1);

    // 帧号 (用于检测跳帧)
    gauge!("rusty_bind_last_frame").set(frame as f64);
}

/// 记录帧率
pub fn record_fps(fps: f64) {
    gauge!("rusty_bind_fps").set(fps);
    histogram!("rusty_bind_fps_hist").record(fps);
}

/// 记录收到的命令
pub fn record_command(kind: &str) {
    counter!(
        "rusty_bind_commands_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录无法解析的命令
pub fn record_command_rejected() {
    counter!("rusty_bind_commands_rejected_total").increment(1);
}

/// 记录帧发布结果
pub fn record_frame_published(topic: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "rusty_bind_frames_published_total",
        "topic" => topic.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录因入站队列已满而丢弃的消息
pub fn record_inbound_dropped(topic: &str) {
    counter!(
        "rusty_bind_inbound_dropped_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 帧指标聚合器
///
/// 在内存中聚合指标，便于在插件退出时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FrameMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 跳过的帧数 (帧号跳变超过 1)
    pub skipped_frames: u64,

    /// 帧号未前进的次数
    pub frame_regressions: u64,

    /// 处理的命令数
    pub commands: u64,

    /// 发布失败次数
    pub publish_failures: u64,

    /// 帧率统计
    pub fps_stats: FpsStats,

    last_frame: Option<u64>,
}

impl FrameMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一帧
    pub fn update_frame(&mut self, frame: u64) {
        self.total_frames = self.total_frames.saturating_add(1);

        if let Some(last) = self.last_frame {
            if frame <= last {
                self.frame_regressions += 1;
            } else if frame - last > 1 {
                self.skipped_frames = self.skipped_frames.saturating_add(frame - last - 1);
            }
        }
        self.last_frame = Some(frame);
    }

    /// 记录帧率采样
    pub fn update_fps(&mut self, fps: f64) {
        self.fps_stats.record(fps);
    }

    /// 记录一条命令
    pub fn update_command(&mut self) {
        self.commands += 1;
    }

    /// 记录一次发布失败
    pub fn update_publish_failure(&mut self) {
        self.publish_failures += 1;
    }

    /// 最近一帧的帧号
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// 生成摘要报告
    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            total_frames: self.total_frames,
            skipped_frames: self.skipped_frames,
            frame_regressions: self.frame_regressions,
            commands: self.commands,
            publish_failures: self.publish_failures,
            skip_rate: if self.total_frames > 0 {
                self.skipped_frames as f64
                    / self.total_frames.saturating_add(self.skipped_frames) as f64
                    * 100.0
            } else {
                0.0
            },
            fps: self.fps_stats.summary(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct FrameSummary {
    pub total_frames: u64,
    pub skipped_frames: u64,
    pub frame_regressions: u64,
    pub commands: u64,
    pub publish_failures: u64,
    pub skip_rate: f64,
    pub fps: FpsSummary,
}

impl std::fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Frame Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Skipped frames: {} ({:.2}%)",
            self.skipped_frames, self.skip_rate
        )?;
        writeln!(f, "Frame regressions: {}", self.frame_regressions)?;
        writeln!(f, "Commands: {}", self.commands)?;
        writeln!(f, "Publish failures: {}", self.publish_failures)?;
        writeln!(f, "FPS: {}", self.fps)?;
        Ok(())
    }
}

/// 帧率采样的在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct FpsStats {
    samples: u64,
    mean: f64,
    m2: f64,
    lowest: f64,
    highest: f64,
}

impl FpsStats {
    pub fn record(&mut self, fps: f64) {
        self.samples += 1;
        if self.samples == 1 {
            self.mean = fps;
            self.lowest = fps;
            self.highest = fps;
            return;
        }

        self.lowest = self.lowest.min(fps);
        self.highest = self.highest.max(fps);
        let delta = fps - self.mean;
        self.mean += delta / self.samples as f64;
        self.m2 += delta * (fps - self.mean);
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn summary(&self) -> FpsSummary {
        let std_dev = if self.samples < 2 {
            0.0
        } else {
            (self.m2 / (self.samples - 1) as f64).sqrt()
        };
        FpsSummary {
            samples: self.samples,
            lowest: self.lowest,
            highest: self.highest,
            mean: self.mean,
            std_dev,
        }
    }
}

/// 帧率摘要
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FpsSummary {
    pub samples: u64,
    pub lowest: f64,
    pub highest: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl std::fmt::Display for FpsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.samples == 0 {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{:.1} avg, {:.1}..{:.1}, sd {:.2} over {} windows",
            self.mean, self.lowest, self.highest, self.std_dev, self.samples
        )
    }
}
