//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需 MQTT broker，使用 MockLink + FakeHost）
//! - 导出符号的 C 边界测试

#[cfg(test)]
mod contract_tests {
    use contracts::{Command, FrameSnapshot, Position};

    #[test]
    fn test_frame_wire_format() {
        let snapshot = FrameSnapshot {
            frame: 3,
            position: Position::new(1.0, 2.0, 3.0),
        };
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"frame":3,"position":[1.0,2.0,3.0]}"#
        );
    }

    #[test]
    fn test_command_wire_format() {
        assert_eq!(
            Command::parse(r#"{"shutdown": true}"#).unwrap(),
            Command::Shutdown { shutdown: true }
        );
        assert_eq!(
            Command::parse(r#"{"speed_test": false}"#).unwrap(),
            Command::SpeedTest { speed_test: false }
        );
        assert!(Command::parse(r#"{"restart": true}"#).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PluginConfig, Position};
    use rusty_bind::fake_host::{FakeHost, FakePluginSlot};
    use rusty_bind::{Adapter, FramePlugin, TelemetryPlugin};
    use telemetry::MockLink;

    const CONFIG: &str = r#"
[mqtt]
host = "127.0.0.1"
command_topic = "sim/cmd"
frame_topic = "sim/frame"

[frame]
work_delay_ms = 0
background_task_us = 5

[runtime]
worker_threads = 1
"#;

    fn adapter_over(link: MockLink, config: PluginConfig) -> Adapter {
        Adapter::new(
            config,
            Box::new(move |_, config| {
                Ok(Box::new(TelemetryPlugin::new(link.clone(), config)) as Box<dyn FramePlugin>)
            }),
        )
        .unwrap()
    }

    /// End-to-end test: config file -> Adapter -> TelemetryPlugin -> FakeHost
    ///
    /// 验证完整的数据流：
    /// 1. 从 TOML 加载配置
    /// 2. 通过真实的 FFI 访问器读取 FakeHost 状态
    /// 3. 每帧发布 FrameSnapshot，命令改变插件行为
    #[test]
    fn test_e2e_mock_session() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let link = MockLink::new("mock");
        let adapter = adapter_over(link.clone(), config);
        let slot = FakePluginSlot::new();
        let host = FakeHost::new("ego_vehicle");

        adapter.construct(slot.as_ptr());
        adapter.initialize(slot.as_ptr());

        for i in 0..5 {
            host.advance();
            host.set_position(Position::new(i as f64, 0.0, 0.5));
            unsafe { adapter.frame(slot.as_ptr(), host.as_ptr()) };
        }

        let frames = link.published_on("sim/frame");
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0], r#"{"frame":1,"position":[0.0,0.0,0.5]}"#);
        assert_eq!(frames[4], r#"{"frame":5,"position":[4.0,0.0,0.5]}"#);

        // Speed test: frames keep coming, nothing is published.
        link.push_inbound("sim/cmd", r#"{"speed_test": true}"#);
        for _ in 0..3 {
            host.advance();
            unsafe { adapter.frame(slot.as_ptr(), host.as_ptr()) };
        }
        assert_eq!(link.published_on("sim/frame").len(), 5);

        link.push_inbound("sim/cmd", r#"{"speed_test": false}"#);
        link.push_inbound("sim/cmd", r#"{"shutdown": true}"#);
        host.advance();
        unsafe { adapter.frame(slot.as_ptr(), host.as_ptr()) };

        assert_eq!(host.shutdown_requests(), 1);
        let frames = link.published_on("sim/frame");
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[5], r#"{"frame":9,"position":[4.0,0.0,0.5]}"#);

        adapter.exit(slot.as_ptr());
        adapter.destruct(slot.as_ptr());
        assert!(link.is_closed());
        assert_eq!(adapter.plugin_count(), 0);
    }

    #[test]
    fn test_bad_command_does_not_stop_session() {
        let mut config = PluginConfig::default();
        config.frame.work_delay_ms = 0;
        let link = MockLink::new("mock");
        let adapter = adapter_over(link.clone(), config);
        let slot = FakePluginSlot::new();
        let host = FakeHost::new("ego_vehicle");

        adapter.construct(slot.as_ptr());
        link.push_inbound("rusty_bind/command", r#"{"shutdown": "yes"}"#);
        unsafe {
            adapter.frame(slot.as_ptr(), host.as_ptr());
            adapter.frame(slot.as_ptr(), host.as_ptr());
        }

        assert_eq!(host.shutdown_requests(), 0);
        assert_eq!(link.published().len(), 1);
    }

    #[test]
    fn test_independent_plugin_instances() {
        let mut config = PluginConfig::default();
        config.frame.work_delay_ms = 0;
        let link = MockLink::new("mock");
        let adapter = adapter_over(link.clone(), config);
        let first = FakePluginSlot::new();
        let second = FakePluginSlot::new();
        let host = FakeHost::new("ego_vehicle");

        adapter.construct(first.as_ptr());
        adapter.construct(second.as_ptr());
        assert_eq!(adapter.plugin_count(), 2);

        adapter.destruct(first.as_ptr());
        unsafe {
            adapter.frame(first.as_ptr(), host.as_ptr());
            adapter.frame(second.as_ptr(), host.as_ptr());
        }

        assert_eq!(link.published().len(), 1);
        assert!(adapter.is_registered(second.as_ptr()));
    }

    #[test]
    fn test_unreachable_broker_registers_nothing() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut config = PluginConfig::default();
        config.mqtt.host = "127.0.0.1".into();
        config.mqtt.port = port;
        config.mqtt.connect_timeout_secs = 2;
        config.runtime.worker_threads = Some(1);

        let adapter = Adapter::with_mqtt(config).unwrap();
        let slot = FakePluginSlot::new();
        adapter.construct(slot.as_ptr());

        assert_eq!(adapter.plugin_count(), 0);
    }
}

#[cfg(test)]
mod export_tests {
    use rusty_bind::exports::{
        plugin_constructor, plugin_destructor, plugin_on_exit, plugin_on_frame,
        plugin_on_initialize,
    };
    use rusty_bind::fake_host::{FakeHost, FakePluginSlot};

    #[test]
    fn test_unknown_handles_are_ignored() {
        let slot = FakePluginSlot::new();
        let host = FakeHost::new("ego_vehicle");

        plugin_on_initialize(slot.as_ptr());
        unsafe { plugin_on_frame(slot.as_ptr(), host.as_ptr()) };
        plugin_on_exit(slot.as_ptr());
        plugin_destructor(slot.as_ptr());

        assert_eq!(host.shutdown_requests(), 0);
    }

    #[test]
    fn test_null_handles_are_ignored() {
        plugin_constructor(std::ptr::null_mut());
        unsafe { plugin_on_frame(std::ptr::null_mut(), std::ptr::null_mut()) };
        plugin_destructor(std::ptr::null_mut());
    }
}

#[cfg(test)]
mod observability_tests {
    use observability::{FrameMetricsAggregator, FrameRateCounter};
    use std::time::{Duration, Instant};

    #[test]
    fn test_frame_rate_over_session() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::starting_at(Duration::from_secs(1), start);
        let mut stats = FrameMetricsAggregator::new();

        let mut reported = Vec::new();
        for i in 1..=40u64 {
            stats.update_frame(i);
            if let Some(fps) = counter.tick_at(start + Duration::from_millis(i * 50)) {
                stats.update_fps(fps);
                reported.push(fps);
            }
        }

        assert_eq!(reported.len(), 2);
        assert!((reported[0] - 20.0).abs() < 1e-9);
        let summary = stats.summary();
        assert_eq!(summary.total_frames, 40);
        assert_eq!(summary.fps.samples, 2);
    }
}
