//! rusty_bind - frame plugin for a C++ simulation host
//!
//! The host loads this library, calls `rust_initialize` once, then drives each
//! plugin instance through `plugin_constructor`, `plugin_on_initialize`,
//! `plugin_on_frame` (once per simulation frame) and `plugin_on_exit` /
//! `plugin_destructor`. Host state is read back through the host's own
//! `interface_*` accessors.
//!
//! Configuration comes from the file named by `RUSTY_BIND_CONFIG`, see
//! `config_loader`.

pub mod adapter;
pub mod context;
pub mod exports;
pub mod ffi;
pub mod interface;
pub mod plugin;
pub mod registry;
pub mod telemetry_plugin;

#[cfg(any(test, feature = "fake-host"))]
pub mod fake_host;

pub use adapter::{Adapter, PluginFactory};
pub use context::Context;
pub use interface::Interface;
pub use plugin::FramePlugin;
pub use registry::PluginRegistry;
pub use telemetry_plugin::TelemetryPlugin;
