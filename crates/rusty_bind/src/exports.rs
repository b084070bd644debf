//! C-linkage entry points called by the host
//!
//! All exports share one process-wide adapter. A panic inside any of them is
//! caught here and logged; it never unwinds into the host.

use std::panic::{catch_unwind, AssertUnwindSafe};

use config_loader::ConfigLoader;
use contracts::{PluginConfig, PluginError};
use once_cell::sync::OnceCell;
use tracing::{error, info};

use crate::adapter::Adapter;
use crate::ffi::{IInterface, IPlugin};

static ADAPTER: OnceCell<Adapter> = OnceCell::new();

/// Configuration for the global adapter
///
/// No subscriber is installed yet, so problems are reported on stderr.
fn startup_config(loaded: Result<PluginConfig, PluginError>) -> PluginConfig {
    loaded.unwrap_or_else(|e| {
        eprintln!("rusty_bind: invalid configuration, using defaults: {e}");
        PluginConfig::default()
    })
}

fn create_adapter() -> Result<Adapter, PluginError> {
    let config = startup_config(ConfigLoader::from_env());
    if let Err(e) = observability::init_with_config(&config.observability) {
        eprintln!("rusty_bind: observability not initialised: {e:#}");
    }
    Adapter::with_mqtt(config)
}

/// Global adapter, built on first use if the host skipped `rust_initialize`
fn adapter() -> Option<&'static Adapter> {
    ADAPTER
        .get_or_try_init(create_adapter)
        .map_err(|e| error!(error = %e, "failed to create plugin adapter"))
        .ok()
}

fn guard<F: FnOnce()>(entry: &'static str, f: F) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!(entry, panic = %message, "panic caught at the host boundary");
    }
}

/// Called once by the host before any plugin is constructed
#[no_mangle]
pub extern "C" fn rust_initialize() {
    guard("rust_initialize", || match ADAPTER.get_or_try_init(create_adapter) {
        Ok(adapter) => info!(
            broker = %format!("{}:{}", adapter.config().mqtt.host, adapter.config().mqtt.port),
            "rusty_bind initialised"
        ),
        Err(e) => error!(error = %e, "failed to create plugin adapter"),
    });
}

#[no_mangle]
pub extern "C" fn plugin_constructor(plugin: *mut IPlugin) {
    guard("plugin_constructor", || {
        if let Some(adapter) = adapter() {
            adapter.construct(plugin);
        }
    });
}

#[no_mangle]
pub extern "C" fn plugin_destructor(plugin: *mut IPlugin) {
    guard("plugin_destructor", || {
        if let Some(adapter) = adapter() {
            adapter.destruct(plugin);
        }
    });
}

#[no_mangle]
pub extern "C" fn plugin_on_initialize(plugin: *mut IPlugin) {
    guard("plugin_on_initialize", || {
        if let Some(adapter) = adapter() {
            adapter.initialize(plugin);
        }
    });
}

/// # Safety
/// `interface` must be null or a host interface valid for the whole call.
#[no_mangle]
pub unsafe extern "C" fn plugin_on_frame(plugin: *mut IPlugin, interface: *mut IInterface) {
    guard("plugin_on_frame", || {
        if let Some(adapter) = adapter() {
            adapter.frame(plugin, interface);
        }
    });
}

#[no_mangle]
pub extern "C" fn plugin_on_exit(plugin: *mut IPlugin) {
    guard("plugin_on_exit", || {
        if let Some(adapter) = adapter() {
            adapter.exit(plugin);
        }
    });
}
