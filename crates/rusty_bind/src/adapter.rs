//! Adapter - routes host callbacks to the plugin registered for a handle
//!
//! Every host callback goes through here. Nothing in the adapter returns an
//! error to the host; failures are logged and the callback becomes a no-op.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{PluginConfig, PluginError};
use tracing::{debug, error, info, instrument, warn};

use crate::context::Context;
use crate::ffi::{IInterface, IPlugin};
use crate::interface::Interface;
use crate::plugin::FramePlugin;
use crate::registry::{plugin_key, PluginRegistry};
use crate::telemetry_plugin::TelemetryPlugin;

/// Builds the plugin instance for a newly constructed host handle
pub type PluginFactory =
    Box<dyn Fn(&Context, &PluginConfig) -> Result<Box<dyn FramePlugin>, PluginError> + Send + Sync>;

pub struct Adapter {
    config: PluginConfig,
    context: Context,
    registry: Mutex<PluginRegistry>,
    factory: PluginFactory,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("context", &self.context)
            .field("plugins", &self.plugin_count())
            .finish()
    }
}

impl Adapter {
    pub fn new(config: PluginConfig, factory: PluginFactory) -> Result<Self, PluginError> {
        let context = Context::new(&config.runtime)?;
        Ok(Self {
            config,
            context,
            registry: Mutex::new(PluginRegistry::new()),
            factory,
        })
    }

    /// Adapter whose plugins publish over MQTT
    pub fn with_mqtt(config: PluginConfig) -> Result<Self, PluginError> {
        Self::new(
            config,
            Box::new(|context, config| {
                let plugin = TelemetryPlugin::connect(context, config)?;
                Ok(Box::new(plugin) as Box<dyn FramePlugin>)
            }),
        )
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn plugin_count(&self) -> usize {
        self.registry().len()
    }

    pub fn is_registered(&self, plugin: *mut IPlugin) -> bool {
        plugin_key(plugin).is_some_and(|key| self.registry().contains(key))
    }

    fn registry(&self) -> MutexGuard<'_, PluginRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(name = "plugin_constructor", skip(self))]
    pub fn construct(&self, plugin: *mut IPlugin) {
        let Some(key) = plugin_key(plugin) else {
            warn!("constructor called with a null plugin handle");
            return;
        };

        // The factory may block on the network; keep the registry unlocked.
        match (self.factory)(&self.context, &self.config) {
            Ok(instance) => {
                self.registry().insert(key, instance);
                info!(key, "plugin constructed");
            }
            Err(e) => error!(key, error = %e, "failed to construct plugin"),
        }
    }

    #[instrument(name = "plugin_destructor", skip(self))]
    pub fn destruct(&self, plugin: *mut IPlugin) {
        let Some(key) = plugin_key(plugin) else {
            warn!("destructor called with a null plugin handle");
            return;
        };

        match self.registry().remove(key) {
            Some(_) => info!(key, "plugin destroyed"),
            None => debug!(key, "destructor called for unknown plugin"),
        }
    }

    #[instrument(name = "plugin_on_initialize", skip(self))]
    pub fn initialize(&self, plugin: *mut IPlugin) {
        self.with_plugin(plugin, "on_initialize", |instance, context| {
            instance.on_initialize(context)
        });
    }

    #[instrument(name = "plugin_on_exit", skip(self))]
    pub fn exit(&self, plugin: *mut IPlugin) {
        self.with_plugin(plugin, "on_exit", |instance, context| instance.on_exit(context));
    }

    /// Run one host frame
    ///
    /// # Safety
    /// `interface` must be null or point to a host interface that stays valid
    /// for the duration of the call.
    pub unsafe fn frame(&self, plugin: *mut IPlugin, interface: *mut IInterface) {
        let Some(interface) = Interface::from_raw(interface) else {
            warn!("on_frame called with a null interface");
            return;
        };

        self.with_plugin(plugin, "on_frame", |instance, context| {
            instance.on_frame(context, &interface)
        });
    }

    fn with_plugin<F>(&self, plugin: *mut IPlugin, callback: &'static str, f: F)
    where
        F: FnOnce(&mut dyn FramePlugin, &Context) -> Result<(), PluginError>,
    {
        let Some(key) = plugin_key(plugin) else {
            warn!(callback, "called with a null plugin handle");
            return;
        };

        let mut registry = self.registry();
        let Some(instance) = registry.get_mut(key) else {
            debug!(key, callback, "no plugin registered for handle");
            return;
        };

        if let Err(e) = f(instance, &self.context) {
            error!(key, callback, error = %e, "plugin callback failed");
        }
    }
}
