//! PluginRegistry - host plugin handles to live plugin instances

use std::collections::HashMap;

use tracing::warn;

use crate::ffi::IPlugin;
use crate::plugin::FramePlugin;

/// Key derived from the address of a host plugin slot
pub type PluginKey = usize;

/// Key for a host plugin pointer; `None` for null
pub fn plugin_key(plugin: *mut IPlugin) -> Option<PluginKey> {
    if plugin.is_null() {
        None
    } else {
        Some(plugin as usize)
    }
}

/// Registry of plugins by host slot
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<PluginKey, Box<dyn FramePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, replacing any plugin already bound to `key`
    pub fn insert(&mut self, key: PluginKey, plugin: Box<dyn FramePlugin>) {
        if self.plugins.insert(key, plugin).is_some() {
            warn!(key, "plugin slot constructed twice, previous instance dropped");
        }
    }

    /// Unregister and return the plugin bound to `key`
    pub fn remove(&mut self, key: PluginKey) -> Option<Box<dyn FramePlugin>> {
        self.plugins.remove(&key)
    }

    pub fn get_mut(&mut self, key: PluginKey) -> Option<&mut (dyn FramePlugin + 'static)> {
        self.plugins.get_mut(&key).map(|plugin| plugin.as_mut())
    }

    pub fn contains(&self, key: PluginKey) -> bool {
        self.plugins.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use contracts::{HostInterface, PluginError};

    struct Tagged(u32);

    impl FramePlugin for Tagged {
        fn on_frame(
            &mut self,
            _context: &Context,
            _interface: &dyn HostInterface,
        ) -> Result<(), PluginError> {
            Err(PluginError::Other(format!("tag {}", self.0)))
        }
    }

    #[test]
    fn test_plugin_key_null() {
        assert_eq!(plugin_key(std::ptr::null_mut()), None);
        assert_eq!(plugin_key(0x40 as *mut IPlugin), Some(0x40));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());

        registry.insert(1, Box::new(Tagged(1)));
        registry.insert(2, Box::new(Tagged(2)));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(1));

        assert!(registry.remove(1).is_some());
        assert!(registry.remove(1).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut registry = PluginRegistry::new();
        registry.insert(7, Box::new(Tagged(1)));
        registry.insert(7, Box::new(Tagged(2)));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_mut(7).is_some());
        assert!(registry.get_mut(8).is_none());
    }
}
