//! FramePlugin trait - what the adapter drives on behalf of the host

use contracts::{HostInterface, PluginError};

use crate::context::Context;

/// Per-host-slot plugin logic
///
/// Errors returned here are logged by the adapter and never reach the host.
pub trait FramePlugin: Send {
    /// Host finished constructing its plugin slot
    fn on_initialize(&mut self, _context: &Context) -> Result<(), PluginError> {
        Ok(())
    }

    /// One host frame
    fn on_frame(
        &mut self,
        context: &Context,
        interface: &dyn HostInterface,
    ) -> Result<(), PluginError>;

    /// Host is about to tear its plugin slot down
    fn on_exit(&mut self, _context: &Context) -> Result<(), PluginError> {
        Ok(())
    }
}
