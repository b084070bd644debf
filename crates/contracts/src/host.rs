//! HostInterface trait - safe view of the host's opaque interface handle.

use crate::Position;

/// Accessors the host exposes for one of its instances
///
/// The real implementation calls across the C boundary; test doubles keep
/// plain fields. Implementations borrow the host instance and never own it.
pub trait HostInterface {
    /// Display / identifier name
    fn name(&self) -> String;

    /// Current frame counter
    fn frame(&self) -> u64;

    /// Current position
    fn position(&self) -> Position;

    /// Ask the host to tear the instance down
    ///
    /// The host keeps the destruction right; this is only a request.
    fn shutdown(&self);
}
