//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Boundary Model
//! - The host owns every `IInterface` instance; the plugin only borrows it for one call
//! - `HostInterface` is the safe view of that borrowed handle
//! - Frame counter is the host's clock (`u64`, advancing)

mod command;
mod config;
mod error;
mod frame;
mod host;

pub use command::*;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use host::HostInterface;
