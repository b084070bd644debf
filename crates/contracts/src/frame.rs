//! Frame data observed through the host interface.

use serde::{Deserialize, Serialize};

/// Position in host world coordinates
///
/// Serialized as a `[x, y, z]` array on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<(f64, f64, f64)> for Position {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for (f64, f64, f64) {
    fn from(p: Position) -> Self {
        (p.x, p.y, p.z)
    }
}

/// One frame as published to the telemetry link
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Host frame counter
    pub frame: u64,

    /// Position at that frame
    pub position: Position,
}
