//! Pointer input normalization for mouse and touch events.

use crate::stroke::SamplePoint;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Pressure assumed when the platform does not report one.
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// A platform input event before normalization.
///
/// Mouse and touch are two sources of the same sample; both go through
/// [`normalize`] so the capture logic never branches on modality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawInput {
    Mouse {
        client: Point,
    },
    /// First active touch, if any. `force` is reported by some devices only.
    Touch {
        client: Option<Point>,
        force: Option<f32>,
    },
}

/// Lifecycle phase of an input event on the capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(SamplePoint),
    Move(SamplePoint),
    Up,
    Leave,
}

impl PointerEvent {
    /// Build an event from a raw platform input.
    ///
    /// `origin` is the surface's top-left corner in client coordinates.
    pub fn from_raw(phase: PointerPhase, input: &RawInput, origin: Point, time: u64) -> Self {
        match phase {
            PointerPhase::Down => PointerEvent::Down(normalize(input, origin, time)),
            PointerPhase::Move => PointerEvent::Move(normalize(input, origin, time)),
            PointerPhase::Up => PointerEvent::Up,
            PointerPhase::Leave => PointerEvent::Leave,
        }
    }
}

/// Map a raw mouse or touch input to a surface-relative sample.
pub fn normalize(input: &RawInput, origin: Point, time: u64) -> SamplePoint {
    let (client, pressure) = match *input {
        RawInput::Mouse { client } => (client, DEFAULT_PRESSURE),
        RawInput::Touch { client, force } => (
            client.unwrap_or(Point::ZERO),
            force.unwrap_or(DEFAULT_PRESSURE),
        ),
    };

    SamplePoint::new(client.x - origin.x, client.y - origin.y, time).with_pressure(pressure)
}

/// Milliseconds since the Unix epoch, for stamping live samples.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
