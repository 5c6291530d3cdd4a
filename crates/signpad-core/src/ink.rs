//! Velocity-weighted, curve-smoothed ink rendering.
//!
//! Each new sample of the active stroke is turned into an [`InkSegment`]:
//! a straight segment while the stroke has fewer than four samples, then a
//! Catmull-Rom style cubic through the middle pair of the last four samples.
//! Width follows pen speed: slow strokes are thick, fast strokes thin.

use crate::stroke::SamplePoint;
use crate::surface::Surface;
use kurbo::{CubicBez, ParamCurve, Point};
use serde::{Deserialize, Serialize};

/// Ink parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkStyle {
    /// Width at or above the saturation velocity.
    pub min_width: f64,
    /// Width when the pen is still.
    pub max_width: f64,
    /// Velocity (units per ms) at which width bottoms out.
    pub velocity_cap: f64,
    /// Weight of the newest velocity in exponential smoothing.
    pub smoothing: f64,
    /// Divisor applied to neighbor deltas when deriving control points.
    pub control_divisor: f64,
    /// Straight micro-segments per rendered curve.
    pub curve_steps: u32,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            min_width: 0.5,
            max_width: 3.5,
            velocity_cap: 5.0,
            smoothing: 0.7,
            control_divisor: 6.0,
            curve_steps: 16,
        }
    }
}

impl InkStyle {
    /// Map a velocity to a stroke width. Non-increasing in velocity and
    /// always within `[min_width, max_width]`.
    pub fn width_for(&self, velocity: f64) -> f64 {
        let t = if self.velocity_cap > 0.0 {
            (velocity.max(0.0) / self.velocity_cap).min(1.0)
        } else {
            1.0
        };
        let width = self.max_width - (self.max_width - self.min_width) * t;
        width.clamp(self.min_width.min(self.max_width), self.max_width.max(self.min_width))
    }

    /// Exponentially smooth a new velocity against the previous one.
    pub fn smooth(&self, velocity: f64, previous: f64) -> f64 {
        self.smoothing * velocity + (1.0 - self.smoothing) * previous
    }
}

/// Speed between two samples in units per millisecond.
///
/// Elapsed time is floored at one millisecond so samples sharing a
/// timestamp do not divide by zero.
pub fn velocity(from: &SamplePoint, to: &SamplePoint) -> f64 {
    let elapsed = to.time.saturating_sub(from.time).max(1);
    from.distance(to) / elapsed as f64
}

/// Cubic from `p1` to `p2` with control points taken from the neighbors.
pub fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, divisor: f64) -> CubicBez {
    let c1 = p1 + (p2 - p0) / divisor;
    let c2 = p2 - (p3 - p1) / divisor;
    CubicBez::new(p1, c1, c2, p2)
}

/// A piece of ink ready to be rasterized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InkSegment {
    Line {
        from: Point,
        to: Point,
        width: f64,
    },
    Curve {
        curve: CubicBez,
        start_width: f64,
        end_width: f64,
    },
}

/// Plan the ink for the newest sample of `history`.
///
/// Returns the segment and the smoothed velocity to carry into the next
/// sample, or `None` when there is no previous sample to connect to.
pub fn plan_segment(
    style: &InkStyle,
    history: &[SamplePoint],
    previous_velocity: f64,
) -> Option<(InkSegment, f64)> {
    let [.., last, current] = history else {
        return None;
    };

    let smoothed = style.smooth(velocity(last, current), previous_velocity);
    let end_width = style.width_for(smoothed);

    let segment = match history {
        [.., p0, p1, p2, p3] => InkSegment::Curve {
            curve: catmull_rom(
                p0.position(),
                p1.position(),
                p2.position(),
                p3.position(),
                style.control_divisor,
            ),
            start_width: style.width_for(previous_velocity),
            end_width,
        },
        _ => InkSegment::Line {
            from: last.position(),
            to: current.position(),
            width: end_width,
        },
    };

    Some((segment, smoothed))
}

/// Rasterize a planned segment onto a surface.
///
/// Curves become `steps` straight pieces; each piece takes the width
/// interpolated at its starting parameter.
pub fn draw_segment<S: Surface + ?Sized>(surface: &mut S, segment: &InkSegment, steps: u32) {
    match *segment {
        InkSegment::Line { from, to, width } => surface.stroke_segment(from, to, width),
        InkSegment::Curve {
            curve,
            start_width,
            end_width,
        } => {
            let steps = steps.max(1);
            for i in 0..steps {
                let t = i as f64 / steps as f64;
                let t_next = (i + 1) as f64 / steps as f64;
                let width = start_width + (end_width - start_width) * t;
                surface.stroke_segment(curve.eval(t), curve.eval(t_next), width);
            }
        }
    }
}

/// Render the newest sample of `history` and return the updated velocity.
///
/// Returns `None` (nothing drawn) when the stroke has a single sample.
pub fn render_sample<S: Surface + ?Sized>(
    surface: &mut S,
    style: &InkStyle,
    history: &[SamplePoint],
    previous_velocity: f64,
) -> Option<f64> {
    let (segment, velocity) = plan_segment(style, history, previous_velocity)?;
    draw_segment(surface, &segment, style.curve_steps);
    Some(velocity)
}
