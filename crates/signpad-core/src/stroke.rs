//! Sampled points and sealed strokes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single input sample, recorded once per pointer or touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    /// Timestamp in milliseconds.
    pub time: u64,
    /// Normalized pen pressure (0..1), when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
}

impl SamplePoint {
    /// Create a sample without pressure information.
    pub fn new(x: f64, y: f64, time: u64) -> Self {
        Self {
            x,
            y,
            time,
            pressure: None,
        }
    }

    /// Attach a pressure reading, clamped into 0..1.
    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure.clamp(0.0, 1.0));
        self
    }

    /// Position as a kurbo point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Euclidean distance to another sample.
    pub fn distance(&self, other: &SamplePoint) -> f64 {
        self.position().distance(other.position())
    }
}

/// An ordered run of samples between pointer down and pointer up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStroke")]
pub struct Stroke {
    points: Vec<SamplePoint>,
}

#[derive(Deserialize)]
struct RawStroke {
    points: Vec<SamplePoint>,
}

impl From<RawStroke> for Stroke {
    fn from(raw: RawStroke) -> Self {
        Self::from_points(raw.points)
    }
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from existing samples, enforcing non-decreasing timestamps.
    pub fn from_points(points: Vec<SamplePoint>) -> Self {
        let mut stroke = Self {
            points: Vec::with_capacity(points.len()),
        };
        for point in points {
            stroke.push(point);
        }
        stroke
    }

    /// Append a sample. A timestamp earlier than the previous sample's is
    /// clamped up to it so time never runs backwards within a stroke.
    pub fn push(&mut self, mut point: SamplePoint) {
        if let Some(last) = self.points.last() {
            point.time = point.time.max(last.time);
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SamplePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SamplePoint> {
        self.points.last()
    }

    /// Axis-aligned bounds of the samples, `None` for an empty stroke.
    pub fn bounds(&self) -> Option<Rect> {
        bounds_of(self.points.iter())
    }

    pub(crate) fn take(&mut self) -> Stroke {
        std::mem::take(self)
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }
}

/// Bounding box over an arbitrary set of samples.
pub fn bounds_of<'a>(points: impl IntoIterator<Item = &'a SamplePoint>) -> Option<Rect> {
    let mut points = points.into_iter();
    let first = points.next()?;

    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(Rect::new(min_x, min_y, max_x, max_y))
}

/// Bounding box over every sample of every stroke.
pub fn strokes_bounds(strokes: &[Stroke]) -> Option<Rect> {
    bounds_of(strokes.iter().flat_map(|s| s.points.iter()))
}

/// Total sample count across strokes.
pub fn total_points(strokes: &[Stroke]) -> usize {
    strokes.iter().map(Stroke::len).sum()
}
