//! Test doubles shared by unit tests.

use crate::surface::{Surface, SurfaceError, SurfaceSize};
use kurbo::Point;

/// Surface that records draw calls instead of producing pixels.
#[derive(Debug)]
pub(crate) struct RecordingSurface {
    pub size: SurfaceSize,
    pub segments: Vec<(Point, Point, f64)>,
    pub background_fills: usize,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            size: SurfaceSize::new(400.0, 256.0),
            segments: Vec::new(),
            background_fills: 0,
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.fill_background();
    }

    fn fill_background(&mut self) {
        self.segments.clear();
        self.background_fills += 1;
    }

    fn stroke_segment(&mut self, from: Point, to: Point, width: f64) {
        self.segments.push((from, to, width));
    }

    fn to_data_url(&self) -> Result<String, SurfaceError> {
        Ok(format!("data:image/png;base64,{}", self.segments.len()))
    }
}
