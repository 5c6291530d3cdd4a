//! Drawing surface abstraction.

use kurbo::Point;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Logical size of a drawing surface plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Width in logical (CSS) units.
    pub width: f64,
    /// Height in logical (CSS) units.
    pub height: f64,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Set the scale factor for HiDPI. Non-positive ratios fall back to 1.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        self
    }

    /// Backing-store dimensions in physical pixels.
    pub fn physical(&self) -> (u32, u32) {
        let w = (self.width.max(0.0) * self.scale_factor).round() as u32;
        let h = (self.height.max(0.0) * self.scale_factor).round() as u32;
        (w, h)
    }

    /// Logical size as CSS lengths. A canvas whose backing store is
    /// [`physical`](Self::physical) must keep this layout size, otherwise
    /// it is laid out at the physical size on HiDPI screens.
    pub fn css_size(&self) -> (String, String) {
        (
            format!("{}px", self.width.max(0.0)),
            format!("{}px", self.height.max(0.0)),
        )
    }
}

/// Trait for ink surfaces the pad draws on.
///
/// Coordinates and widths are in logical units; implementations apply the
/// device pixel ratio themselves. Implementations exist for a CPU raster
/// buffer and for an HTML canvas.
pub trait Surface {
    /// Current logical size.
    fn size(&self) -> SurfaceSize;

    /// Adopt a new size. Reallocating the backing store drops existing ink,
    /// so implementations must repaint the opaque background here.
    fn resize(&mut self, size: SurfaceSize);

    /// Paint the whole surface with the background color.
    fn fill_background(&mut self);

    /// Draw one straight, round-capped ink segment.
    fn stroke_segment(&mut self, from: Point, to: Point, width: f64);

    /// Encode the current pixels as a `data:image/png;base64,...` URL.
    fn to_data_url(&self) -> Result<String, SurfaceError>;
}
