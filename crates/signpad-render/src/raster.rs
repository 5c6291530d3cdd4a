//! CPU raster surface.

use crate::encode::{encode_png, png_data_url};
use kurbo::Point;
use peniko::Color;
use signpad_core::{ConfigError, PadConfig, Surface, SurfaceError, SurfaceSize};

/// An opaque RGBA8 pixel buffer the pad can draw ink onto.
///
/// Logical coordinates are scaled by the device pixel ratio, so a 400x256
/// pad at 2x is backed by 800x512 pixels. Segments are drawn as
/// anti-aliased capsules (round caps and joins).
#[derive(Debug, Clone)]
pub struct RasterSurface {
    size: SurfaceSize,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    ink: [u8; 4],
    background: [u8; 4],
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

impl RasterSurface {
    /// Black ink on white.
    pub fn new(size: SurfaceSize) -> Self {
        Self::with_colors(
            size,
            Color::from_rgba8(0, 0, 0, 255),
            Color::from_rgba8(255, 255, 255, 255),
        )
    }

    /// Custom colors. The background is forced opaque.
    pub fn with_colors(size: SurfaceSize, ink: Color, background: Color) -> Self {
        let mut background = rgba(background);
        background[3] = 255;

        let mut surface = Self {
            size,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            ink: rgba(ink),
            background,
        };
        surface.allocate(size);
        surface
    }

    /// Colors taken from a pad configuration.
    pub fn from_config(size: SurfaceSize, config: &PadConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_colors(
            size,
            config.ink_color()?,
            config.background_color()?,
        ))
    }

    /// Backing-store dimensions in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes, row-major.
    pub fn rgba_data(&self) -> &[u8] {
        &self.pixels
    }

    /// Get a pixel at physical coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Number of pixels that differ from the background.
    pub fn inked_pixels(&self) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| *px != self.background)
            .count()
    }

    /// Encode the pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, crate::RenderError> {
        encode_png(&self.pixels, self.width, self.height)
    }

    fn allocate(&mut self, size: SurfaceSize) {
        let (mut width, mut height) = size.physical();
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        let len = match len {
            Some(len) => len,
            None => {
                log::warn!("Surface of {}x{} pixels is too large, leaving it empty", width, height);
                width = 0;
                height = 0;
                0
            }
        };
        self.size = size;
        self.width = width;
        self.height = height;
        self.pixels = vec![0; len];
        self.fill_background();
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of the ink color with the given coverage.
    fn blend(&mut self, x: u32, y: u32, coverage: f64) {
        let alpha = coverage * self.ink[3] as f64 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        for c in 0..3 {
            let dst = self.pixels[i + c] as f64;
            let src = self.ink[c] as f64;
            self.pixels[i + c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        self.pixels[i + 3] = 255;
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        log::debug!(
            "Reallocating raster surface for {}x{} @{}x",
            size.width,
            size.height,
            size.scale_factor
        );
        self.allocate(size);
    }

    fn fill_background(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&self.background);
        }
    }

    fn stroke_segment(&mut self, from: Point, to: Point, width: f64) {
        if self.width == 0 || self.height == 0 || width.is_nan() || width <= 0.0 {
            return;
        }
        let scale = self.size.scale_factor;
        let a = Point::new(from.x * scale, from.y * scale);
        let b = Point::new(to.x * scale, to.y * scale);
        let radius = width * scale / 2.0;

        // Pixels whose centers lie within radius + 0.5 get partial coverage.
        let reach = radius + 1.0;
        let x0 = (a.x.min(b.x) - reach).floor().max(0.0);
        let y0 = (a.y.min(b.y) - reach).floor().max(0.0);
        let x1 = (a.x.max(b.x) + reach).ceil().min(self.width as f64 - 1.0);
        let y1 = (a.y.max(b.y) + reach).ceil().min(self.height as f64 - 1.0);
        if x1 < x0 || y1 < y0 {
            return;
        }

        for y in y0 as u32..=y1 as u32 {
            for x in x0 as u32..=x1 as u32 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let d = distance_to_segment(center, a, b);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, coverage);
                }
            }
        }
    }

    fn to_data_url(&self) -> Result<String, SurfaceError> {
        let png = self
            .encode_png()
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(png_data_url(&png))
    }
}
