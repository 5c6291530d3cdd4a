//! Recorded signing sessions.
//!
//! A recording is the stroke model of a pad plus the size it was drawn at.
//! Replaying it feeds every sample back through a fresh pad, so the ink,
//! the validity verdict and the exported image come out exactly as they
//! would have live.

use serde::{Deserialize, Serialize};
use signpad_core::{ConfigError, PadConfig, SignaturePad, Stroke, Surface, SurfaceSize};
use signpad_render::RasterSurface;
use std::path::Path;
use thiserror::Error;

/// Recording load and replay errors.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Recording has an empty surface ({0}x{1})")]
    EmptySurface(f64, f64),
    #[error("Recording surface is too large ({0}x{1} pixels, limit {max} per side)", max = MAX_SURFACE_SIDE)]
    SurfaceTooLarge(u32, u32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Largest backing-store side, in physical pixels, a replay will allocate.
pub const MAX_SURFACE_SIDE: u32 = 16384;

fn default_scale_factor() -> f64 {
    1.0
}

/// A captured signature session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Logical surface width.
    pub width: f64,
    /// Logical surface height.
    pub height: f64,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl Recording {
    pub fn new(size: SurfaceSize, strokes: Vec<Stroke>) -> Self {
        Self {
            width: size.width,
            height: size.height,
            scale_factor: size.scale_factor,
            strokes,
        }
    }

    /// Snapshot the sealed strokes of a live pad.
    pub fn from_pad<S: Surface>(pad: &SignaturePad<S>) -> Self {
        Self::new(pad.surface().size(), pad.strokes().to_vec())
    }

    pub fn from_json(json: &str) -> Result<Self, RecordingError> {
        serde_json::from_str(json).map_err(|e| RecordingError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RecordingError> {
        serde_json::to_string_pretty(self).map_err(|e| RecordingError::Parse(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RecordingError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let recording = Self::from_json(&json)?;
        log::debug!(
            "Loaded recording from {} ({} strokes)",
            path.display(),
            recording.strokes.len()
        );
        Ok(recording)
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height).with_scale_factor(self.scale_factor)
    }

    /// Replay every stroke through a new raster-backed pad.
    pub fn replay(&self, config: PadConfig) -> Result<SignaturePad<RasterSurface>, RecordingError> {
        let size = self.size();
        let (width, height) = size.physical();
        if width == 0 || height == 0 {
            return Err(RecordingError::EmptySurface(self.width, self.height));
        }
        if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
            return Err(RecordingError::SurfaceTooLarge(width, height));
        }

        let surface = RasterSurface::from_config(size, &config)?;
        let mut pad = SignaturePad::with_config(surface, config);

        for stroke in &self.strokes {
            let mut samples = stroke.points().iter().copied();
            let Some(first) = samples.next() else {
                continue;
            };
            pad.pointer_down(first);
            for sample in samples {
                pad.pointer_move(sample);
            }
            pad.pointer_up();
        }

        log::info!("Replayed {} strokes", pad.strokes().len());
        Ok(pad)
    }
}
