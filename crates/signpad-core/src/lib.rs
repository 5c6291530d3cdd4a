//! Signpad Core Library
//!
//! Platform-agnostic stroke model, ink rendering and signature validation
//! for the requisition signature pad.

pub mod config;
pub mod ink;
pub mod input;
pub mod pad;
pub mod stroke;
pub mod submission;
pub mod surface;
pub mod validate;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, PadConfig, parse_color};
pub use ink::{InkSegment, InkStyle};
pub use input::{PointerEvent, PointerPhase, RawInput, normalize};
pub use pad::{CaptureState, ExportError, SignaturePad};
pub use stroke::{SamplePoint, Stroke};
pub use submission::{Purpose, RequisitionItem, RequisitionSubmission, SubmissionError};
pub use surface::{Surface, SurfaceError, SurfaceSize};
pub use validate::{Rejection, ValidationRules, Verdict, validate, validate_with};
