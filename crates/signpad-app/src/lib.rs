//! Signpad Application
//!
//! Host shells for the signature pad: recorded-session replay, the native
//! command line and the browser canvas binding.

pub mod recording;

#[cfg(feature = "native")]
pub mod cli;

pub use recording::{Recording, RecordingError};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebSignaturePad;
