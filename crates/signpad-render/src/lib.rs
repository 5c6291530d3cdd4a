//! Signpad Render Library
//!
//! CPU raster implementation of the signature [`Surface`](signpad_core::Surface)
//! and PNG / data-URL encoding of its pixels.

mod encode;
mod raster;

pub use encode::{PNG_DATA_URL_PREFIX, RenderError, decode_data_url, encode_png, png_data_url};
pub use raster::RasterSurface;
