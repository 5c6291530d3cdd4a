//! PNG and data-URL encoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Prefix of every exported signature image.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Render and encoding errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface has no pixels ({0}x{1})")]
    EmptySurface(u32, u32),
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("PNG encoding failed: {0}")]
    Png(String),
    #[error("Not a PNG data URL")]
    NotDataUrl,
    #[error("Base64 decoding failed: {0}")]
    Base64(String),
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptySurface(width, height));
    }
    let expected = width as usize * height as usize * 4;
    if rgba_data.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: rgba_data.len(),
        });
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Png(format!("header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RenderError::Png(format!("data: {e}")))?;
        writer
            .finish()
            .map_err(|e| RenderError::Png(format!("finish: {e}")))?;
    }

    Ok(png_data)
}

/// Wrap PNG bytes in a `data:` URL.
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len().div_ceil(3) * 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}

/// Extract the PNG bytes from a data URL produced by [`png_data_url`].
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, RenderError> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or(RenderError::NotDataUrl)?;
    STANDARD
        .decode(payload)
        .map_err(|e| RenderError::Base64(e.to_string()))
}
