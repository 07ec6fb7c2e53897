//! Image encoding: scan file → RGB → PNG → base64.
//!
//! Scanners emit a zoo of formats and colour modes (palette GIFs, RGBA PNGs,
//! 16-bit TIFFs, CMYK-free JPEGs). Normalising everything to 8-bit RGB PNG
//! gives the classifier one canonical, lossless input regardless of source.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// MIME type of every encoded image.
pub const ENCODED_MIME_TYPE: &str = "image/png";

/// A page image ready to embed in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    /// Standard base64 of the PNG bytes.
    pub data: String,
}

/// Decode `path`, drop alpha/palette information and re-encode as PNG.
///
/// The source file is only read.
pub fn encode_image(path: &Path) -> Result<EncodedImage, image::ImageError> {
    let img = image::open(path)?;
    let encoded = encode_dynamic(&img)?;
    debug!(
        "Encoded {} → {} bytes base64",
        path.display(),
        encoded.data.len()
    );
    Ok(encoded)
}

/// Encode an already decoded image.
pub fn encode_dynamic(img: &DynamicImage) -> Result<EncodedImage, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;

    Ok(EncodedImage {
        mime_type: ENCODED_MIME_TYPE,
        data: STANDARD.encode(&buf),
    })
}
