//! Turning near-white pixels transparent.

use std::io::Cursor;

use image::{ImageFormat, Rgba};

use crate::error::{FontpressError, FontpressResult};

/// The pixel that matted pixels are replaced with.
const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Make every pixel of a PNG image whose red, green and blue components are
/// all at least `threshold` fully transparent. Other pixels are kept as is.
pub fn apply_alpha_matte(png: &[u8], threshold: u8) -> FontpressResult<Vec<u8>> {
    let mut image = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| FontpressError::Rasterization(format!("failed to decode png: {e}")))?
        .into_rgba8();

    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;

        if r >= threshold && g >= threshold && b >= threshold {
            *pixel = TRANSPARENT;
        }
    }

    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|e| FontpressError::Rasterization(format!("failed to encode png: {e}")))?;

    Ok(encoded)
}
