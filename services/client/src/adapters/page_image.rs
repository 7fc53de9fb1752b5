//! services/client/src/adapters/page_image.rs
//!
//! Prepares a captured page photo for upload: downscale so the long edge fits
//! `MAX_DIMENSION`, compress to JPEG at `JPEG_QUALITY`, then Base64-encode
//! without line wrapping.

use crate::error::ClientError;
use base64::{engine::general_purpose, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageError};
use std::path::Path;
use storybook_core::EncodedImage;
use tracing::debug;

pub const MAX_DIMENSION: u32 = 1920;
pub const JPEG_QUALITY: u8 = 80;

/// Computes the target size for an image so its long edge is at most `max`.
/// Images already within bounds keep their size.
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let long_edge = width.max(height);
    if long_edge <= max {
        return (width, height);
    }
    let scale = max as f64 / long_edge as f64;
    let scale_edge = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max);
    if width >= height {
        (max, scale_edge(height))
    } else {
        (scale_edge(width), max)
    }
}

/// Encodes an in-memory image.
pub fn encode_image(image: &DynamicImage) -> Result<EncodedImage, ImageError> {
    let (width, height) = scaled_dimensions(image.width(), image.height(), MAX_DIMENSION);

    let resized;
    let source = if (width, height) == (image.width(), image.height()) {
        image
    } else {
        resized = image.resize_exact(width, height, FilterType::Triangle);
        &resized
    };

    // JPEG has no alpha channel.
    let rgb = source.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    debug!(
        original_width = image.width(),
        original_height = image.height(),
        width,
        height,
        jpeg_bytes = jpeg.len(),
        "Encoded page image"
    );

    Ok(EncodedImage {
        base64: general_purpose::STANDARD.encode(&jpeg),
        width,
        height,
    })
}

/// Decodes raw photo bytes (any format the `image` crate understands) and encodes them.
pub fn encode_page_image(bytes: &[u8]) -> Result<EncodedImage, ClientError> {
    let image = image::load_from_memory(bytes)?;
    Ok(encode_image(&image)?)
}

/// Reads a photo from disk and encodes it off the async executor.
pub async fn encode_page_file(path: &Path) -> Result<EncodedImage, ClientError> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || encode_page_image(&bytes))
        .await
        .map_err(|e| ClientError::Internal(format!("image encoding task failed: {}", e)))?
}
