//! Photostore Processing Library
//!
//! Pure image transforms used by the workers: the bounded thumbnail and the
//! moderation blur. Transforms operate on in-memory byte slices and re-encode
//! to the original's format so blob content types never change.

use std::io::Cursor;

use anyhow::{Context, Result};
use bytes::Bytes;
use image::imageops::FilterType;
use image::ImageFormat;

/// Longest side of a generated thumbnail, in pixels.
pub const THUMBNAIL_MAX_DIM: u32 = 128;

/// Gaussian blur sigma applied to flagged images.
pub const MODERATION_BLUR_SIGMA: f32 = 16.0;

/// Image format for a content type; the pipeline only ever stores the three
/// formats of its extension whitelist, anything else decodes as JPEG.
pub fn format_for_content_type(content_type: &str) -> ImageFormat {
    match content_type {
        "image/png" => ImageFormat::Png,
        "image/gif" => ImageFormat::Gif,
        _ => ImageFormat::Jpeg,
    }
}

fn decode(data: &[u8]) -> Result<image::DynamicImage> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("failed to probe image format")?
        .decode()
        .context("failed to decode image")
}

fn encode(img: &image::DynamicImage, format: ImageFormat) -> Result<Bytes> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .context("failed to encode image")?;
    Ok(Bytes::from(buffer))
}

/// Scale an image down to fit within `max_dim` on its longest side,
/// preserving aspect ratio, using Lanczos3 resampling. Images already within
/// bounds are still re-encoded, matching the classic thumbnail contract.
pub fn thumbnail(data: &[u8], max_dim: u32, format: ImageFormat) -> Result<Bytes> {
    let img = decode(data)?;
    let resized = img.resize(max_dim, max_dim, FilterType::Lanczos3);
    encode(&resized, format)
}

/// Gaussian-blur an image in place; dimensions and format are unchanged.
pub fn blur(data: &[u8], sigma: f32, format: ImageFormat) -> Result<Bytes> {
    let img = decode(data)?;
    encode(&img.blur(sigma), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    /// Encode a horizontal gradient so blur visibly changes pixel values.
    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let v = ((x * 255) / width.max(1)) as u8;
            image::Rgb([v, 255 - v, 128])
        });
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("encode");
        buffer
    }

    #[test]
    fn thumbnail_bounds_landscape_image() {
        let data = gradient_png(640, 480);
        let thumb = thumbnail(&data, THUMBNAIL_MAX_DIM, ImageFormat::Png).expect("thumbnail");
        let img = image::load_from_memory(&thumb).expect("decode");
        assert_eq!(img.dimensions(), (128, 96));
    }

    #[test]
    fn thumbnail_bounds_portrait_image() {
        let data = gradient_png(100, 400);
        let thumb = thumbnail(&data, THUMBNAIL_MAX_DIM, ImageFormat::Png).expect("thumbnail");
        let img = image::load_from_memory(&thumb).expect("decode");
        assert_eq!(img.dimensions(), (32, 128));
    }

    #[test]
    fn thumbnail_longest_side_never_exceeds_bound() {
        for (w, h) in [(1000, 30), (30, 1000), (128, 128), (50, 50)] {
            let data = gradient_png(w, h);
            let thumb = thumbnail(&data, THUMBNAIL_MAX_DIM, ImageFormat::Png).expect("thumbnail");
            let (tw, th) = image::load_from_memory(&thumb).expect("decode").dimensions();
            assert!(tw.max(th) <= THUMBNAIL_MAX_DIM, "{w}x{h} -> {tw}x{th}");
            // Aspect preserved within rounding.
            let original = w as f64 / h as f64;
            let scaled = tw as f64 / th as f64;
            assert!((original - scaled).abs() / original < 0.1, "{w}x{h} -> {tw}x{th}");
        }
    }

    #[test]
    fn blur_preserves_dimensions_and_changes_pixels() {
        let data = gradient_png(64, 64);
        let blurred = blur(&data, MODERATION_BLUR_SIGMA, ImageFormat::Png).expect("blur");
        let original = image::load_from_memory(&data).expect("decode");
        let result = image::load_from_memory(&blurred).expect("decode");
        assert_eq!(original.dimensions(), result.dimensions());
        assert_ne!(original.to_rgb8().as_raw(), result.to_rgb8().as_raw());
    }

    #[test]
    fn undecodable_input_is_an_error() {
        assert!(thumbnail(b"not an image", THUMBNAIL_MAX_DIM, ImageFormat::Png).is_err());
        assert!(blur(b"not an image", MODERATION_BLUR_SIGMA, ImageFormat::Png).is_err());
    }

    #[test]
    fn format_table() {
        assert_eq!(format_for_content_type("image/png"), ImageFormat::Png);
        assert_eq!(format_for_content_type("image/gif"), ImageFormat::Gif);
        assert_eq!(format_for_content_type("image/jpeg"), ImageFormat::Jpeg);
    }
}
