//! Image transforms.
//!
//! [`ImageTransformer`] is the seam; [`RasterTransformer`] implements it with
//! the `image` crate. Output keeps the input's encoding format.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

use crate::error::TransformError;

/// A transform the pipeline can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Clockwise rotation in degrees.
    Rotate(i32),
    Greyscale,
}

/// Synchronous, CPU-bound image operations.
pub trait ImageTransformer: Send + Sync {
    /// Rotates clockwise by `degrees`.
    fn rotate(&self, bytes: &[u8], degrees: i32) -> Result<Vec<u8>, TransformError>;

    fn greyscale(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError>;

    fn apply(&self, bytes: &[u8], transform: Transform) -> Result<Vec<u8>, TransformError> {
        match transform {
            Transform::Rotate(degrees) => self.rotate(bytes, degrees),
            Transform::Greyscale => self.greyscale(bytes),
        }
    }
}

/// Normalises a clockwise angle into `0..360`.
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Size of the box that holds a `width` x `height` image rotated by `degrees`.
fn rotated_bounds(width: u32, height: u32, degrees: i32) -> (u32, u32) {
    let theta = f64::from(degrees).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (f64::from(width), f64::from(height));
    // Trim float noise so exact fits do not gain a pixel.
    let fit = |v: f64| ((v - 1e-6).ceil().max(1.0)) as u32;
    (fit(w * cos + h * sin), fit(w * sin + h * cos))
}

/// Rotates about the centre onto a canvas grown to the rotated bounds.
/// Uncovered corners are transparent.
fn rotate_free(img: &DynamicImage, degrees: i32) -> DynamicImage {
    let source = img.to_rgba8();
    let (width, height) = rotated_bounds(source.width(), source.height(), degrees);

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let x = (i64::from(width) - i64::from(source.width())) / 2;
    let y = (i64::from(height) - i64::from(source.height())) / 2;
    imageops::overlay(&mut canvas, &source, x, y);

    let theta = (degrees as f32).to_radians();
    DynamicImage::ImageRgba8(rotate_about_center(
        &canvas,
        theta,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    ))
}

/// [`ImageTransformer`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterTransformer;

impl RasterTransformer {
    pub fn new() -> Self {
        Self
    }

    fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), TransformError> {
        let format = image::guess_format(bytes).map_err(|e| TransformError::Decode(e.to_string()))?;
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        Ok((img, format))
    }

    fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TransformError> {
        // JPEG has no alpha channel.
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format)
            .map_err(|e| TransformError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

impl ImageTransformer for RasterTransformer {
    fn rotate(&self, bytes: &[u8], degrees: i32) -> Result<Vec<u8>, TransformError> {
        let (img, format) = Self::decode(bytes)?;
        let rotated = match normalize_degrees(degrees) {
            0 => img,
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            other => rotate_free(&img, other),
        };
        Self::encode(rotated, format)
    }

    fn greyscale(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        let (img, format) = Self::decode(bytes)?;
        Self::encode(img.grayscale(), format)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    /// A 2x1 PNG: red on the left, blue on the right.
    pub(crate) fn sample_png() -> Vec<u8> {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(90), 90);
        assert_eq!(normalize_degrees(-90), 270);
        assert_eq!(normalize_degrees(450), 90);
        assert_eq!(normalize_degrees(-45), 315);
        assert_eq!(normalize_degrees(0), 0);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(2, 1, 90), (1, 2));
        assert_eq!(rotated_bounds(2, 1, 45), (3, 3));
        assert_eq!(rotated_bounds(10, 4, 180), (10, 4));
    }

    #[test]
    fn test_rotate_clockwise_swaps_dimensions() {
        let out = RasterTransformer.rotate(&sample_png(), 90).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);

        let img = decode(&out);
        assert_eq!(img.dimensions(), (1, 2));
        // Clockwise: the left pixel ends up on top.
        assert_eq!(img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 1), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        let img = decode(&RasterTransformer.rotate(&sample_png(), -90).unwrap());
        assert_eq!(img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_rotate_any_angle_grows_canvas() {
        let out = RasterTransformer.rotate(&sample_png(), 45).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);

        assert_eq!(decode(&out).dimensions(), (3, 3));
    }

    #[test]
    fn test_rotate_any_angle_fills_corners() {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 10, Rgba([0, 255, 0, 255])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();

        let img = decode(&RasterTransformer.rotate(&out.into_inner(), 45).unwrap());
        let (w, h) = img.dimensions();
        assert_eq!((w, h), (22, 22));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(w / 2, h / 2), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_rotate_any_angle_keeps_jpeg() {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 2, image::Rgb([200, 10, 10])))
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();

        let rotated = RasterTransformer.rotate(&out.into_inner(), -30).unwrap();
        assert_eq!(image::guess_format(&rotated).unwrap(), ImageFormat::Jpeg);
        let (w, h) = decode(&rotated).dimensions();
        assert!(w >= 4 && h > 2);
    }

    #[test]
    fn test_greyscale_equalises_channels() {
        let img = decode(&RasterTransformer.greyscale(&sample_png()).unwrap()).to_rgba8();
        for pixel in img.pixels() {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let err = RasterTransformer.greyscale(b"definitely not pixels").unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }
}
