//! Fixed-size avatar transcoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::{Result, WorkerError};

/// Target avatar edge length in pixels.
const AVATAR_SIZE: u32 = 300;

/// JPEG quality factor for re-encoded avatars.
const JPEG_QUALITY: u8 = 80;

/// Transforms uploaded pictures into fixed-size JPEG avatars.
///
/// The transform is deterministic: the same input bytes always produce
/// the same output bytes, which keeps redelivered jobs idempotent.
#[derive(Debug, Clone, Copy)]
pub struct AvatarProcessor {
    width: u32,
    height: u32,
    quality: u8,
}

impl Default for AvatarProcessor {
    fn default() -> Self {
        Self {
            width: AVATAR_SIZE,
            height: AVATAR_SIZE,
            quality: JPEG_QUALITY,
        }
    }
}

impl AvatarProcessor {
    /// Creates a processor with custom dimensions and quality.
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }

    /// Returns the output content type.
    pub fn content_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// Decodes, resizes, and re-encodes an uploaded picture.
    ///
    /// The source is cover-cropped to the target dimensions, so portrait
    /// and landscape inputs both fill the square without letterboxing.
    pub fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        let source = image::load_from_memory(data).map_err(WorkerError::Decode)?;
        let resized = source.resize_to_fill(self.width, self.height, FilterType::Lanczos3);

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), self.quality);
        resized
            .write_with_encoder(encoder)
            .map_err(WorkerError::Encode)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn output_is_300x300_jpeg() {
        let processor = AvatarProcessor::default();
        let output = processor.process(&png_fixture(640, 480)).unwrap();

        assert_eq!(
            image::guess_format(&output).unwrap(),
            image::ImageFormat::Jpeg
        );

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 300);
    }

    #[test]
    fn portrait_input_fills_the_square() {
        let processor = AvatarProcessor::default();
        let output = processor.process(&png_fixture(120, 600)).unwrap();

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 300));
    }

    #[test]
    fn same_input_produces_same_output() {
        let processor = AvatarProcessor::default();
        let input = png_fixture(400, 400);

        let first = processor.process(&input).unwrap();
        let second = processor.process(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn undecodable_bytes_fail_with_decode_error() {
        let processor = AvatarProcessor::default();
        let err = processor.process(b"definitely not an image").unwrap_err();
        assert!(matches!(err, WorkerError::Decode(_)));
        assert!(err.is_terminal());
    }

    #[test]
    fn custom_dimensions_are_honored() {
        let processor = AvatarProcessor::new(64, 64, 90);
        let output = processor.process(&png_fixture(640, 480)).unwrap();

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }
}
