//! Photo compression: fixed-height nearest-neighbour resize and re-encode.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use thiserror::Error;

/// JPEG quality used when re-encoding photos.
const JPEG_QUALITY: u8 = 85;

/// Media transform errors.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The payload could not be decoded or re-encoded as an image.
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Image formats that are compressed on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatKind {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl ImageFormatKind {
    /// Map a MIME type to a compressible format, if it is one.
    #[must_use]
    pub fn from_mimetype(mimetype: &str) -> Option<Self> {
        match mimetype {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Resizes photos to a fixed height and re-encodes them in their own format.
#[derive(Debug, Clone, Copy)]
pub struct ImageCompressor {
    target_height: u32,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARGET_HEIGHT)
    }
}

impl ImageCompressor {
    /// Default output height in pixels.
    pub const DEFAULT_TARGET_HEIGHT: u32 = 600;

    /// Create a compressor for the given output height.
    #[must_use]
    pub const fn new(target_height: u32) -> Self {
        Self { target_height }
    }

    /// Output height in pixels.
    #[must_use]
    pub const fn target_height(&self) -> u32 {
        self.target_height
    }

    /// Compress an encoded image.
    ///
    /// EXIF orientation is applied first so the target height refers to the
    /// image as it is displayed. Width keeps the aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid image of `format` or the
    /// re-encode fails.
    pub fn compress(&self, data: &[u8], format: ImageFormatKind) -> Result<Vec<u8>, MediaError> {
        let mut decoder =
            ImageReader::with_format(Cursor::new(data), format.image_format()).into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut image = DynamicImage::from_decoder(decoder)?;
        // Rotate before resizing: the target is the height as displayed, not
        // the height of the raw pixel grid. Rotating afterwards would turn a
        // 90-degree photo into a 600px-wide one.
        image.apply_orientation(orientation);

        let width = scaled_width(image.width(), image.height(), self.target_height);
        let resized = image.resize_exact(width, self.target_height, FilterType::Nearest);

        let mut out = Vec::new();
        match format {
            ImageFormatKind::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                resized.write_with_encoder(encoder)?;
            }
            ImageFormatKind::Jpeg => {
                // JPEG has no alpha channel.
                let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
                DynamicImage::ImageRgb8(resized.to_rgb8()).write_with_encoder(encoder)?;
            }
        }
        Ok(out)
    }
}

/// Width that keeps `width:height` when the height becomes `target_height`.
///
/// Rounds to the nearest pixel and never returns zero.
#[must_use]
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    if height == 0 {
        return 1;
    }
    let (width, height, target) = (
        u64::from(width),
        u64::from(height),
        u64::from(target_height),
    );
    let scaled = (width * target + height / 2) / height;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use rstest::rstest;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 40, 90]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut out, format)
            .expect("encode test image");
        out.into_inner()
    }

    #[rstest]
    #[case(800, 1200, 600, 400)]
    #[case(1200, 800, 600, 900)]
    #[case(1000, 500, 600, 1200)]
    #[case(1, 10_000, 600, 1)]
    #[case(333, 1000, 600, 200)]
    fn test_scaled_width(
        #[case] width: u32,
        #[case] height: u32,
        #[case] target: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(scaled_width(width, height, target), expected);
    }

    #[test]
    fn test_from_mimetype() {
        assert_eq!(ImageFormatKind::from_mimetype("image/png"), Some(ImageFormatKind::Png));
        assert_eq!(ImageFormatKind::from_mimetype("image/jpeg"), Some(ImageFormatKind::Jpeg));
        assert_eq!(ImageFormatKind::from_mimetype("image/gif"), None);
        assert_eq!(ImageFormatKind::from_mimetype("application/pdf"), None);
    }

    #[test]
    fn test_png_resized_to_target_height() {
        let source = encode(800, 1200, ImageFormat::Png);
        let output = ImageCompressor::default()
            .compress(&source, ImageFormatKind::Png)
            .expect("compress png");

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (400, 600));
    }

    #[test]
    fn test_jpeg_stays_jpeg() {
        let source = encode(1000, 500, ImageFormat::Jpeg);
        let output = ImageCompressor::new(300)
            .compress(&source, ImageFormatKind::Jpeg)
            .expect("compress jpeg");

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (600, 300));
    }

    #[test]
    fn test_invalid_bytes_fail() {
        let result = ImageCompressor::default().compress(b"not an image", ImageFormatKind::Png);
        assert!(matches!(result, Err(MediaError::Image(_))));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Aspect ratio is preserved to within half a pixel of the exact width.
    proptest! {
        #[test]
        fn prop_scaled_width_preserves_ratio(
            width in 1u32..20_000,
            height in 1u32..20_000,
            target in 1u32..4_000,
        ) {
            let scaled = u64::from(scaled_width(width, height, target));
            let exact_numerator = u64::from(width) * u64::from(target);
            let h = u64::from(height);
            // |scaled - w*t/h| <= 1/2, or clamped up to 1
            let diff = (scaled * h).abs_diff(exact_numerator);
            prop_assert!(diff * 2 <= h || scaled == 1);
        }
    }
}
