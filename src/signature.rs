//! Freehand signature bitmaps captured by the data-entry frontend.
//!
//! The capture surface hands over either raw RGBA pixels or an encoded image
//! file.  Both constructors validate eagerly so a bad bitmap fails the export
//! instead of silently producing a document without the supplied signature.

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

use crate::error::RenderError;

/// Signature bitmap ready for PDF embedding.
///
/// Pixels are flattened onto a white background at construction time; the
/// capture surface draws black strokes over a transparent fill and the PDF
/// image pipeline carries no alpha channel.
#[derive(Clone, Debug)]
pub struct Signature {
    image: DynamicImage,
}

impl Signature {
    /// Builds a signature from a raw `height x width x 4` RGBA byte buffer.
    ///
    /// Fails when the buffer length does not match the stated dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::Signature(format!(
                "RGBA buffer holds {} bytes but {}x{} pixels require {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        let rgba = ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
            RenderError::Signature("RGBA buffer does not form a valid image".to_owned())
        })?;
        Ok(Self {
            image: flatten_onto_white(&DynamicImage::ImageRgba8(rgba)),
        })
    }

    /// Builds a signature from encoded image bytes (PNG, JPEG, ...).
    ///
    /// Decode failures surface immediately as [`RenderError::Signature`].
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, RenderError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| RenderError::Signature(format!("decode failed: {}", err)))?;
        Ok(Self {
            image: flatten_onto_white(&decoded),
        })
    }

    /// Returns the flattened image for embedding.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Pixel dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        use image::GenericImageView;
        self.image.dimensions()
    }
}

fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let flattened: RgbImage = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = pixel[3] as u32;
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            let value = pixel[index] as u32;
            *channel = ((value * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
        Rgb(channels)
    });
    DynamicImage::ImageRgb8(flattened)
}
