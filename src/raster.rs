//! Raster decoding
//!
//! Turns compressed provider bytes (PNG, JPEG) into a flat, channel-interleaved
//! 8-bit buffer. The classifier only reads the first three channels of each
//! pixel, so an alpha channel may be present and is ignored.

use image::imageops::FilterType;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Dimensions;

/// A decoded image, row-major and channel-interleaved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    dimensions: Dimensions,
    /// Size of the encoded image before any resampling
    source_dimensions: Dimensions,
    channel_count: usize,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wraps an existing buffer, checking its length against the dimensions
    pub fn new(width: u32, height: u32, channel_count: usize, pixels: Vec<u8>) -> Result<Self> {
        if channel_count < 3 {
            return Err(Error::ImageDecode(format!(
                "need at least 3 channels, got {}",
                channel_count
            )));
        }

        let expected = Dimensions::new(width, height).pixel_count() as usize * channel_count;
        if pixels.len() != expected {
            return Err(Error::ImageDecode(format!(
                "buffer holds {} bytes, expected {} for {}x{}x{}",
                pixels.len(),
                expected,
                width,
                height,
                channel_count
            )));
        }

        Ok(Self {
            dimensions: Dimensions::new(width, height),
            source_dimensions: Dimensions::new(width, height),
            channel_count,
            pixels,
        })
    }

    /// Builds a 3-channel image from RGB triples in scan order
    pub fn from_rgb(width: u32, height: u32, rgb: &[[u8; 3]]) -> Result<Self> {
        Self::new(width, height, 3, rgb.iter().flatten().copied().collect())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn source_dimensions(&self) -> Dimensions {
        self.source_dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in one row of pixels
    pub fn row_stride(&self) -> usize {
        self.dimensions.width as usize * self.channel_count
    }
}

/// Decodes compressed image bytes, optionally shrinking to fit `working_resolution`
///
/// The returned image carries the post-resize dimensions; those, not the
/// requested map size, are what area estimation must be fed.
pub fn decode(bytes: &[u8], working_resolution: Option<Dimensions>) -> Result<RasterImage> {
    if bytes.is_empty() {
        return Err(Error::ImageDecode("empty image data".to_string()));
    }

    let mut img = image::load_from_memory(bytes)?;
    let source_dimensions = Dimensions::new(img.width(), img.height());

    if let Some(bound) = working_resolution {
        if bound.width == 0 || bound.height == 0 {
            return Err(Error::ImageDecode(format!(
                "working resolution must be positive, got {}x{}",
                bound.width, bound.height
            )));
        }
        if img.width() > bound.width || img.height() > bound.height {
            img = img.resize(bound.width, bound.height, FilterType::Triangle);
        }
    }

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    debug!(
        width,
        height,
        source_width = source_dimensions.width,
        source_height = source_dimensions.height,
        "decoded raster"
    );

    let mut raster = RasterImage::new(width, height, 3, rgb.into_raw())?;
    raster.source_dimensions = source_dimensions;
    Ok(raster)
}
