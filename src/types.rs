//! Core data types for lawn-estimator

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::{BoundingBox, GeoPoint};

/// Default zoom used when the caller does not pass one
pub const DEFAULT_ZOOM: f64 = 18.0;

/// Default requested map width in pixels
pub const DEFAULT_WIDTH_PX: u32 = 600;

/// Default requested map height in pixels
pub const DEFAULT_HEIGHT_PX: u32 = 400;

/// Represents image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Which of the two viewport descriptions is active for a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// Center point plus a (possibly fractional) zoom level
    PointZoom { center: GeoPoint, zoom: f64 },
    /// Explicit geographic extent
    BoundingBox(BoundingBox),
}

/// Viewport plus the pixel size of the image requested for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSpec {
    pub viewport: Viewport,
    pub width_px: u32,
    pub height_px: u32,
}

impl ViewportSpec {
    /// Creates a point/zoom viewport
    pub fn point_zoom(center: GeoPoint, zoom: f64, width_px: u32, height_px: u32) -> Self {
        Self {
            viewport: Viewport::PointZoom { center, zoom },
            width_px,
            height_px,
        }
    }

    /// Creates a bounding-box viewport
    pub fn bounding_box(bbox: BoundingBox, width_px: u32, height_px: u32) -> Self {
        Self {
            viewport: Viewport::BoundingBox(bbox),
            width_px,
            height_px,
        }
    }

    /// Builds a spec from loosely-typed caller fields, rejecting non-positive sizes
    pub fn from_parts(
        center: GeoPoint,
        zoom: Option<f64>,
        width_px: Option<i64>,
        height_px: Option<i64>,
        bounds: Option<BoundingBox>,
    ) -> Result<Self> {
        let width_px = pixel_extent("width", width_px, DEFAULT_WIDTH_PX)?;
        let height_px = pixel_extent("height", height_px, DEFAULT_HEIGHT_PX)?;

        Ok(match bounds {
            Some(bbox) => Self::bounding_box(bbox, width_px, height_px),
            None => Self::point_zoom(center, zoom.unwrap_or(DEFAULT_ZOOM), width_px, height_px),
        })
    }

    /// Returns the requested pixel dimensions
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width_px, self.height_px)
    }
}

fn pixel_extent(name: &str, value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) if v <= 0 => Err(Error::InvalidViewport(format!(
            "{} must be positive, got {}",
            name, v
        ))),
        Some(v) => u32::try_from(v)
            .map_err(|_| Error::InvalidViewport(format!("{} too large: {}", name, v))),
    }
}
