//! Viewport to ground-scale resolution

use tracing::debug;

use crate::error::{Error, Result};
use crate::imagery::{ImageryPayload, ImageryRequest};
use crate::types::{Dimensions, Viewport, ViewportSpec};

/// Ground distance covered by one pixel at zoom 18 on the equator
pub const BASE_METERS_PER_PIXEL_Z18: f64 = 0.596;

/// Approximate length of one degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Web Mercator imagery is undefined beyond this latitude
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 21;

/// Meters-per-pixel for one resolved request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleModel {
    pub meters_per_pixel: f64,
    /// Whether the Mercator secant correction was applied
    pub latitude_corrected: bool,
}

impl ScaleModel {
    /// Zoom-derived scale, corrected for latitude when off the equator
    ///
    /// Latitudes beyond [`MAX_MERCATOR_LATITUDE`] are rejected with
    /// [`Error::InvalidViewport`]; Web Mercator imagery does not cover them and
    /// the secant correction diverges toward the poles.
    pub fn from_zoom(zoom: u8, latitude: f64) -> Result<Self> {
        if latitude.abs() > MAX_MERCATOR_LATITUDE {
            return Err(Error::InvalidViewport(format!(
                "latitude {} outside Web Mercator coverage",
                latitude
            )));
        }

        let mut meters_per_pixel =
            BASE_METERS_PER_PIXEL_Z18 * 2f64.powi(18 - i32::from(zoom));
        let latitude_corrected = latitude != 0.0;

        if latitude_corrected {
            meters_per_pixel /= latitude.to_radians().cos();
        }

        Self::checked(meters_per_pixel, latitude_corrected)
    }

    /// Scale implied by spreading a box's ground extent over the pixel grid
    ///
    /// Uses the geometric mean of the horizontal and vertical ground sampling
    /// distances so that `width * height * mpp^2` is the box's ground area.
    pub fn from_extent(width_meters: f64, height_meters: f64, dims: Dimensions) -> Result<Self> {
        let pixels = dims.pixel_count() as f64;
        let meters_per_pixel = ((width_meters * height_meters) / pixels).sqrt();

        Self::checked(meters_per_pixel, false)
    }

    /// Adjusts the scale for a buffer resampled from `from` to `to` pixels
    ///
    /// Keeps the ground area of the viewport unchanged.
    pub fn rescaled(&self, from: Dimensions, to: Dimensions) -> Result<Self> {
        if to.pixel_count() == 0 {
            return Err(Error::InvalidViewport("cannot rescale to a zero-pixel buffer".to_string()));
        }
        if from == to {
            return Ok(*self);
        }

        let ratio = from.pixel_count() as f64 / to.pixel_count() as f64;
        Self::checked(self.meters_per_pixel * ratio.sqrt(), self.latitude_corrected)
    }

    fn checked(meters_per_pixel: f64, latitude_corrected: bool) -> Result<Self> {
        if !meters_per_pixel.is_finite() || meters_per_pixel <= 0.0 {
            return Err(Error::InvalidViewport(format!(
                "degenerate scale: {} m/px",
                meters_per_pixel
            )));
        }

        Ok(Self { meters_per_pixel, latitude_corrected })
    }
}

/// Rounds then clamps a requested zoom to the provider's supported range
pub fn clamp_zoom(zoom: f64) -> Result<u8> {
    if !zoom.is_finite() {
        return Err(Error::InvalidViewport(format!("zoom is not a number: {}", zoom)));
    }

    Ok(zoom.round().clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8)
}

/// Resolves a viewport into the provider request and the matching scale
///
/// Both outputs come from the same viewport mode; a bounding box never goes
/// through the zoom formula.
pub fn resolve(spec: &ViewportSpec) -> Result<(ImageryRequest, ScaleModel)> {
    let dims = spec.dimensions();
    if dims.width == 0 || dims.height == 0 {
        return Err(Error::InvalidViewport(format!(
            "pixel dimensions must be positive, got {}x{}",
            dims.width, dims.height
        )));
    }

    let (payload, scale) = match spec.viewport {
        Viewport::PointZoom { center, zoom } => {
            let zoom = clamp_zoom(zoom)?;
            let scale = ScaleModel::from_zoom(zoom, center.latitude)?;
            (ImageryPayload::PointZoom { center, zoom }, scale)
        }
        Viewport::BoundingBox(bbox) => {
            bbox.validate()?;
            let height_meters = (bbox.north - bbox.south) * METERS_PER_DEGREE;
            let width_meters = (bbox.east - bbox.west)
                * METERS_PER_DEGREE
                * bbox.mid_latitude().to_radians().cos();
            let scale = ScaleModel::from_extent(width_meters, height_meters, dims)?;
            (ImageryPayload::BoundingBox(bbox), scale)
        }
    };

    debug!(
        meters_per_pixel = scale.meters_per_pixel,
        latitude_corrected = scale.latitude_corrected,
        width = dims.width,
        height = dims.height,
        "resolved viewport scale"
    );

    Ok((ImageryRequest::new(payload, dims), scale))
}
