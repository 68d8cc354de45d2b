//! Imagery requests and the provider seam
//!
//! The resolver produces an [`ImageryRequest`] once per run. Fetchers turn it
//! into compressed image bytes with a single provider call and no retries.

pub mod bing;

use std::future::Future;

use serde::Deserialize;

use crate::error::Result;
use crate::projection::{BoundingBox, GeoPoint};
use crate::types::Dimensions;

pub use bing::BingImagery;

/// Compressed format asked of the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// Request mode, mirroring the viewport it was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageryMode {
    PointZoom,
    BoundingBox,
}

/// Mode-specific part of an imagery request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageryPayload {
    /// Center and an already clamped integer zoom
    PointZoom { center: GeoPoint, zoom: u8 },
    BoundingBox(BoundingBox),
}

/// Provider-agnostic description of the image to fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageryRequest {
    pub payload: ImageryPayload,
    pub dimensions: Dimensions,
    pub format: ImageFormat,
}

impl ImageryRequest {
    pub fn new(payload: ImageryPayload, dimensions: Dimensions) -> Self {
        Self {
            payload,
            dimensions,
            format: ImageFormat::default(),
        }
    }

    pub fn mode(&self) -> ImageryMode {
        match self.payload {
            ImageryPayload::PointZoom { .. } => ImageryMode::PointZoom,
            ImageryPayload::BoundingBox(_) => ImageryMode::BoundingBox,
        }
    }

    /// Zoom level, when the request is in point/zoom mode
    pub fn zoom(&self) -> Option<u8> {
        match self.payload {
            ImageryPayload::PointZoom { zoom, .. } => Some(zoom),
            ImageryPayload::BoundingBox(_) => None,
        }
    }
}

/// Source of compressed aerial imagery
///
/// `fetch` makes exactly one provider call. Callers may wrap the returned
/// future in a timeout without changing what happens downstream.
pub trait ImageryFetcher: Send + Sync {
    /// Fetches the compressed image bytes for `request`
    fn fetch(&self, request: &ImageryRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Credential-free reference to the image, safe to hand back to callers
    fn reference(&self, request: &ImageryRequest) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_mode() {
        let center = GeoPoint::new(1.0, 2.0).unwrap();
        let point = ImageryRequest::new(
            ImageryPayload::PointZoom { center, zoom: 18 },
            Dimensions::new(600, 400),
        );
        assert_eq!(point.mode(), ImageryMode::PointZoom);
        assert_eq!(point.zoom(), Some(18));
        assert_eq!(point.format, ImageFormat::Png);

        let bbox = ImageryRequest::new(
            ImageryPayload::BoundingBox(BoundingBox::new(1.0, 0.0, 1.0, 0.0)),
            Dimensions::new(600, 400),
        );
        assert_eq!(bbox.mode(), ImageryMode::BoundingBox);
        assert_eq!(bbox.zoom(), None);
    }
}
