//! End-to-end lawn estimation
//!
//! One run walks geocoding (for addresses), resolve, fetch, decode, classify
//! and estimate in order, assembling the result only once every stage has
//! passed. Any failure ends the run with the originating error; nothing is
//! retried and no partial result is ever returned. Runs share no mutable
//! state, so a single [`Pipeline`] can serve any number of concurrent callers.

use std::fmt;

use tracing::{debug, info, warn};

use crate::classify::{Classification, NormalizedPoint, VegetationClassifier, VegetationThresholds};
use crate::error::{Error, Result};
use crate::estimate::{estimate_area, AreaEstimate};
use crate::geocode::{GeocodeError, Geocoded, Geocoder};
use crate::imagery::{ImageFormat, ImageryFetcher, ImageryRequest};
use crate::projection::{self, BoundingBox, GeoPoint, ScaleModel};
use crate::raster;
use crate::types::{Dimensions, ViewportSpec};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocode,
    Resolve,
    Fetch,
    Decode,
    Classify,
    Estimate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Geocode => "geocode",
            Stage::Resolve => "resolve",
            Stage::Fetch => "fetch",
            Stage::Decode => "decode",
            Stage::Classify => "classify",
            Stage::Estimate => "estimate",
        };
        f.write_str(name)
    }
}

/// Where the estimate should be made
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Free-form address, geocoded before anything else
    Address(String),
    /// Direct coordinates, with an optional label to echo back
    Coordinates { point: GeoPoint, address: Option<String> },
}

/// Caller-facing request
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRequest {
    pub location: Location,
    pub zoom: Option<f64>,
    pub map_width: Option<i64>,
    pub map_height: Option<i64>,
    pub map_bounds: Option<BoundingBox>,
}

impl EstimateRequest {
    pub fn for_address(address: impl Into<String>) -> Self {
        Self::new(Location::Address(address.into()))
    }

    pub fn for_point(point: GeoPoint) -> Self {
        Self::new(Location::Coordinates { point, address: None })
    }

    fn new(location: Location) -> Self {
        Self {
            location,
            zoom: None,
            map_width: None,
            map_height: None,
            map_bounds: None,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_map_size(mut self, width: i64, height: i64) -> Self {
        self.map_width = Some(width);
        self.map_height = Some(height);
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.map_bounds = Some(bounds);
        self
    }
}

/// Final, immutable output of one run
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateResult {
    pub address: Option<String>,
    pub square_feet: u64,
    pub square_meters: u64,
    pub lawn_coverage_pct: u8,
    /// Credential-free reference to the analyzed image
    pub image_reference: String,
    pub detected_pixels: Vec<NormalizedPoint>,
    /// Effective zoom, for point/zoom requests
    pub zoom: Option<u8>,
}

/// Classification and area for one decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub classification: Classification,
    pub area: AreaEstimate,
    /// Dimensions of the buffer that was actually classified
    pub dimensions: Dimensions,
}

/// Decodes, classifies and measures an image
///
/// `requested` is the pixel grid `scale` was derived for; `None` means the
/// image's own encoded size. When decoding resamples the image, the scale is
/// adjusted so the ground area is unchanged and the estimate is made on the
/// resampled buffer.
pub fn analyze(
    bytes: &[u8],
    requested: Option<Dimensions>,
    scale: ScaleModel,
    classifier: &VegetationClassifier,
    working_resolution: Option<Dimensions>,
) -> Result<Analysis> {
    let image = raster::decode(bytes, working_resolution).map_err(|e| fail(Stage::Decode, e))?;
    let dimensions = image.dimensions();
    let requested = requested.unwrap_or_else(|| image.source_dimensions());

    let classification = classifier.classify(&image).map_err(|e| fail(Stage::Classify, e))?;

    let area = scale
        .rescaled(requested, dimensions)
        .and_then(|scale| {
            estimate_area(
                classification.classified_count,
                classification.total_count,
                &scale,
                dimensions,
            )
        })
        .map_err(|e| fail(Stage::Estimate, e))?;

    Ok(Analysis { classification, area, dimensions })
}

fn fail(stage: Stage, error: Error) -> Error {
    warn!(%stage, kind = error.kind().name(), %error, "pipeline stage failed");
    error
}

/// Sequences geocoding, imagery and analysis for each request
pub struct Pipeline<F, G> {
    fetcher: F,
    geocoder: G,
    classifier: VegetationClassifier,
    working_resolution: Option<Dimensions>,
    image_format: ImageFormat,
}

impl<F: ImageryFetcher, G: Geocoder> Pipeline<F, G> {
    pub fn new(fetcher: F, geocoder: G) -> Self {
        Self {
            fetcher,
            geocoder,
            classifier: VegetationClassifier::default(),
            working_resolution: None,
            image_format: ImageFormat::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: VegetationThresholds) -> Self {
        self.classifier = VegetationClassifier::new(thresholds);
        self
    }

    /// Shrinks fetched imagery to fit `resolution` before classification
    pub fn with_working_resolution(mut self, resolution: Option<Dimensions>) -> Self {
        self.working_resolution = resolution;
        self
    }

    /// Compressed format requested from the imagery provider
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Looks up an address, reporting unknown addresses as invalid input
    pub async fn geocode(&self, address: &str) -> Result<Geocoded> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::InvalidInput("address is required".to_string()));
        }

        self.geocoder.geocode(address).await.map_err(|e| {
            let error = match e {
                GeocodeError::NotFound => Error::AddressNotFound,
                GeocodeError::Service(upstream) => Error::UpstreamFetch(upstream),
            };
            fail(Stage::Geocode, error)
        })
    }

    /// Runs the whole pipeline for one request
    pub async fn estimate(&self, request: EstimateRequest) -> Result<EstimateResult> {
        let (point, address) = match &request.location {
            Location::Address(address) => {
                let geocoded = self.geocode(address).await?;
                (geocoded.point, Some(geocoded.formatted_address))
            }
            Location::Coordinates { point, address } => (
                *point,
                address.as_ref().map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            ),
        };

        let spec = ViewportSpec::from_parts(
            point,
            request.zoom,
            request.map_width,
            request.map_height,
            request.map_bounds,
        )
        .map_err(|e| fail(Stage::Resolve, e))?;
        let (mut imagery, scale) = projection::resolve(&spec).map_err(|e| fail(Stage::Resolve, e))?;
        imagery.format = self.image_format;

        let bytes = self.fetcher.fetch(&imagery).await.map_err(|e| fail(Stage::Fetch, e))?;
        let analysis = self.analyze_blocking(bytes, &imagery, scale).await?;

        let result = EstimateResult {
            address: Some(address.unwrap_or_else(|| {
                format!("Location ({:.6}, {:.6})", point.latitude, point.longitude)
            })),
            square_feet: analysis.area.square_feet,
            square_meters: analysis.area.square_meters,
            lawn_coverage_pct: analysis.area.coverage_pct,
            image_reference: self.fetcher.reference(&imagery),
            detected_pixels: analysis.classification.pixels,
            zoom: imagery.zoom(),
        };

        info!(
            square_feet = result.square_feet,
            coverage = result.lawn_coverage_pct,
            "lawn estimate complete"
        );
        Ok(result)
    }

    /// Moves the CPU-bound stages off the async executor
    async fn analyze_blocking(
        &self,
        bytes: Vec<u8>,
        imagery: &ImageryRequest,
        scale: ScaleModel,
    ) -> Result<Analysis> {
        let classifier = self.classifier;
        let requested = Some(imagery.dimensions);
        let working_resolution = self.working_resolution;

        debug!(bytes = bytes.len(), "analyzing imagery");
        tokio::task::spawn_blocking(move || {
            analyze(&bytes, requested, scale, &classifier, working_resolution)
        })
        .await
        .map_err(|e| fail(Stage::Classify, Error::Classification(format!("analysis task failed: {}", e))))?
    }
}
