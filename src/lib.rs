//! lawn-estimator - Lawn area estimation from aerial imagery
//!
//! lawn-estimator turns a location and viewport into an estimate of the
//! vegetated area visible in a static aerial image: the viewport is resolved
//! into a ground scale, the image is fetched and decoded, every pixel is run
//! through an HSV color rule, and the classified fraction is converted into
//! square feet and square meters.
//!
//! # Examples
//!
//! ## Running the pipeline
//!
//! ```no_run
//! use lawn_estimator::{EstimateRequest, GeoPoint, Settings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Settings::load()?.bing_pipeline()?;
//!
//! let request = EstimateRequest::for_point(GeoPoint::new(47.6205, -122.3493)?)
//!     .with_zoom(19.0)
//!     .with_map_size(600, 400);
//!
//! let result = pipeline.estimate(request).await?;
//! println!("{} sq ft ({}% coverage)", result.square_feet, result.lawn_coverage_pct);
//! # Ok(())
//! # }
//! ```
//!
//! ## Analyzing a local image
//!
//! ```no_run
//! use lawn_estimator::{estimate_area, raster, ScaleModel, VegetationClassifier};
//!
//! let bytes = std::fs::read("yard.png").unwrap();
//! let image = raster::decode(&bytes, None)?;
//! let classification = VegetationClassifier::default().classify(&image)?;
//!
//! let scale = ScaleModel::from_zoom(19, 47.6)?;
//! let area = estimate_area(
//!     classification.classified_count,
//!     classification.total_count,
//!     &scale,
//!     image.dimensions(),
//! )?;
//! println!("{} sq m", area.square_meters);
//! # Ok::<(), lawn_estimator::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod projection;
pub mod imagery;
pub mod geocode;
pub mod raster;
pub mod classify;
pub mod estimate;
pub mod pipeline;
pub mod config;
pub mod api;

#[cfg(test)]
mod test_util;

pub use error::{Error, ErrorKind, Result, UpstreamError};
pub use types::{Dimensions, Viewport, ViewportSpec};
pub use projection::{resolve, BoundingBox, GeoPoint, ScaleModel};
pub use imagery::{BingImagery, ImageryFetcher, ImageryRequest};
pub use geocode::{BingGeocoder, GeocodeError, Geocoded, Geocoder};
pub use raster::RasterImage;
pub use classify::{Classification, NormalizedPoint, VegetationClassifier, VegetationThresholds};
pub use estimate::{estimate_area, AreaEstimate};
pub use pipeline::{analyze, EstimateRequest, EstimateResult, Location, Pipeline};
pub use config::Settings;
