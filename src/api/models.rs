use serde::{Deserialize, Serialize};

use crate::classify::NormalizedPoint;
use crate::error::{Error, Result};
use crate::pipeline::{EstimateRequest, EstimateResult, Location};
use crate::projection::{BoundingBox, GeoPoint};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateLawnRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub map_width: Option<i64>,
    #[serde(default)]
    pub map_height: Option<i64>,
    #[serde(default)]
    pub map_bounds: Option<BoundingBox>,
}

impl EstimateLawnRequest {
    /// Coordinates win over the address; the address is then only a label
    pub fn into_request(self) -> Result<EstimateRequest> {
        let location = match (self.coordinates, self.address) {
            (Some(coords), address) => Location::Coordinates {
                point: GeoPoint::new(coords.lat, coords.lng)?,
                address,
            },
            (None, Some(address)) => Location::Address(address),
            (None, None) => {
                return Err(Error::InvalidInput("address or coordinates are required".to_string()))
            }
        };

        Ok(EstimateRequest {
            location,
            zoom: self.zoom,
            map_width: self.map_width,
            map_height: self.map_height,
            map_bounds: self.map_bounds,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub address: Option<String>,
    pub square_feet: u64,
    pub square_meters: u64,
    pub lawn_coverage: u8,
    pub image_url: String,
    pub detected_pixels: Vec<NormalizedPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,
}

impl From<EstimateResult> for EstimateResponse {
    fn from(result: EstimateResult) -> Self {
        Self {
            address: result.address,
            square_feet: result.square_feet,
            square_meters: result.square_meters,
            lawn_coverage: result.lawn_coverage_pct,
            image_url: result.image_reference,
            detected_pixels: result.detected_pixels,
            zoom: result.zoom,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}
