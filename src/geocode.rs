//! Address to coordinate lookup

use std::fmt;
use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::error::UpstreamError;
use crate::projection::GeoPoint;

/// Bing Maps location query endpoint
pub const BING_LOCATIONS_URL: &str = "https://dev.virtualearth.net/REST/v1/Locations";

/// A geocoded address
#[derive(Debug, Clone, PartialEq)]
pub struct Geocoded {
    pub point: GeoPoint,
    pub formatted_address: String,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("address not found")]
    NotFound,

    #[error("geocoding service error: {0}")]
    Service(#[from] UpstreamError),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(error: reqwest::Error) -> Self {
        GeocodeError::Service(error.into())
    }
}

/// Resolves free-form addresses to a point
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Geocoded, GeocodeError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationsResponse {
    #[serde(default)]
    resource_sets: Vec<ResourceSet>,
}

#[derive(Debug, Deserialize)]
struct ResourceSet {
    #[serde(default)]
    resources: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    point: LocationPoint,
    address: LocationAddress,
}

#[derive(Debug, Deserialize)]
struct LocationPoint {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationAddress {
    formatted_address: String,
}

impl LocationsResponse {
    fn first_match(self) -> Result<Geocoded, GeocodeError> {
        let location = self
            .resource_sets
            .into_iter()
            .next()
            .and_then(|set| set.resources.into_iter().next())
            .ok_or(GeocodeError::NotFound)?;

        let [latitude, longitude] = location.point.coordinates;
        let point = GeoPoint::new(latitude, longitude).map_err(|e| {
            GeocodeError::Service(UpstreamError::Transport(format!("bad coordinates in response: {}", e)))
        })?;

        Ok(Geocoded {
            point,
            formatted_address: location.address.formatted_address,
        })
    }
}

/// Geocoder backed by the Bing Maps Locations API
#[derive(Clone)]
pub struct BingGeocoder {
    client: Client,
    key: Option<String>,
    base_url: String,
}

impl BingGeocoder {
    pub fn new(client: Client, key: Option<String>) -> Self {
        Self {
            client,
            key: key.filter(|k| !k.trim().is_empty()),
            base_url: BING_LOCATIONS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for BingGeocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingGeocoder")
            .field("base_url", &self.base_url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Geocoder for BingGeocoder {
    async fn geocode(&self, address: &str) -> Result<Geocoded, GeocodeError> {
        let key = self.key.as_deref().ok_or(UpstreamError::MissingCredentials)?;

        let body: LocationsResponse = self
            .client
            .get(&self.base_url)
            .query(&[("query", address), ("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let geocoded = body.first_match()?;
        debug!(address = %geocoded.formatted_address, "geocoded address");
        Ok(geocoded)
    }
}
