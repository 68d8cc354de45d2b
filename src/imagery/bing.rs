//! Bing Maps static aerial imagery

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{Error, Result, UpstreamError};
use super::{ImageryFetcher, ImageryPayload, ImageryRequest};

/// Static aerial map endpoint
pub const BING_IMAGERY_URL: &str = "https://dev.virtualearth.net/REST/v1/Imagery/Map/Aerial";

/// Builds the shared HTTP client used by the Bing collaborators
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::UpstreamFetch(UpstreamError::Transport(e.to_string())))
}

/// Imagery fetcher backed by the Bing Maps REST imagery API
#[derive(Clone)]
pub struct BingImagery {
    client: Client,
    key: Option<String>,
    base_url: String,
}

impl BingImagery {
    /// Creates a fetcher; a missing key only fails when `fetch` is called
    pub fn new(client: Client, key: Option<String>) -> Self {
        Self {
            client,
            key: key.filter(|k| !k.trim().is_empty()),
            base_url: BING_IMAGERY_URL.to_string(),
        }
    }

    /// Points the fetcher at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Maps a request onto the provider URL, appending `key` when given
    pub fn request_url(&self, request: &ImageryRequest, key: Option<&str>) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let dims = request.dimensions;
        let size = format!("{},{}", dims.width, dims.height);

        let raw = match request.payload {
            ImageryPayload::PointZoom { center, zoom } => format!(
                "{}/{},{}/{}?mapSize={}&format={}",
                base,
                center.latitude,
                center.longitude,
                zoom,
                size,
                request.format.as_str()
            ),
            ImageryPayload::BoundingBox(bbox) => format!(
                "{}?mapArea={},{},{},{}&mapSize={}&format={}",
                base,
                bbox.south,
                bbox.west,
                bbox.north,
                bbox.east,
                size,
                request.format.as_str()
            ),
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| Error::UpstreamFetch(UpstreamError::Transport(format!("bad imagery URL: {}", e))))?;

        if let Some(key) = key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }
}

impl fmt::Debug for BingImagery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingImagery")
            .field("base_url", &self.base_url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ImageryFetcher for BingImagery {
    async fn fetch(&self, request: &ImageryRequest) -> Result<Vec<u8>> {
        let key = self.key.as_deref().ok_or(UpstreamError::MissingCredentials)?;
        let url = self.request_url(request, Some(key))?;

        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        debug!(bytes = bytes.len(), mode = ?request.mode(), "fetched imagery");
        Ok(bytes.to_vec())
    }

    fn reference(&self, request: &ImageryRequest) -> String {
        self.request_url(request, None)
            .map(String::from)
            .unwrap_or_default()
    }
}
