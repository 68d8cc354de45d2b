//! Runtime settings
//!
//! Read from an optional `lawn-estimator.toml` in the working directory, then
//! from `LAWN__*` environment variables (`LAWN__BING_MAPS_KEY`,
//! `LAWN__SERVER__ADDRESS`, `LAWN__THRESHOLDS__VALUE_MAX`, ...).

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::classify::VegetationThresholds;
use crate::error::Result;
use crate::geocode::BingGeocoder;
use crate::imagery::bing::{http_client, BingImagery};
use crate::imagery::ImageFormat;
use crate::pipeline::Pipeline;
use crate::types::Dimensions;

#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    /// Bing Maps key shared by imagery and geocoding
    #[serde(default)]
    pub bing_maps_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Resize bound applied before classification
    #[serde(default)]
    pub working_resolution: Option<Dimensions>,
    #[serde(default)]
    pub thresholds: VegetationThresholds,
    /// Format requested from the imagery provider (`png` or `jpeg`)
    #[serde(default)]
    pub imagery_format: ImageFormat,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: default_address() }
    }
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Loads settings from the config file and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("lawn-estimator").required(false))
                .add_source(Environment::with_prefix("LAWN").separator("__"))
                .build()?,
        )
    }

    pub fn from_config(config: Config) -> std::result::Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the Bing-backed pipeline described by these settings
    pub fn bing_pipeline(&self) -> Result<Pipeline<BingImagery, BingGeocoder>> {
        let client = http_client(self.request_timeout())?;

        Ok(Pipeline::new(
            BingImagery::new(client.clone(), self.bing_maps_key.clone()),
            BingGeocoder::new(client, self.bing_maps_key.clone()),
        )
        .with_thresholds(self.thresholds)
        .with_working_resolution(self.working_resolution)
        .with_image_format(self.imagery_format))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server", &self.server)
            .field("bing_maps_key", &self.bing_maps_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("working_resolution", &self.working_resolution)
            .field("thresholds", &self.thresholds)
            .field("imagery_format", &self.imagery_format)
            .finish()
    }
}
