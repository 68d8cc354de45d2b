use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A WGS84 latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting values outside [-90, 90] x [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!("latitude out of range: {}", latitude)));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!("longitude out of range: {}", longitude)));
        }

        Ok(Self { latitude, longitude })
    }
}

/// Geographic extent of a viewport in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self { north, south, east, west }
    }

    /// Fails unless every edge is a real coordinate, north > south and east > west
    pub fn validate(&self) -> Result<()> {
        for (edge, value) in [("north", self.north), ("south", self.south)] {
            if !(-90.0..=90.0).contains(&value) {
                return Err(Error::InvalidViewport(format!(
                    "bounding box {} ({}) outside [-90, 90]",
                    edge, value
                )));
            }
        }
        for (edge, value) in [("east", self.east), ("west", self.west)] {
            if !(-180.0..=180.0).contains(&value) {
                return Err(Error::InvalidViewport(format!(
                    "bounding box {} ({}) outside [-180, 180]",
                    edge, value
                )));
            }
        }

        if !(self.north > self.south) {
            return Err(Error::InvalidViewport(format!(
                "bounding box north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        if !(self.east > self.west) {
            return Err(Error::InvalidViewport(format!(
                "bounding box east ({}) must be greater than west ({})",
                self.east, self.west
            )));
        }

        Ok(())
    }

    /// Latitude halfway between the north and south edges
    pub fn mid_latitude(&self) -> f64 {
        (self.north + self.south) / 2.0
    }
}
