//! Geographic coordinates and ground-scale resolution

pub mod coordinate;
pub mod scale;

pub use coordinate::{BoundingBox, GeoPoint};
pub use scale::{clamp_zoom, resolve, ScaleModel};
