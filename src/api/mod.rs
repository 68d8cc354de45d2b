//! HTTP surface for the estimation pipeline

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::create_router;
