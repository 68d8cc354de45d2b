use std::sync::Arc;

use axum::{
    routing::post,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower::ServiceBuilder;
use axum::extract::DefaultBodyLimit;

use crate::geocode::Geocoder;
use crate::imagery::ImageryFetcher;
use crate::pipeline::Pipeline;
use super::handlers::*;

pub fn create_router<F, G>(pipeline: Pipeline<F, G>) -> Router
where
    F: ImageryFetcher + 'static,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/api/estimate-lawn", post(estimate_lawn::<F, G>))
        .route("/api/geocode", post(geocode::<F, G>))
        .with_state(Arc::new(pipeline))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(64 * 1024)) // JSON bodies only
                .layer(CorsLayer::permissive())
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use image::{ImageEncoder, Rgb, RgbImage};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::error::{Result, UpstreamError};
    use crate::geocode::{GeocodeError, Geocoded};
    use crate::imagery::ImageryRequest;
    use crate::projection::GeoPoint;

    struct StaticImagery(Option<Vec<u8>>);

    impl ImageryFetcher for StaticImagery {
        async fn fetch(&self, _request: &ImageryRequest) -> Result<Vec<u8>> {
            self.0.clone().ok_or_else(|| UpstreamError::MissingCredentials.into())
        }

        fn reference(&self, request: &ImageryRequest) -> String {
            format!("test://{:?}", request.mode())
        }
    }

    struct OneAddress;

    impl Geocoder for OneAddress {
        async fn geocode(&self, address: &str) -> std::result::Result<Geocoded, GeocodeError> {
            if address == "1 Lawn Lane" {
                Ok(Geocoded {
                    point: GeoPoint::new(10.0, 20.0).unwrap(),
                    formatted_address: "1 Lawn Lane, Greenville".to_string(),
                })
            } else {
                Err(GeocodeError::NotFound)
            }
        }
    }

    fn green_quarter_png() -> Vec<u8> {
        let img = RgbImage::from_fn(4, 4, |x, y| {
            if x < 2 && y < 2 { Rgb([0, 200, 0]) } else { Rgb([120, 120, 120]) }
        });
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), 4, 4, image::ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    fn router(bytes: Option<Vec<u8>>) -> Router {
        create_router(Pipeline::new(StaticImagery(bytes), OneAddress))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_estimate_with_coordinates() {
        let body = json!({
            "coordinates": {"lat": 0.0, "lng": 0.0},
            "zoom": 18,
            "mapWidth": 4,
            "mapHeight": 4
        });
        let (status, json) = post_json(router(Some(green_quarter_png())), "/api/estimate-lawn", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["lawnCoverage"], 25);
        assert_eq!(json["zoom"], 18);
        assert_eq!(json["address"], "Location (0.000000, 0.000000)");
        assert_eq!(json["imageUrl"], "test://PointZoom");
        assert_eq!(json["detectedPixels"].as_array().unwrap().len(), 4);
        assert_eq!(json["detectedPixels"][1], json!({"x": 0.25, "y": 0.0}));
    }

    #[tokio::test]
    async fn test_estimate_with_address() {
        let body = json!({"address": "1 Lawn Lane", "mapWidth": 4, "mapHeight": 4});
        let (status, json) = post_json(router(Some(green_quarter_png())), "/api/estimate-lawn", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["address"], "1 Lawn Lane, Greenville");
    }

    #[tokio::test]
    async fn test_estimate_requires_location() {
        let (status, json) = post_json(router(None), "/api/estimate-lawn", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_input() {
        let body = json!({"coordinates": {"lat": "abc", "lng": 1}});
        let (status, json) = post_json(router(None), "/api/estimate-lawn", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "invalid_input");
        assert!(json["error"].as_str().unwrap().contains("coordinates.lat"));

        let (status, json) = post_json(router(None), "/api/geocode", json!({"address": 7})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_estimate_degenerate_bounds() {
        let body = json!({
            "coordinates": {"lat": 1.0, "lng": 1.0},
            "mapBounds": {"north": 1.0, "south": 1.0, "east": 2.0, "west": 0.0}
        });
        let (status, json) = post_json(router(Some(green_quarter_png())), "/api/estimate-lawn", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "invalid_viewport");
    }

    #[tokio::test]
    async fn test_missing_credentials_hidden() {
        let body = json!({"coordinates": {"lat": 1.0, "lng": 1.0}});
        let (status, json) = post_json(router(None), "/api/estimate-lawn", body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Server configuration error");
        assert_eq!(json["kind"], "upstream_fetch");
    }

    #[tokio::test]
    async fn test_geocode_endpoint() {
        let (status, json) = post_json(router(None), "/api/geocode", json!({"address": "1 Lawn Lane"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["lat"], 10.0);
        assert_eq!(json["lng"], 20.0);

        let (status, json) = post_json(router(None), "/api/geocode", json!({"address": "nowhere"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Address not found");
        assert_eq!(json["kind"], "invalid_input");

        let (status, _) = post_json(router(None), "/api/geocode", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
