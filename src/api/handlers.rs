use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use crate::error::Error;
use crate::geocode::Geocoder;
use crate::imagery::ImageryFetcher;
use crate::pipeline::Pipeline;
use super::models::*;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn estimate_lawn<F, G>(
    State(pipeline): State<Arc<Pipeline<F, G>>>,
    body: Result<Json<EstimateLawnRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>, ApiError>
where
    F: ImageryFetcher + 'static,
    G: Geocoder + 'static,
{
    let start = Instant::now();
    let Json(req) = body.map_err(rejection_response)?;

    let request = req.into_request().map_err(error_response)?;
    let result = pipeline.estimate(request).await.map_err(error_response)?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        square_feet = result.square_feet,
        "served lawn estimate"
    );
    Ok(Json(result.into()))
}

pub async fn geocode<F, G>(
    State(pipeline): State<Arc<Pipeline<F, G>>>,
    body: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<GeocodeResponse>, ApiError>
where
    F: ImageryFetcher + 'static,
    G: Geocoder + 'static,
{
    let Json(req) = body.map_err(rejection_response)?;
    let address = req.address.unwrap_or_default();

    match pipeline.geocode(&address).await {
        Ok(geocoded) => Ok(Json(GeocodeResponse {
            lat: geocoded.point.latitude,
            lng: geocoded.point.longitude,
            address: geocoded.formatted_address,
        })),
        Err(err @ Error::AddressNotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Address not found".to_string(),
                kind: err.kind().name(),
            }),
        )),
        Err(e) => Err(error_response(e)),
    }
}

/// Reports an unreadable JSON body as invalid input
fn rejection_response(rejection: JsonRejection) -> ApiError {
    error_response(Error::InvalidInput(rejection.body_text()))
}

/// Maps a pipeline error onto an HTTP status and body
pub fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidInput(_) | Error::AddressNotFound | Error::InvalidViewport(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::UpstreamFetch(upstream) if upstream.is_configuration() => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Error::UpstreamFetch(_) | Error::ImageDecode(_) => StatusCode::BAD_GATEWAY,
        Error::Classification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &err {
        Error::UpstreamFetch(upstream) if upstream.is_configuration() => {
            "Server configuration error".to_string()
        }
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!(%err, status = status.as_u16(), "request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: message,
            kind: err.kind().name(),
        }),
    )
}
