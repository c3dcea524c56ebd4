//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use log::info;

use crate::server::dto::{BatchRequest, BatchResponse, ServiceInfo};
use crate::server::error::ApiError;
use crate::service::{HealthStatus, SentimentService};

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

pub async fn health(
    State(service): State<Arc<SentimentService>>,
) -> Result<Json<HealthStatus>, ApiError> {
    Ok(Json(service.health()?))
}

pub async fn predict_batch(
    State(service): State<Arc<SentimentService>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let prediction = service.predict_batch(request.into_texts()).await?;

    info!(
        "request_id={} comments={} time_ms={:.2}",
        prediction.request_id,
        prediction.results.len(),
        prediction.processing_time_ms
    );

    let request_id = HeaderValue::from_str(&prediction.request_id.to_string())
        .map_err(|e| ApiError(crate::error::SentiscopeError::other(e.to_string())))?;
    let mut response = Json(BatchResponse::from(prediction)).into_response();
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), request_id);
    Ok(response)
}
