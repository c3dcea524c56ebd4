//! Mapping library errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::error::{SentiscopeError, ValidationError};
use crate::server::dto::ErrorBody;

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub SentiscopeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else if self.0.is_unavailable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn detail(&self) -> String {
        match &self.0 {
            SentiscopeError::ServiceUnavailable(reason) => reason.clone(),
            SentiscopeError::Validation(e) => e.to_string(),
            SentiscopeError::Prediction(_) => self.0.to_string(),
            other => format!("Prediction error: {other}"),
        }
    }
}

impl From<SentiscopeError> for ApiError {
    fn from(err: SentiscopeError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ValidationError::Malformed(rejection.body_text()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("{detail}");
        } else {
            warn!("{} {detail}", status.as_u16());
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError(ValidationError::Malformed("bad".to_string()).into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail(), "malformed request: bad");

        let err = ApiError(SentiscopeError::unavailable("Model not loaded"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.detail(), "Model not loaded");

        let err = ApiError(SentiscopeError::prediction("weights mismatch"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), "Prediction error: weights mismatch");

        let err = ApiError(SentiscopeError::feature("boom"));
        assert_eq!(err.detail(), "Prediction error: Feature error: boom");
    }
}
