//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use geoslot_domain::error::GeoSlotError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GeoSlotError`] and request problems to an HTTP response.
pub enum ApiError {
    Domain(GeoSlotError),
    /// A path segment is not a valid identifier.
    InvalidId { entity: &'static str, raw: String },
}

impl ApiError {
    pub(crate) fn invalid_id(entity: &'static str, raw: impl Into<String>) -> Self {
        Self::InvalidId {
            entity,
            raw: raw.into(),
        }
    }
}

impl From<GeoSlotError> for ApiError {
    fn from(err: GeoSlotError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidId { entity, raw } => (
                StatusCode::BAD_REQUEST,
                format!("invalid {entity} id {raw:?}"),
            ),
            Self::Domain(GeoSlotError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(GeoSlotError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(GeoSlotError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
