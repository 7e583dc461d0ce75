use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use quotegate_core::{GatewayError, ValidationError};

/// Boundary error: translates operation and validation failures into HTTP
/// status codes. Bodies are `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Gateway(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Gateway(GatewayError::Upstream { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use quotegate_core::{Operation, Symbol};

    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let error = ApiError::from(GatewayError::not_found(Operation::Info, &symbol));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_maps_to_500() {
        let error = ApiError::from(GatewayError::upstream(Operation::History, "rate limited"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_400() {
        let error = ApiError::from(ValidationError::InvalidPeriod {
            value: String::from("7w"),
        });
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
