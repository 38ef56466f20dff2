use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use settee_cart::CartError;
use settee_catalog::{MetaobjectError, PricingError, SelectionError};

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unprocessable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        tracing::debug!("Rejecting request with {}: {}", status, error_message);

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<MetaobjectError> for AppError {
    fn from(err: MetaobjectError) -> Self {
        match err {
            MetaobjectError::Catalog(e) => Self::Unprocessable(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        Self::Unprocessable(err.to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        Self::Unprocessable(err.to_string())
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        Self::Unprocessable(err.to_string())
    }
}
