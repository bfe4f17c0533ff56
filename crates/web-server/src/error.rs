use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use peers::PeerError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Peer comparison error: {0}")]
    Peer(#[from] PeerError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response. Input validation
/// surfaces as 400, missing data as 404; everything else is an opaque 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Peer(err @ PeerError::InvalidTierBounds { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Peer(err @ PeerError::NoRatioDataForEntity(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Peer(peer_err) => {
                tracing::error!(error = ?peer_err, "Peer engine error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during peer comparison".to_string(),
                )
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn invalid_tier_bounds_map_to_bad_request() {
        let err = AppError::Peer(PeerError::InvalidTierBounds {
            min: Decimal::from(2000),
            max: Decimal::from(1000),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_ratio_history_maps_to_not_found() {
        let err = AppError::Peer(PeerError::NoRatioDataForEntity(42));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
