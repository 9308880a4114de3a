//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Message shown for any persistence failure. Details stay in the logs.
pub const TRANSACTION_FAILURE_MESSAGE: &str = "Failed to process order. Please try again.";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request outside any domain rule, e.g. an id that is not a UUID.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong admin token.
    #[error("Admin access required")]
    Forbidden,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl ApiError {
    fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::BadRequest(_) | ApiError::Forbidden => None,
            ApiError::Domain(err) => Some(err.kind()),
            ApiError::Checkout(err) => Some(err.kind()),
        }
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation | ErrorKind::InsufficientStock | ErrorKind::EmptyCart => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::TransactionFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            Some(ErrorKind::TransactionFailure) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    TRANSACTION_FAILURE_MESSAGE.to_string(),
                )
            }
            Some(kind) => (status_for(kind), self.to_string()),
            None => match self {
                ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
                _ => (StatusCode::BAD_REQUEST, self.to_string()),
            },
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::StoreError;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_per_kind() {
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::InsufficientStock),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(ErrorKind::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidTransition), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::TransactionFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let err = ApiError::from(DomainError::Store(StoreError::Unavailable(
            "connection reset".to_string(),
        )));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], TRANSACTION_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_user_facing_message_is_kept() {
        let response = ApiError::from(CheckoutError::EmptyCart).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await["message"], "Your cart is empty");
    }
}
