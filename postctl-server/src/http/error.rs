//! API error type with IntoResponse
//!
//! Errors answer with a plain-text body. Validation failures are not
//! errors at this level: they are reported inside a 200 message envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::StoreError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Path identifier is not an integer (400)
    InvalidId,

    /// Request body is not valid JSON (400)
    BadBody { message: String },

    /// Unsupported method (405)
    MethodNotAllowed,

    /// Storage failure (500, logged, raw message returned)
    Store(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::BadBody { .. } => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::InvalidId => "Invalid ID".to_string(),
            Self::BadBody { message } => message,
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            Self::Store(e) => {
                tracing::error!("Storage error: {}", e);
                e.to_string()
            }
        };

        (status, message).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::BadBody {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn invalid_id_is_400() {
        let response = ApiError::InvalidId.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid ID");
    }

    #[tokio::test]
    async fn method_not_allowed_is_405() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(response).await, "Method not allowed");
    }

    #[tokio::test]
    async fn store_error_exposes_raw_message() {
        let err = ApiError::from(StoreError::Constraint("duplicate key".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "duplicate key");
    }

    #[tokio::test]
    async fn json_error_is_400() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
