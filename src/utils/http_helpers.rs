use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The error kinds a handler can surface. Each maps to a fixed status code
/// and a `{"error": ...}` JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, invalid, or expired credentials. Clients cannot tell which.
    Unauthorized,
    /// Authenticated, but the identity does not own the requested resource.
    Forbidden,
    NotFound,
    InvalidPayload(String),
    /// A database error. The detail is logged, not sent to the client.
    Store(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized access".to_string(),
            ApiError::Forbidden => "Forbidden".to_string(),
            ApiError::NotFound => "Not found".to_string(),
            ApiError::InvalidPayload(msg) => msg.clone(),
            ApiError::Store(_) => "Internal server error".to_string(),
        }
    }
}

/// Converts an `ApiError` into an HTTP response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(ref e) = self {
            tracing::error!("Store error: {}", e);
        }
        let body = serde_json::json!({ "error": self.message() }).to_string();
        Response::builder()
            .status(self.status())
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidPayload("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// Store details must never leak into the response body.
    #[test]
    fn test_store_error_body_is_generic() {
        assert_eq!(
            ApiError::Store("connection reset by peer".into()).message(),
            "Internal server error"
        );
    }
}
