//! API error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

/// Errors surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    Database(snipvault_core::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    TooManyRequests(String),
    ServiceUnavailable(String),
}

impl From<snipvault_core::Error> for ApiError {
    fn from(err: snipvault_core::Error) -> Self {
        use snipvault_core::Error;
        match &err {
            Error::SnippetNotFound(id) => ApiError::NotFound(format!("Snippet {} not found", id)),
            Error::CollectionNotFound(id) => {
                ApiError::NotFound(format!("Collection {} not found", id))
            }
            Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            Error::Inference(msg) => ApiError::ServiceUnavailable(msg.clone()),
            Error::ServiceUnavailable(msg) => ApiError::ServiceUnavailable(msg.clone()),
            Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    let friendly = if msg.contains("collection_name_key") {
                        "A collection with this name already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "success": false,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_snippet_not_found_maps_to_404() {
        let err: ApiError = snipvault_core::Error::SnippetNotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let err: ApiError = snipvault_core::Error::InvalidInput("bad".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_inference_error_maps_to_503() {
        let err: ApiError = snipvault_core::Error::Inference("down".into()).into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_error_body_envelope() {
        let response = ApiError::ServiceUnavailable("AI unavailable".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "AI unavailable");
        assert_eq!(body["success"], false);
    }
}
