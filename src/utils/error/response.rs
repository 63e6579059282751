//! HTTP response handling for errors

use super::types::ServiceError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Notification(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Redis(_) | ServiceError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            ServiceError::SessionNotFound(_) => ("SESSION_NOT_FOUND", self.to_string()),
            ServiceError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            ServiceError::Unauthorized(_) => ("UNAUTHORIZED", self.to_string()),
            ServiceError::Notification(_) => ("NOTIFICATION_FAILED", self.to_string()),
            ServiceError::Redis(_) | ServiceError::StoreUnavailable(_) => (
                "STORE_UNAVAILABLE",
                "Key-value store operation failed".to_string(),
            ),
            _ => ("INTERNAL_ERROR", "Internal error".to_string()),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
            }
        }))
    }
}
