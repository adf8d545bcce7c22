use crate::utils::error::ScoutError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl ResponseError for ScoutError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(ScoutError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 只回傳通用訊息；細節寫進 log
    fn error_response(&self) -> HttpResponse {
        let status = ResponseError::status_code(self);
        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        HttpResponse::build(status).json(ErrorBody::new(self.user_friendly_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_body_is_generic() {
        let err = ScoutError::UpstreamStatusError {
            provider: "Wikidata".to_string(),
            status: 503,
        };

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Upstream service error");
    }

    #[test]
    fn test_status_mapping() {
        let not_found = ScoutError::NotFoundError {
            resource: "Facility".to_string(),
        };
        assert_eq!(ResponseError::status_code(&not_found), StatusCode::NOT_FOUND);

        let missing = ScoutError::MissingFieldError {
            field: "facilityName".to_string(),
        };
        assert_eq!(ResponseError::status_code(&missing), StatusCode::BAD_REQUEST);
    }
}
