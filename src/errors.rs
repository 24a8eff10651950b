use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::WidgetError;

pub const UNAVAILABLE_TEXT: &str = "Service temporarily unavailable";
pub const INTERNAL_TEXT: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WidgetError> for AppError {
    fn from(e: WidgetError) -> Self {
        match e {
            WidgetError::Config(msg) | WidgetError::Network(msg) => AppError::Unavailable(msg),
            WidgetError::Identity => AppError::Validation(WidgetError::Identity.to_string()),
            WidgetError::Validation { message, .. } => AppError::Validation(message),
            WidgetError::Data(msg) => AppError::BadRequest(msg),
            WidgetError::Submission(msg) => AppError::Validation(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": msg
            })),
            AppError::Validation(msg) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": msg }))
            }
            AppError::Unavailable(msg) => {
                log::error!("Upstream unavailable: {msg}");
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": UNAVAILABLE_TEXT
                }))
            }
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(msg) => {
                log::error!("Internal error: {msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": INTERNAL_TEXT
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode, ResponseError};

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn unavailable_body_hides_upstream_detail() {
        let resp = AppError::Unavailable("tcp connect error 10.0.0.3".into()).error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(!text.contains("10.0.0.3"));
        assert!(text.contains(UNAVAILABLE_TEXT));
    }

    #[test]
    fn network_error_maps_to_unavailable() {
        let app_err: AppError = WidgetError::Network("down".to_string()).into();
        assert!(matches!(app_err, AppError::Unavailable(_)));
    }

    #[test]
    fn config_error_maps_to_unavailable() {
        let app_err: AppError = WidgetError::Config("no base".to_string()).into();
        assert!(matches!(app_err, AppError::Unavailable(_)));
    }

    #[test]
    fn data_error_maps_to_bad_request() {
        let app_err: AppError = WidgetError::Data("disabled".to_string()).into();
        assert_eq!(app_err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_keeps_field_message() {
        let app_err: AppError = WidgetError::Validation {
            product_id: 3,
            message: "Please enter a valid quantity.".into(),
        }
        .into();
        assert_eq!(app_err.to_string(), "Please enter a valid quantity.");
        assert_eq!(
            app_err.error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
