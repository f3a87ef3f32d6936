//! HTTP mapping for `AppError`. Handlers return `Result<_, ApiError>` so
//! domain failures turn into JSON error bodies with the right status.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use lf_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] AppError);

/// Port traits speak anyhow; anything reaching the handler layer that
/// isn't already an AppError is an infrastructure fault.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(AppError::Internal(format!("{err:#}")))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = &self.0 {
            log::error!("internal error served as 500: {detail}");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.to_string() }))
    }
}
