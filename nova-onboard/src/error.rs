//! Registration errors at the HTTP boundary
//!
//! `RegistrationError` converts into the shared `AppError` so handlers can
//! use `?`. Store failures are logged here with full detail; the client only
//! sees the generic upstream (or timeout) message.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::registration::{FieldErrors, RegistrationError, Violation};
use crate::store::StoreError;

impl From<RegistrationError> for AppError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(errors) => validation_error(&errors),
            RegistrationError::Conflict => AppError::new(ErrorCode::PinAlreadyUsed),
            RegistrationError::Dependency { stage, source } => {
                tracing::error!(%stage, error = %source, "Registration dependency failure");
                match source {
                    StoreError::Timeout(_) => AppError::new(ErrorCode::TimeoutError),
                    _ => AppError::upstream(),
                }
            }
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

/// Top-level code and message come from the most significant field error
fn validation_error(errors: &FieldErrors) -> AppError {
    let err = match errors.primary() {
        Some((_, primary)) if primary.violation == Violation::Required => {
            AppError::new(ErrorCode::RequiredField)
        }
        Some((_, primary)) => AppError::with_message(primary.violation.code(), primary.message.clone()),
        None => AppError::new(ErrorCode::ValidationFailed),
    };
    err.with_detail("fields", errors.to_json())
}

/// Convenience type alias for handler results
pub type ApiResult<T> = Result<T, AppError>;
