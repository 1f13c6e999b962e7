//! Employee registration handlers

use axum::Json;
use axum::extract::{Query, State};
use shared::error::{AppError, ErrorCode};
use shared::models::{PinAvailability, PinQuery, RegistrationResponse};

use super::form::RegistrationForm;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/employees
pub async fn register(
    State(state): State<AppState>,
    RegistrationForm(request): RegistrationForm,
) -> ApiResult<Json<RegistrationResponse>> {
    let outcome = state.registrar.register(request).await?;
    Ok(Json(outcome.response()))
}

/// GET /api/employees?pin=1234
pub async fn check_pin(
    State(state): State<AppState>,
    Query(query): Query<PinQuery>,
) -> ApiResult<Json<PinAvailability>> {
    let pin = query
        .pin
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "Le PIN est requis"))?;

    let available = state.registrar.check_pin_available(&pin).await?;
    Ok(Json(PinAvailability { available }))
}
