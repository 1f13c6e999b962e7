//! HTTP API
//!
//! - `POST /api/employees`: register (JSON or multipart with a `photo` file)
//! - `GET /api/employees?pin=`: PIN availability
//! - `GET /health`

pub mod employees;
pub mod form;
pub mod health;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post};
use shared::error::{AppError, ErrorCode};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::media::MAX_PHOTO_SIZE;
use crate::rate_limit::employees_rate_limit;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Room for the text fields and multipart framing around the photo
const MAX_BODY_SIZE: usize = MAX_PHOTO_SIZE + 64 * 1024;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let employees = Router::new()
        .route(
            "/api/employees",
            post(employees::register).get(employees::check_pin),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            employees_rate_limit,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(employees)
        .fallback(|| async { AppError::new(ErrorCode::NotFound) })
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the registration form; any origin when none is configured (development only)
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, BoxError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    Ok(match allowed_origin {
        Some(origin) => layer.allow_origin(origin.parse::<HeaderValue>()?),
        None => layer.allow_origin(Any),
    })
}
