//! Shared types for the Nova onboarding service
//!
//! Error codes, the wire error format and the employee models used by the
//! server and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
