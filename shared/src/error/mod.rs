//! Unified error system for the Nova onboarding service
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by code range
//! - [`AppError`]: Error with code, message, and details
//! - [`ErrorResponse`]: Wire format of a failed request
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 6xxx: Media (photo upload) errors
//! - 8xxx: Employee registration errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorResponse};
//!
//! let err = AppError::with_message(ErrorCode::PinInvalid, "Le PIN doit contenir entre 4 et 6 chiffres")
//!     .with_detail("field", "pin");
//!
//! let body = ErrorResponse::from_error(&err);
//! assert!(!body.success);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{AppError, ErrorResponse};
