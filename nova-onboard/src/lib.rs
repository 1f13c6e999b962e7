//! nova-onboard: employee self-registration service
//!
//! Validates registration forms, allocates matricules behind a PIN
//! uniqueness gate, persists employees to Airtable, hosts photos on
//! Cloudinary and sends confirmation emails (Resend, SMTP fallback).

pub mod api;
pub mod config;
pub mod email;
pub mod error;
pub mod media;
pub mod rate_limit;
pub mod registration;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
