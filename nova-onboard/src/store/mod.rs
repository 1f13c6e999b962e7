//! Record store collaborators
//!
//! The registration flow only needs a filtered read (is this PIN taken?) and
//! a single-record insert. Records are write-once from this service.

mod airtable;
mod memory;

pub use airtable::AirtableStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::models::{EmployeeRecord, NewEmployee};
use std::time::Duration;

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure (DNS, connect, TLS, reset)
    #[error("record store unreachable: {0}")]
    Unavailable(String),
    /// Non-success HTTP status
    #[error("record store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("record store did not answer within {0:?}")]
    Timeout(Duration),
    #[error("unexpected record store response: {0}")]
    Decode(String),
    /// The store itself refused a second active record with this PIN
    #[error("PIN already assigned to an active record")]
    DuplicatePin,
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}

/// Keyed tabular record store holding employee records
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Find an active record whose PIN is exactly `pin`
    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<EmployeeRecord>, StoreError>;

    /// Insert a new record, returning it with its store-assigned id
    async fn create(&self, employee: NewEmployee) -> Result<EmployeeRecord, StoreError>;
}
