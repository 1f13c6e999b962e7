//! Employee self-registration
//!
//! [`Registrar`] runs the whole flow: validate → PIN uniqueness → allocate
//! identifiers → photo upload → persist → queue the confirmation email.

mod matricule;
mod service;
pub mod validator;

pub use matricule::{MatriculeAllocator, SUFFIX_RANGE};
pub use service::{Registrar, RegistrarSettings};
pub use validator::{FieldError, FieldErrors, ValidationRules, Violation};

use chrono::NaiveDate;
use shared::models::{EmployeeRecord, RegistrationPayload, RegistrationResponse};
use std::fmt;

use crate::media::PhotoUpload;
use crate::store::StoreError;

/// A submitted registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub payload: RegistrationPayload,
    pub photo: Option<PhotoUpload>,
}

impl From<RegistrationPayload> for RegistrationRequest {
    fn from(payload: RegistrationPayload) -> Self {
        Self {
            payload,
            photo: None,
        }
    }
}

/// A completed registration
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub record: EmployeeRecord,
}

impl RegistrationOutcome {
    pub fn response(&self) -> RegistrationResponse {
        let employee = &self.record.employee;
        RegistrationResponse {
            success: true,
            matricule: employee.matricule.clone(),
            qr_id: employee.qr_id.clone(),
            employee_id: self.record.id.clone(),
            photo_url: employee.photo_url.clone(),
        }
    }
}

/// Store call that failed during a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PinLookup,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PinLookup => f.write_str("PIN lookup"),
            Stage::Persist => f.write_str("record insert"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("PIN already assigned to an active employee")]
    Conflict,
    #[error("{stage} failed: {source}")]
    Dependency {
        stage: Stage,
        #[source]
        source: StoreError,
    },
}

/// Source of the current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        shared::util::today_utc()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
