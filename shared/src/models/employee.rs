//! Employee Model

use serde::{Deserialize, Serialize};

/// Registration form payload
///
/// Every text field defaults to empty so that a missing field surfaces as a
/// field-level validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationPayload {
    pub nom: String,
    pub prenom: String,
    pub poste: String,
    /// `YYYY-MM-DD`
    pub date_naissance: String,
    pub pin: String,
    pub confirm_pin: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// Employee record as persisted in the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Store-assigned record id
    pub id: String,
    #[serde(flatten)]
    pub employee: NewEmployee,
}

/// Insert payload for the record store
///
/// Missing fields decode to their defaults: Airtable omits unchecked
/// checkboxes and empty cells from its responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEmployee {
    pub matricule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_id: Option<String>,
    pub pin: String,
    pub nom: String,
    pub prenom: String,
    pub poste: String,
    pub date_naissance: String,
    /// Registration date, `YYYY-MM-DD`
    pub date_inscription: String,
    pub actif: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Successful registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub matricule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_id: Option<String>,
    pub employee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// PIN availability query (`GET /api/employees?pin=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinQuery {
    pub pin: Option<String>,
}

/// PIN availability response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinAvailability {
    pub available: bool,
}
