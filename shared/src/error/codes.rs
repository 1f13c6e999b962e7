//! Error codes for the Nova onboarding service
//!
//! Codes are shared with the registration form, which reads `code` to decide
//! which field an error belongs to:
//! - 0xxx: General errors
//! - 6xxx: Media errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use std::fmt;

/// Unified error code enum
///
/// Sent as a bare u16 in [`ErrorResponse::code`](super::ErrorResponse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Too many requests from the same client
    TooManyRequests = 9,

    // ==================== 65xx: Media ====================
    /// File exceeds the upload limit
    FileTooLarge = 6501,
    /// File format is not accepted
    UnsupportedFileFormat = 6502,
    /// File content is not a decodable image
    InvalidImageFile = 6503,
    /// Empty file provided
    EmptyFile = 6505,

    // ==================== 8xxx: Employee ====================
    /// PIN does not have the expected shape
    PinInvalid = 8010,
    /// PIN and its confirmation differ
    PinMismatch = 8011,
    /// PIN is already assigned to an active employee
    PinAlreadyUsed = 8012,

    // ==================== 9xxx: System ====================
    /// Upstream service (record store, media host) failed
    UpstreamError = 9002,
    /// Upstream service did not answer in time
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the user-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Certains champs sont invalides",
            ErrorCode::NotFound => "Ressource introuvable",
            ErrorCode::InvalidRequest => "Requête invalide",
            ErrorCode::InvalidFormat => "Format invalide",
            ErrorCode::RequiredField => "Tous les champs sont requis",
            ErrorCode::TooManyRequests => "Trop de requêtes, réessayez plus tard",

            // Media
            ErrorCode::FileTooLarge => "La photo est trop volumineuse",
            ErrorCode::UnsupportedFileFormat => "Format de photo non supporté",
            ErrorCode::InvalidImageFile => "La photo n'est pas une image valide",
            ErrorCode::EmptyFile => "La photo est vide",

            // Employee
            ErrorCode::PinInvalid => "Le PIN doit contenir entre 4 et 6 chiffres",
            ErrorCode::PinMismatch => "Les codes PIN ne correspondent pas",
            ErrorCode::PinAlreadyUsed => {
                "Ce code PIN est déjà utilisé. Veuillez en choisir un autre."
            }

            // System
            ErrorCode::UpstreamError => "Service temporairement indisponible",
            ErrorCode::TimeoutError => "Le service n'a pas répondu à temps",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
