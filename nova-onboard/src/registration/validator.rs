//! Registration form validation
//!
//! Pure checks on the submitted fields. Runs on every submission even though
//! the form performs the same checks while the user types.

use chrono::NaiveDate;
use regex::Regex;
use shared::error::ErrorCode;
use shared::models::RegistrationPayload;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static PIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,6}$").expect("PIN pattern compiles"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]{6,20}$").expect("phone pattern compiles"));

/// Which rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Required,
    PinFormat,
    PinMismatch,
    InvalidFormat,
    /// Photo rejected before upload; carries the media error code
    Photo(ErrorCode),
}

impl Violation {
    pub fn code(&self) -> ErrorCode {
        match self {
            Violation::Required => ErrorCode::RequiredField,
            Violation::PinFormat => ErrorCode::PinInvalid,
            Violation::PinMismatch => ErrorCode::PinMismatch,
            Violation::InvalidFormat => ErrorCode::InvalidFormat,
            Violation::Photo(code) => *code,
        }
    }

    // Lower ranks win when picking the error reported at the top level
    fn rank(&self) -> u8 {
        match self {
            Violation::PinFormat => 0,
            Violation::Required => 1,
            Violation::PinMismatch => 2,
            Violation::InvalidFormat => 3,
            Violation::Photo(_) => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub violation: Violation,
    pub message: String,
}

/// Field name (as sent by the form) → error, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first error recorded for a field is kept
    pub fn add(&mut self, field: &'static str, violation: Violation, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| FieldError {
            violation,
            message: message.into(),
        });
    }

    pub fn single(field: &'static str, violation: Violation, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, violation, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// The error reported as the top-level message
    pub fn primary(&self) -> Option<(&'static str, &FieldError)> {
        self.iter().min_by_key(|(_, e)| e.violation.rank())
    }

    /// `{field: message}` for the response body
    pub fn to_json(&self) -> serde_json::Value {
        self.iter()
            .map(|(field, e)| (field.to_string(), serde_json::Value::from(e.message.clone())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Validation switches taken from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationRules {
    /// Email and phone are mandatory
    pub require_contact: bool,
}

pub fn is_valid_pin(pin: &str) -> bool {
    PIN_RE.is_match(pin)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= 6
}

/// Shape check for a lone PIN (availability endpoint)
pub fn validate_pin(pin: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_pin(pin, &mut errors);
    errors.into_result()
}

fn check_pin(pin: &str, errors: &mut FieldErrors) {
    // Whitespace is content here: "    " is a malformed PIN, not a missing one
    if pin.is_empty() {
        errors.add("pin", Violation::Required, "Le code PIN est requis");
    } else if !is_valid_pin(pin) {
        errors.add(
            "pin",
            Violation::PinFormat,
            "Le PIN doit contenir entre 4 et 6 chiffres",
        );
    }
}

/// Validate a registration form
///
/// `today` bounds the birth date; it is passed in so validation stays
/// deterministic.
pub fn validate(
    form: &RegistrationPayload,
    rules: &ValidationRules,
    today: NaiveDate,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    require(&mut errors, "nom", &form.nom, "Le nom est requis");
    require(&mut errors, "prenom", &form.prenom, "Le prénom est requis");
    require(&mut errors, "poste", &form.poste, "Le poste est requis");

    let birth = form.date_naissance.trim();
    if birth.is_empty() {
        errors.add(
            "dateNaissance",
            Violation::Required,
            "La date de naissance est requise",
        );
    } else {
        match NaiveDate::parse_from_str(birth, "%Y-%m-%d") {
            Ok(date) if date > today => errors.add(
                "dateNaissance",
                Violation::InvalidFormat,
                "La date de naissance ne peut pas être dans le futur",
            ),
            Ok(_) => {}
            Err(_) => errors.add(
                "dateNaissance",
                Violation::InvalidFormat,
                "La date de naissance est invalide",
            ),
        }
    }

    check_pin(&form.pin, &mut errors);

    if form.confirm_pin.is_empty() {
        errors.add(
            "confirmPin",
            Violation::Required,
            "La confirmation du PIN est requise",
        );
    } else if form.pin != form.confirm_pin {
        errors.add(
            "confirmPin",
            Violation::PinMismatch,
            "Les codes PIN ne correspondent pas",
        );
    }

    match non_blank(&form.email) {
        Some(email) if !is_valid_email(email) => {
            errors.add("email", Violation::InvalidFormat, "L'adresse email est invalide")
        }
        Some(_) => {}
        None if rules.require_contact => {
            errors.add("email", Violation::Required, "L'adresse email est requise")
        }
        None => {}
    }

    match non_blank(&form.telephone) {
        Some(phone) if !is_valid_phone(phone) => errors.add(
            "telephone",
            Violation::InvalidFormat,
            "Le numéro de téléphone est invalide",
        ),
        Some(_) => {}
        None if rules.require_contact => errors.add(
            "telephone",
            Violation::Required,
            "Le numéro de téléphone est requis",
        ),
        None => {}
    }

    errors.into_result()
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, Violation::Required, message);
    }
}

/// Trimmed value, or None when absent or blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
