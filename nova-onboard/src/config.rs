//! Onboarding server configuration
//!
//! Built once at startup from the process environment (after `.env` is
//! loaded) and handed to the collaborators that need it.

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// Which record store backs the registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Airtable table over its REST API
    Airtable,
    /// In-process store (development and tests only)
    Memory,
}

/// Airtable connection settings
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub table: String,
    pub api_url: String,
}

/// Cloudinary unsigned-upload settings
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: Option<String>,
    pub api_url: String,
}

/// Resend API settings
#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub api_url: String,
}

/// SMTP relay settings (fallback mail transport)
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Onboarding server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP listen port
    pub http_port: u16,
    pub store_backend: StoreBackend,
    /// Present when `store_backend` is Airtable
    pub airtable: Option<AirtableConfig>,
    /// Photo upload is disabled when absent
    pub cloudinary: Option<CloudinaryConfig>,
    pub resend: Option<ResendConfig>,
    pub smtp: Option<SmtpConfig>,
    /// Sender address for confirmation emails
    pub mail_from: String,
    /// Organization prefix of generated matricules
    pub matricule_prefix: String,
    /// Also issue a separate QR identifier per employee
    pub issue_qr_id: bool,
    /// Email and phone become mandatory
    pub require_contact: bool,
    /// Bound on the PIN uniqueness lookup (synchronous critical path)
    pub pin_lookup_timeout: Duration,
    /// Request timeout for every outbound HTTP client
    pub http_client_timeout: Duration,
    /// Capacity of the confirmation email queue
    pub notify_queue_capacity: usize,
    /// Allowed CORS origin for the registration form; any origin when absent
    /// (development only)
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_dev = environment == "development";

        let airtable_key = get("AIRTABLE_API_KEY");
        let store_backend = match get("STORE_BACKEND").as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("airtable") => StoreBackend::Airtable,
            Some(other) => return Err(format!("Unknown STORE_BACKEND: {other}").into()),
            None if airtable_key.is_none() && is_dev => StoreBackend::Memory,
            None => StoreBackend::Airtable,
        };
        if store_backend == StoreBackend::Memory && !is_dev {
            return Err(format!("STORE_BACKEND=memory is not allowed in {environment}").into());
        }

        let airtable = match store_backend {
            StoreBackend::Memory => None,
            StoreBackend::Airtable => Some(AirtableConfig {
                api_key: airtable_key.ok_or("AIRTABLE_API_KEY must be set")?,
                base_id: get("AIRTABLE_BASE_ID").ok_or("AIRTABLE_BASE_ID must be set")?,
                table: get("AIRTABLE_TABLE").unwrap_or_else(|| "Employees".into()),
                api_url: get("AIRTABLE_API_URL")
                    .unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.into()),
            }),
        };

        let cloudinary = match (get("CLOUDINARY_CLOUD_NAME"), get("CLOUDINARY_UPLOAD_PRESET")) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig {
                cloud_name,
                upload_preset,
                folder: get("CLOUDINARY_FOLDER"),
                api_url: get("CLOUDINARY_API_URL")
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_URL.into()),
            }),
            (None, None) => None,
            _ => {
                return Err(
                    "CLOUDINARY_CLOUD_NAME and CLOUDINARY_UPLOAD_PRESET must be set together".into(),
                );
            }
        };

        let resend = get("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            api_url: get("RESEND_API_URL").unwrap_or_else(|| DEFAULT_RESEND_API_URL.into()),
        });

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", 587)?,
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
            }),
            None => None,
        };

        let cors_allowed_origin = get("CORS_ALLOWED_ORIGIN");
        if cors_allowed_origin.is_none() && !is_dev {
            return Err(format!("CORS_ALLOWED_ORIGIN must be set in {environment}").into());
        }

        Ok(Self {
            environment,
            http_port: parse_or(get("HTTP_PORT"), "HTTP_PORT", 3000)?,
            store_backend,
            airtable,
            cloudinary,
            resend,
            smtp,
            mail_from: get("MAIL_FROM").unwrap_or_else(|| "Nova RH <rh@nova.ci>".into()),
            matricule_prefix: get("MATRICULE_PREFIX").unwrap_or_else(|| "NOV".into()),
            issue_qr_id: parse_or(get("ISSUE_QR_ID"), "ISSUE_QR_ID", true)?,
            require_contact: parse_or(get("REQUIRE_CONTACT"), "REQUIRE_CONTACT", false)?,
            pin_lookup_timeout: Duration::from_secs(parse_or(
                get("PIN_LOOKUP_TIMEOUT_SECS"),
                "PIN_LOOKUP_TIMEOUT_SECS",
                5,
            )?),
            http_client_timeout: Duration::from_secs(parse_or(
                get("HTTP_CLIENT_TIMEOUT_SECS"),
                "HTTP_CLIENT_TIMEOUT_SECS",
                15,
            )?),
            notify_queue_capacity: parse_or(
                get("NOTIFY_QUEUE_CAPACITY"),
                "NOTIFY_QUEUE_CAPACITY",
                256,
            )?,
            cors_allowed_origin,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> Result<T, BoxError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
        None => Ok(default),
    }
}
