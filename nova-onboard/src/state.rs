//! Application state

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::email::Notifier;
use crate::media::CloudinaryHost;
use crate::rate_limit::RateLimiter;
use crate::registration::{Registrar, RegistrarSettings};
use crate::store::{AirtableStore, EmployeeStore, MemoryStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registration flow and its collaborators
    pub registrar: Arc<Registrar>,
    /// Rate limiter for the employee routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(registrar: Arc<Registrar>) -> Self {
        Self {
            registrar,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// Build the store, media host and registrar from configuration
    ///
    /// `notifier` is the sending half of an already running notification
    /// worker; confirmation emails are disabled without one.
    pub fn from_config(config: &Config, notifier: Option<Notifier>) -> Result<Self, BoxError> {
        let store: Arc<dyn EmployeeStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store, registrations are lost on restart");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Airtable => {
                let airtable = config
                    .airtable
                    .as_ref()
                    .ok_or("Airtable backend selected without Airtable settings")?;
                tracing::info!(base = %airtable.base_id, table = %airtable.table, "Using Airtable store");
                Arc::new(AirtableStore::new(airtable, config.http_client_timeout)?)
            }
        };

        let mut registrar = Registrar::new(store, RegistrarSettings::from_config(config));

        match &config.cloudinary {
            Some(cloudinary) => {
                registrar = registrar.with_media(Arc::new(CloudinaryHost::new(
                    cloudinary,
                    config.http_client_timeout,
                )?));
            }
            None => tracing::info!("Photo upload disabled (Cloudinary not configured)"),
        }

        if let Some(notifier) = notifier {
            registrar = registrar.with_notifier(notifier);
        }

        Ok(Self::new(Arc::new(registrar)))
    }
}
