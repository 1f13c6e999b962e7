//! Registration orchestrator

use chrono::Datelike;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::models::NewEmployee;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::validator::{self, FieldErrors, ValidationRules, Violation, non_blank};
use super::{
    Clock, MatriculeAllocator, RegistrationError, RegistrationOutcome, RegistrationRequest, Stage,
    SystemClock,
};
use crate::config::Config;
use crate::email::{Notification, Notifier, templates};
use crate::media::{MediaHost, NormalizedPhoto, normalize_photo};
use crate::store::{EmployeeStore, StoreError};

/// Tunables of the registration flow
#[derive(Debug, Clone)]
pub struct RegistrarSettings {
    pub rules: ValidationRules,
    pub matricule_prefix: String,
    pub issue_qr_id: bool,
    pub lookup_timeout: Duration,
}

impl Default for RegistrarSettings {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            matricule_prefix: "NOV".into(),
            issue_qr_id: true,
            lookup_timeout: Duration::from_secs(5),
        }
    }
}

impl RegistrarSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rules: ValidationRules {
                require_contact: config.require_contact,
            },
            matricule_prefix: config.matricule_prefix.clone(),
            issue_qr_id: config.issue_qr_id,
            lookup_timeout: config.pin_lookup_timeout,
        }
    }
}

pub struct Registrar {
    store: Arc<dyn EmployeeStore>,
    media: Option<Arc<dyn MediaHost>>,
    notifier: Option<Notifier>,
    allocator: MatriculeAllocator,
    settings: RegistrarSettings,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl Registrar {
    pub fn new(store: Arc<dyn EmployeeStore>, settings: RegistrarSettings) -> Self {
        Self {
            store,
            media: None,
            notifier: None,
            allocator: MatriculeAllocator::new(settings.matricule_prefix.clone()),
            settings,
            clock: Arc::new(SystemClock),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_media(mut self, media: Arc<dyn MediaHost>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Run a registration end to end
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let RegistrationRequest { payload, photo } = request;
        let today = self.clock.today();

        validator::validate(&payload, &self.settings.rules, today)
            .map_err(RegistrationError::Validation)?;

        // Decoding is local, so a bad image is rejected before any store call
        let photo = match (photo, &self.media) {
            (Some(upload), Some(_)) => Some(normalize_photo(&upload).map_err(|rejection| {
                RegistrationError::Validation(FieldErrors::single(
                    "photo",
                    Violation::Photo(rejection.code()),
                    rejection.to_string(),
                ))
            })?),
            (Some(_), None) => {
                tracing::warn!("Photo received but no media host is configured, ignoring it");
                None
            }
            (None, _) => None,
        };

        if self.pin_taken(&payload.pin).await? {
            tracing::info!("Registration rejected: PIN already in use");
            return Err(RegistrationError::Conflict);
        }

        let (matricule, qr_id) = self.allocate(&payload.nom, &payload.prenom, today.year());

        let photo_url = match photo {
            Some(photo) => self.upload_photo(&photo, &matricule).await,
            None => None,
        };

        let employee = NewEmployee {
            matricule,
            qr_id,
            pin: payload.pin,
            nom: payload.nom.trim().to_string(),
            prenom: payload.prenom.trim().to_string(),
            poste: payload.poste.trim().to_string(),
            date_naissance: payload.date_naissance.trim().to_string(),
            date_inscription: today.format("%Y-%m-%d").to_string(),
            actif: true,
            email: non_blank(&payload.email).map(String::from),
            telephone: non_blank(&payload.telephone).map(String::from),
            photo_url,
        };

        let record = self.store.create(employee).await.map_err(|e| match e {
            StoreError::DuplicatePin => RegistrationError::Conflict,
            source => RegistrationError::Dependency {
                stage: Stage::Persist,
                source,
            },
        })?;

        tracing::info!(
            matricule = %record.employee.matricule,
            employee_id = %record.id,
            store = self.store.name(),
            "Employee registered"
        );

        if let Some(notifier) = &self.notifier
            && let Some(email) = templates::registration_confirmation(&record)
        {
            notifier.enqueue(Notification {
                matricule: record.employee.matricule.clone(),
                email,
            });
        }

        Ok(RegistrationOutcome { record })
    }

    /// Whether `pin` is free for a new registration
    pub async fn check_pin_available(&self, pin: &str) -> Result<bool, RegistrationError> {
        validator::validate_pin(pin).map_err(RegistrationError::Validation)?;
        Ok(!self.pin_taken(pin).await?)
    }

    async fn pin_taken(&self, pin: &str) -> Result<bool, RegistrationError> {
        let timeout = self.settings.lookup_timeout;
        let lookup = tokio::time::timeout(timeout, self.store.find_active_by_pin(pin)).await;
        let source = match lookup {
            Ok(Ok(found)) => return Ok(found.is_some()),
            Ok(Err(e)) => e,
            Err(_) => StoreError::Timeout(timeout),
        };
        Err(RegistrationError::Dependency {
            stage: Stage::PinLookup,
            source,
        })
    }

    fn allocate(&self, nom: &str, prenom: &str, year: i32) -> (String, Option<String>) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let matricule = self.allocator.allocate_with(nom, prenom, year, &mut *rng);
        let qr_id = self
            .settings
            .issue_qr_id
            .then(|| self.allocator.qr_code(&mut *rng));
        (matricule, qr_id)
    }

    /// Upload failures are logged and the employee is registered without a photo
    async fn upload_photo(&self, photo: &NormalizedPhoto, matricule: &str) -> Option<String> {
        let media = self.media.as_ref()?;
        let public_id = format!(
            "{matricule}-{}",
            photo.hash.get(..12).unwrap_or(&photo.hash)
        );
        match media.upload(photo, &public_id).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(matricule, error = %e, "Photo upload failed, registering without photo");
                None
            }
        }
    }
}
