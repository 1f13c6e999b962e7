//! Confirmation email delivery
//!
//! Transports implement [`Mailer`]; [`MailerChain`] tries them in order and
//! stops at the first one that accepts the message. Delivery runs off the
//! request path on the notification queue.

mod queue;
mod resend;
mod smtp;
pub mod templates;

pub use queue::{Notification, NotificationWorker, Notifier, spawn_notification_worker};
pub use resend::ResendMailer;
pub use smtp::SmtpMailer;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("{transport} transport failed: {reason}")]
    Transport {
        transport: &'static str,
        reason: String,
    },
    #[error("{transport} rejected the message with status {status}: {body}")]
    Rejected {
        transport: &'static str,
        status: u16,
        body: String,
    },
    #[error("no mail transport configured")]
    NoTransport,
    #[error("every mail transport failed: {0}")]
    AllFailed(String),
}

/// Mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Ordered fallback over several transports
#[derive(Clone, Default)]
pub struct MailerChain {
    transports: Vec<Arc<dyn Mailer>>,
}

impl MailerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.transports.push(mailer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Resend first, then SMTP, as configured
    pub fn from_config(config: &Config) -> Result<Self, BoxError> {
        let mut chain = Self::new();
        if let Some(resend) = &config.resend {
            chain = chain.with(Arc::new(ResendMailer::new(
                resend,
                &config.mail_from,
                config.http_client_timeout,
            )?));
        }
        if let Some(smtp) = &config.smtp {
            chain = chain.with(Arc::new(SmtpMailer::new(
                smtp,
                &config.mail_from,
                config.http_client_timeout,
            )?));
        }
        Ok(chain)
    }
}

#[async_trait]
impl Mailer for MailerChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.transports.is_empty() {
            return Err(MailError::NoTransport);
        }

        let mut failures = Vec::with_capacity(self.transports.len());
        for mailer in &self.transports {
            match mailer.send(email).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(transport = mailer.name(), error = %e, "Mail transport failed, trying next");
                    failures.push(e.to_string());
                }
            }
        }
        Err(MailError::AllFailed(failures.join("; ")))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records sent emails; fails every send when `fail` is set
    #[derive(Default)]
    pub struct RecordingMailer {
        pub fail: bool,
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                return Err(MailError::Transport {
                    transport: "recording",
                    reason: "down".into(),
                });
            }
            Ok(())
        }
    }
}
