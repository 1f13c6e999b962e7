//! Background notification queue
//!
//! Registrations enqueue without waiting; a single worker delivers through
//! the mailer. On shutdown the worker drains what is already queued.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Mailer, OutgoingEmail};

/// A queued confirmation email
#[derive(Debug, Clone)]
pub struct Notification {
    /// Matricule of the employee, for logs
    pub matricule: String,
    pub email: OutgoingEmail,
}

/// Sending half of the queue, cloned into the request path
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue without waiting; returns false when the message was dropped
    pub fn enqueue(&self, notification: Notification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(TrySendError::Full(n)) => {
                tracing::warn!(matricule = %n.matricule, "Notification queue full, confirmation email dropped");
                false
            }
            Err(TrySendError::Closed(n)) => {
                tracing::warn!(matricule = %n.matricule, "Notification queue closed, confirmation email dropped");
                false
            }
        }
    }
}

pub struct NotificationWorker {
    rx: mpsc::Receiver<Notification>,
    mailer: Arc<dyn Mailer>,
    shutdown: CancellationToken,
}

impl NotificationWorker {
    pub fn new(
        rx: mpsc::Receiver<Notification>,
        mailer: Arc<dyn Mailer>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            rx,
            mailer,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("NotificationWorker started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("NotificationWorker shutting down");
                    self.drain().await;
                    break;
                }

                msg = self.rx.recv() => match msg {
                    Some(notification) => self.deliver(notification).await,
                    None => break,
                },
            }
        }

        tracing::info!("NotificationWorker stopped");
    }

    /// Deliver everything still queued, refusing new messages
    async fn drain(&mut self) {
        self.rx.close();
        let mut drained = 0usize;
        while let Some(notification) = self.rx.recv().await {
            self.deliver(notification).await;
            drained += 1;
        }
        if drained > 0 {
            tracing::info!(drained, "Notification queue drained");
        }
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(e) = self.mailer.send(&notification.email).await {
            tracing::warn!(
                matricule = %notification.matricule,
                error = %e,
                "Confirmation email not delivered"
            );
        }
    }
}

/// Create the queue and spawn its worker
pub fn spawn_notification_worker(
    mailer: Arc<dyn Mailer>,
    capacity: usize,
    shutdown: CancellationToken,
) -> (Notifier, JoinHandle<()>) {
    let (notifier, rx) = Notifier::channel(capacity);
    let handle = tokio::spawn(NotificationWorker::new(rx, mailer, shutdown).run());
    (notifier, handle)
}
