//! Resend transactional email API (REST, no SDK)

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{MailError, Mailer, OutgoingEmail};
use crate::config::ResendConfig;

#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(config: &ResendConfig, from: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/emails", config.api_url.trim_end_matches('/')),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let body = SendRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport {
                transport: "resend",
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                transport: "resend",
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %email.to, "Confirmation email sent via Resend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn mailer(api_url: String) -> ResendMailer {
        let config = ResendConfig {
            api_key: "re_test".into(),
            api_url,
        };
        ResendMailer::new(&config, "Nova RH <rh@nova.ci>", Duration::from_secs(5)).unwrap()
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "jean@nova.ci".into(),
            subject: "Bienvenue".into(),
            html: "<p>ok</p>".into(),
        }
    }

    #[tokio::test]
    async fn posts_message_with_bearer_key() {
        let app = Router::new().route(
            "/emails",
            post(
                |headers: HeaderMap, axum::Json(body): axum::Json<serde_json::Value>| async move {
                    assert_eq!(headers["authorization"], "Bearer re_test");
                    assert_eq!(body["to"][0], "jean@nova.ci");
                    assert_eq!(body["from"], "Nova RH <rh@nova.ci>");
                    axum::Json(serde_json::json!({ "id": "email_1" }))
                },
            ),
        );
        let base = spawn(app).await;

        mailer(base).send(&email()).await.unwrap();
    }

    #[tokio::test]
    async fn rejection_carries_status() {
        let app = Router::new().route(
            "/emails",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid from") }),
        );
        let base = spawn(app).await;

        let err = mailer(base).send(&email()).await.unwrap_err();
        assert!(matches!(err, MailError::Rejected { status: 422, .. }));
    }
}
