//! # lf-mail-sendgrid
//!
//! `Mailer` implementation over the SendGrid v3 HTTP API, plus a
//! `DisabledMailer` for deployments without an API key. Delivery is
//! best-effort by contract: callers log failures and move on.

use async_trait::async_trait;
use lf_core::traits::Mailer;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("sendgrid rejected mail to {to}: {status} {detail}");
        }
        log::debug!("mail to {to} accepted by sendgrid");
        Ok(())
    }
}

/// Accepts and drops every message. Used when no SENDGRID_API_KEY is
/// configured so the rest of the notification path still runs.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        log::debug!("mail delivery disabled, dropping message to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_accepts_everything() {
        let mailer = DisabledMailer;
        assert!(mailer.send("a@example.edu", "s", "b").await.is_ok());
    }
}
