//! # Notifier
//!
//! Post-commit fan-out for a successful match: one broadcast on the live
//! channel, one mail to each owner. Strictly best-effort: by the time
//! this runs the match is already durable, so every failure here is
//! logged and swallowed, never surfaced, never rolled back.

use std::sync::Arc;

use lf_core::{LiveChannel, Mailer, MatchEvent, MatchParty, User, UserRepo};

/// Topic the live channel carries match events on.
pub const MATCH_TOPIC: &str = "match";

#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn LiveChannel>,
    mailer: Arc<dyn Mailer>,
    users: Arc<dyn UserRepo>,
}

impl Notifier {
    pub fn new(
        channel: Arc<dyn LiveChannel>,
        mailer: Arc<dyn Mailer>,
        users: Arc<dyn UserRepo>,
    ) -> Self {
        Self {
            channel,
            mailer,
            users,
        }
    }

    /// Announces a committed match. Infallible by contract.
    pub async fn announce(&self, event: &MatchEvent) {
        match serde_json::to_value(event) {
            Ok(payload) => self.channel.publish(MATCH_TOPIC, payload),
            Err(err) => log::warn!("match event not publishable: {err}"),
        }

        self.mail_party(&event.item, &event.partner, event.similarity_percent)
            .await;
        self.mail_party(&event.partner, &event.item, event.similarity_percent)
            .await;
    }

    /// Mails one side of the pair the other side's contact details so the
    /// two users can coordinate the handoff.
    async fn mail_party(&self, recipient: &MatchParty, other: &MatchParty, percent: f64) {
        let Some(to) = self.resolve(recipient.owner_id).await else {
            return;
        };
        let Some(counterpart) = self.resolve(other.owner_id).await else {
            return;
        };

        let subject = format!("Possible match for \"{}\"", recipient.title);
        let body = format!(
            "Good news {}: your report \"{}\" was paired with \"{}\" at {:.2}% visual similarity.\n\
             Contact {} ({}) to arrange the handoff.",
            to.name, recipient.title, other.title, percent, counterpart.name, counterpart.email,
        );

        if let Err(err) = self.mailer.send(&to.email, &subject, &body).await {
            log::warn!("match mail to {} not delivered: {err:#}", to.email);
        }
    }

    async fn resolve(&self, owner_id: uuid::Uuid) -> Option<User> {
        match self.users.get_user(owner_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                log::warn!("match mail skipped: owner {owner_id} unknown");
                None
            }
            Err(err) => {
                log::warn!("match mail skipped, user lookup failed: {err:#}");
                None
            }
        }
    }
}
