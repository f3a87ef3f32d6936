//! # Domain Models
//!
//! These structs represent the core entities of the lost-and-found service.
//! We use UUID v7 for time-ordered, globally unique identification, which
//! also keeps the candidate scan order stable (creation order).

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Which side of a report an item is on.
///
/// Fixed at creation; a lost report is only ever compared against found
/// reports and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Lost,
    Found,
}

impl ItemStatus {
    /// The complementary report type: candidates for a match always have
    /// the opposite status.
    pub fn opposite(self) -> ItemStatus {
        match self {
            ItemStatus::Lost => ItemStatus::Found,
            ItemStatus::Found => ItemStatus::Lost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Lost => "lost",
            ItemStatus::Found => "found",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemStatus::Lost),
            "found" => Ok(ItemStatus::Found),
            other => Err(crate::error::AppError::ValidationError(format!(
                "status must be 'lost' or 'found', got '{other}'"
            ))),
        }
    }
}

/// A single lost or found report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    /// The submitting user; self-matches are excluded by this field.
    pub owner_id: Uuid,
    /// Key of the image blob handled by the BlobStore
    pub image_ref: String,
    /// Starts false, flips to true exactly once, never reverts.
    pub matched: bool,
    pub created_at: DateTime<Utc>,
}

/// A registered user. Only the addressing mechanism the notifier needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; never serialized out, never compared in plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// One side of a committed match, as seen by the notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchParty {
    pub item_id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
}

impl MatchParty {
    pub fn from_item(item: &Item) -> Self {
        Self {
            item_id: item.id,
            title: item.title.clone(),
            owner_id: item.owner_id,
        }
    }
}

/// Ephemeral record of a successful match. Exists only for the duration
/// of the notification fan-out; nothing persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub item: MatchParty,
    pub partner: MatchParty,
    /// Raw similarity in [0, 1].
    pub score: f64,
    /// Display form: 0-100, rounded to two decimals.
    pub similarity_percent: f64,
}

impl MatchEvent {
    pub fn new(item: &Item, partner: &Item, score: f64) -> Self {
        Self {
            item: MatchParty::from_item(item),
            partner: MatchParty::from_item(partner),
            score,
            similarity_percent: (score * 10_000.0).round() / 100.0,
        }
    }
}
