//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary. The
//! matching core only ever sees these interfaces, never a concrete store,
//! mailer, or channel.

use async_trait::async_trait;
use crate::models::{Item, ItemStatus, User};
use uuid::Uuid;

/// Data persistence contract for items.
#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn create_item(&self, item: Item) -> anyhow::Result<()>;
    async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<Item>>;
    async fn list_items(&self) -> anyhow::Result<Vec<Item>>;

    /// The candidate scan: all items with the given status and
    /// `matched = false`, in creation order.
    async fn list_unmatched(&self, status: ItemStatus) -> anyhow::Result<Vec<Item>>;

    /// Atomically flips `matched` on both rows, or on neither.
    ///
    /// Returns `Ok(false)` when either row was already matched (a
    /// concurrent submission won the race); the caller must not treat
    /// that as an error.
    async fn commit_match(&self, a: Uuid, b: Uuid) -> anyhow::Result<bool>;
}

/// Data persistence contract for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

/// Blob storage contract for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Saves raw bytes and returns a blob ref for the Item model.
    async fn save(&self, data: Vec<u8>) -> anyhow::Result<String>;
    /// Fetches the stored bytes back for scoring.
    async fn load(&self, blob_ref: &str) -> anyhow::Result<Vec<u8>>;
    /// Public URL or path for serving the original.
    fn url_for(&self, blob_ref: &str) -> String;
}

/// Credential hashing contract.
pub trait AuthProvider: Send + Sync {
    /// Hashes a plaintext password into a storable PHC string.
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;
    /// Verifies a plaintext password against a stored hash.
    /// A malformed hash verifies false rather than erroring.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Live-update broadcast contract. Fire-and-forget: publishing to no
/// subscribers is fine, and delivery is never confirmed.
pub trait LiveChannel: Send + Sync {
    fn publish(&self, topic: &str, payload: serde_json::Value);
}

/// Outbound mail contract.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}
