//! In-memory port implementations and synthetic images shared by the
//! matcher, notifier, and scorer tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use lf_core::{BlobStore, Item, ItemRepo, ItemStatus, LiveChannel, Mailer, User, UserRepo};
use uuid::Uuid;

fn encode_png(buf: GrayImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageLuma8(buf)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .expect("png encode");
    out
}

/// 64x64 checkerboard; `phase` 0 or 1 inverts it.
pub fn checkerboard_png(phase: u32) -> Vec<u8> {
    encode_png(GrayImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8 + phase) % 2 == 0 {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    }))
}

/// Diagonal gradient at the given edge length.
pub fn gradient_png(size: u32) -> Vec<u8> {
    encode_png(GrayImage::from_fn(size, size, |x, y| {
        Luma([(((x + y) * 255) / (2 * size - 2)) as u8])
    }))
}

/// Uniform image of one luminance value.
pub fn solid_png(value: u8) -> Vec<u8> {
    encode_png(GrayImage::from_fn(64, 64, |_, _| Luma([value])))
}

pub fn new_item(status: ItemStatus, owner_id: Uuid, image_ref: &str) -> Item {
    Item {
        id: Uuid::now_v7(),
        title: format!("{} item", status.as_str()),
        description: String::new(),
        status,
        owner_id,
        image_ref: image_ref.to_string(),
        matched: false,
        created_at: Utc::now(),
    }
}

/// Mutex-backed ItemRepo with the same compare-and-swap discipline the
/// SQLite adapter provides.
#[derive(Default)]
pub struct MemItems {
    items: Mutex<Vec<Item>>,
}

impl MemItems {
    pub fn snapshot(&self, id: Uuid) -> Option<Item> {
        self.items.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }
}

#[async_trait]
impl ItemRepo for MemItems {
    async fn create_item(&self, item: Item) -> anyhow::Result<()> {
        self.items.lock().unwrap().push(item);
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<Item>> {
        Ok(self.snapshot(id))
    }

    async fn list_items(&self) -> anyhow::Result<Vec<Item>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn list_unmatched(&self, status: ItemStatus) -> anyhow::Result<Vec<Item>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.status == status && !i.matched)
            .cloned()
            .collect())
    }

    async fn commit_match(&self, a: Uuid, b: Uuid) -> anyhow::Result<bool> {
        let mut items = self.items.lock().unwrap();
        let eligible = |id: Uuid| items.iter().any(|i| i.id == id && !i.matched);
        if !eligible(a) || !eligible(b) {
            return Ok(false);
        }
        for item in items.iter_mut() {
            if item.id == a || item.id == b {
                item.matched = true;
            }
        }
        Ok(true)
    }
}

/// BlobStore over a HashMap; refs that are absent fail to load, which the
/// scan must tolerate.
#[derive(Default)]
pub struct MemBlobs {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemBlobs {
    pub fn insert(&self, blob_ref: &str, data: Vec<u8>) {
        self.blobs.lock().unwrap().insert(blob_ref.to_string(), data);
    }
}

#[async_trait]
impl BlobStore for MemBlobs {
    async fn save(&self, data: Vec<u8>) -> anyhow::Result<String> {
        let blob_ref = format!("blob-{}", self.blobs.lock().unwrap().len());
        self.insert(&blob_ref, data);
        Ok(blob_ref)
    }

    async fn load(&self, blob_ref: &str) -> anyhow::Result<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(blob_ref)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no blob {blob_ref}"))
    }

    fn url_for(&self, blob_ref: &str) -> String {
        format!("/static/uploads/{blob_ref}")
    }
}

#[derive(Default)]
pub struct MemUsers {
    users: Mutex<Vec<User>>,
}

pub fn new_user(name: &str, email: &str) -> User {
    User {
        id: Uuid::now_v7(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$test".to_string(),
    }
}

#[async_trait]
impl UserRepo for MemUsers {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        self.users.lock().unwrap().push(user);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

/// Records every send; optionally fails them all.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unreachable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Captures published payloads instead of broadcasting them.
#[derive(Default)]
pub struct RecordingChannel {
    pub published: Mutex<Vec<(String, serde_json::Value)>>,
}

impl LiveChannel for RecordingChannel {
    fn publish(&self, topic: &str, payload: serde_json::Value) {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload));
    }
}
