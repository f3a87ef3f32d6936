//! # lf-storage-local
//!
//! Local filesystem implementation of `BlobStore`.
//! Features: content-addressable storage and directory sharding, so the
//! same photo uploaded twice occupies one file and refs carry no
//! client-controlled filename.

use async_trait::async_trait;
use lf_core::traits::BlobStore;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    /// Generates a sharded path: "ab/cd/abcdef...hash"
    fn sharded_path(&self, hash: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path
    }
}

/// Refs are SHA-256 hex strings and nothing else; anything that isn't
/// cannot address a file (this is the path-traversal guard).
fn valid_ref(blob_ref: &str) -> bool {
    blob_ref.len() == 64 && blob_ref.bytes().all(|b| b.is_ascii_hexdigit())
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    /// Saves an upload using its SHA-256 hash as the filename, which
    /// automatically deduplicates files.
    async fn save(&self, data: Vec<u8>) -> anyhow::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());

        let target = self.sharded_path(&hash);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        if fs::try_exists(&target).await? {
            return Ok(hash);
        }
        fs::write(&target, &data).await?;
        Ok(hash)
    }

    async fn load(&self, blob_ref: &str) -> anyhow::Result<Vec<u8>> {
        anyhow::ensure!(valid_ref(blob_ref), "invalid blob ref '{blob_ref}'");
        Ok(fs::read(self.sharded_path(blob_ref)).await?)
    }

    fn url_for(&self, blob_ref: &str) -> String {
        if blob_ref.len() < 4 {
            return format!("{}/{}", self.url_prefix, blob_ref);
        }
        format!(
            "{}/{}/{}/{}",
            self.url_prefix,
            &blob_ref[0..2],
            &blob_ref[2..4],
            blob_ref
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path().to_path_buf(), "/static/uploads".into())
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let blob_ref = store.save(b"photo bytes".to_vec()).await.unwrap();
        assert_eq!(blob_ref.len(), 64);
        assert_eq!(store.load(&blob_ref).await.unwrap(), b"photo bytes");
    }

    #[tokio::test]
    async fn identical_content_deduplicates_to_one_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let first = store.save(b"same".to_vec()).await.unwrap();
        let second = store.save(b"same".to_vec()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn hostile_refs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.load("../../etc/passwd").await.is_err());
        assert!(store.load("abcd").await.is_err());
    }

    #[tokio::test]
    async fn missing_blob_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let absent = "a".repeat(64);
        assert!(store.load(&absent).await.is_err());
    }

    #[test]
    fn public_url_uses_shard_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let blob_ref = "ab".to_string() + &"cd".repeat(31);
        assert!(store
            .url_for(&blob_ref)
            .starts_with("/static/uploads/ab/cd/"));
    }
}
