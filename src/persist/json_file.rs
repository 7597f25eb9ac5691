//! Implements the `Backend` trait with buckets stored in a single JSON
//! document on disk. This is the store the CLI mirrors to when mirroring is
//! enabled in the configuration.

use crate::error::{Error, Result};
use crate::model::EntryId;
use crate::persist::{Backend, BucketId, BucketRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A `Backend` over a JSON file of per-day buckets.
///
/// The whole document is read and rewritten on each call; bucket counts here
/// are a handful of entries per day, so simplicity wins over incremental IO.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the file.
    lock: Mutex<()>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct Store {
    buckets: Vec<StoredBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct StoredBucket {
    id: BucketId,
    key: String,
    items: Vec<BucketRecord>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Store> {
        if !self.path.exists() {
            return Ok(Store::default());
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Backend(format!("unable to read {}: {e}", self.path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Backend(format!("unable to parse {}: {e}", self.path.display())))
    }

    async fn save(&self, store: &Store) -> Result<()> {
        let json = serde_json::to_string_pretty(store)
            .map_err(|e| Error::Backend(format!("unable to serialize bucket store: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| Error::Backend(format!("unable to write {}: {e}", self.path.display())))
    }
}

#[async_trait::async_trait]
impl Backend for JsonFileBackend {
    async fn ensure_bucket(&self, key: &str) -> Result<BucketId> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        if let Some(bucket) = store.buckets.iter().find(|b| b.key == key) {
            return Ok(bucket.id.clone());
        }
        let id = BucketId::new(Uuid::new_v4().to_string());
        store.buckets.push(StoredBucket {
            id: id.clone(),
            key: key.to_string(),
            items: Vec::new(),
        });
        self.save(&store).await?;
        Ok(id)
    }

    async fn push_item(&self, bucket: &BucketId, record: &BucketRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let found = store
            .buckets
            .iter_mut()
            .find(|b| &b.id == bucket)
            .ok_or_else(|| Error::Backend(format!("no bucket with id {bucket}")))?;
        found.items.push(record.clone());
        self.save(&store).await
    }

    async fn remove_item(&self, bucket: &BucketId, entry_id: EntryId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let found = store
            .buckets
            .iter_mut()
            .find(|b| &b.id == bucket)
            .ok_or_else(|| Error::Backend(format!("no bucket with id {bucket}")))?;
        found.items.retain(|item| item.item_id != entry_id.value());
        self.save(&store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: u64) -> BucketRecord {
        BucketRecord {
            item_id: id,
            product: format!("P{id}"),
            cost: "2.40".to_string(),
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("buckets.json");

        let backend = JsonFileBackend::new(&path);
        let bucket = backend.ensure_bucket("30-08-2026").await.unwrap();
        backend.push_item(&bucket, &record(1)).await.unwrap();
        backend.push_item(&bucket, &record(2)).await.unwrap();
        backend.remove_item(&bucket, EntryId::new(2)).await.unwrap();

        // A fresh backend over the same file sees the persisted state.
        let reopened = JsonFileBackend::new(&path);
        let again = reopened.ensure_bucket("30-08-2026").await.unwrap();
        assert_eq!(again, bucket);
        let store = reopened.load().await.unwrap();
        assert_eq!(store.buckets.len(), 1);
        assert_eq!(store.buckets[0].items, vec![record(1)]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("absent.json"));
        let store = backend.load().await.unwrap();
        assert!(store.buckets.is_empty());
    }

    #[tokio::test]
    async fn test_push_to_unknown_bucket_fails() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("buckets.json"));
        let err = backend
            .push_item(&BucketId::new("nope"), &record(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no bucket"));
    }
}
