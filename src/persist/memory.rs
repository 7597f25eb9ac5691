//! Implements the `Backend` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so
//! that the whole app can run, top-to-bottom, without an external store.

use crate::error::{Error, Result};
use crate::model::EntryId;
use crate::persist::{Backend, BucketId, BucketRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// An implementation of the `Backend` trait that keeps its buckets in
/// memory. Bucket ids are random and opaque, like a real store's would be.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    buckets: Mutex<HashMap<String, Bucket>>,
    /// When set, every call fails. Used to exercise the best-effort
    /// mirroring semantics.
    failing: AtomicBool,
}

#[derive(Debug, Clone)]
struct Bucket {
    id: BucketId,
    items: Vec<BucketRecord>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The number of buckets currently held.
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().unwrap().len()
    }

    /// The items of the bucket for `key`, empty if the bucket is absent.
    pub fn items(&self, key: &str) -> Vec<BucketRecord> {
        self.buckets
            .lock()
            .unwrap()
            .get(key)
            .map(|b| b.items.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Backend("memory backend set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn ensure_bucket(&self, key: &str) -> Result<BucketId> {
        self.check()?;
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            id: BucketId::new(Uuid::new_v4().to_string()),
            items: Vec::new(),
        });
        Ok(bucket.id.clone())
    }

    async fn push_item(&self, bucket: &BucketId, record: &BucketRecord) -> Result<()> {
        self.check()?;
        let mut buckets = self.buckets.lock().unwrap();
        let found = buckets
            .values_mut()
            .find(|b| &b.id == bucket)
            .ok_or_else(|| Error::Backend(format!("no bucket with id {bucket}")))?;
        found.items.push(record.clone());
        Ok(())
    }

    async fn remove_item(&self, bucket: &BucketId, entry_id: EntryId) -> Result<()> {
        self.check()?;
        let mut buckets = self.buckets.lock().unwrap();
        let found = buckets
            .values_mut()
            .find(|b| &b.id == bucket)
            .ok_or_else(|| Error::Backend(format!("no bucket with id {bucket}")))?;
        found.items.retain(|item| item.item_id != entry_id.value());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> BucketRecord {
        BucketRecord {
            item_id: id,
            product: format!("P{id}"),
            cost: "1.00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_bucket_is_idempotent() {
        let backend = MemoryBackend::new();
        let a = backend.ensure_bucket("30-08-2026").await.unwrap();
        let b = backend.ensure_bucket("30-08-2026").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(backend.bucket_count(), 1);
    }

    #[tokio::test]
    async fn test_push_and_remove() {
        let backend = MemoryBackend::new();
        let bucket = backend.ensure_bucket("30-08-2026").await.unwrap();
        backend.push_item(&bucket, &record(1)).await.unwrap();
        backend.push_item(&bucket, &record(2)).await.unwrap();
        backend.remove_item(&bucket, EntryId::new(1)).await.unwrap();
        let items = backend.items("30-08-2026");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, 2);
    }

    #[tokio::test]
    async fn test_unknown_bucket_is_an_error() {
        let backend = MemoryBackend::new();
        let bogus = BucketId::new("nope");
        assert!(backend.push_item(&bogus, &record(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let backend = MemoryBackend::new();
        backend.set_failing(true);
        assert!(backend.ensure_bucket("30-08-2026").await.is_err());
        backend.set_failing(false);
        assert!(backend.ensure_bucket("30-08-2026").await.is_ok());
    }
}
