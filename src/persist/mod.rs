//! The persistence boundary: mirroring ledger mutations to an external
//! per-day bucketed store.
//!
//! The core treats persistence as optional and advisory. Every ledger
//! invariant holds with no backend attached; when one is attached, mutations
//! are replicated to it best-effort through the [`Mirror`] dispatcher without
//! ever blocking the in-memory operation.

mod json_file;
mod memory;
mod mirror;

use crate::model::{EntryId, LedgerEntry};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use mirror::Mirror;

/// The backend-assigned identifier of a bucket.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketId(String);

impl BucketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for BucketId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Derives the bucket key for a calendar day: `DD-MM-YYYY`.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// A serialized ledger entry as it appears in a bucket's item array.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BucketRecord {
    pub item_id: u64,
    pub product: String,
    pub cost: String,
}

impl From<&LedgerEntry> for BucketRecord {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            item_id: entry.id().value(),
            product: entry.product().to_string(),
            cost: entry.final_cost().plain().to_string(),
        }
    }
}

/// The abstract persistence backend contract.
///
/// Implementations group entries into buckets keyed by a caller-supplied
/// string (one bucket per calendar day, see [`day_key`]). The three
/// primitives are sufficient to mirror add, duplicate and delete. Calls for
/// the same bucket are issued in mutation order by the [`Mirror`] and must be
/// applied in that order; the core never assumes a call succeeded.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Creates the bucket for `key` if it is absent and returns its id
    /// either way. Idempotent.
    async fn ensure_bucket(&self, key: &str) -> Result<BucketId>;

    /// Appends a record to the bucket's item array.
    async fn push_item(&self, bucket: &BucketId, record: &BucketRecord) -> Result<()>;

    /// Removes the item with the matching entry id from the bucket's array.
    async fn remove_item(&self, bucket: &BucketId, entry_id: EntryId) -> Result<()>;
}
