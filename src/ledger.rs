//! The in-memory ledger: an ordered collection of entries, the identity
//! allocator, and the signed running total.
//!
//! All mutations complete synchronously in memory. When a mirror is attached,
//! each committed mutation is additionally enqueued for best-effort
//! replication to the persistence backend; a backend failure is logged and
//! never rolls the in-memory state back.

use crate::calc;
use crate::error::{Error, Result};
use crate::model::{Amount, EntryId, LedgerEntry, Mode};
use crate::persist::Mirror;
use crate::serial::ImportRecord;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// How entry ids are allocated across a session.
///
/// `Monotonic` is the default: ids are never reused, even after deletes, so
/// an id remains a stable identifier for the whole session (and for anything
/// mirrored out-of-process). `GapFilling` is the legacy behavior: the next id
/// is one past the highest id still live, so ids of deleted entries become
/// implicitly reusable.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    #[default]
    Monotonic,
    GapFilling,
}

/// The signed running total.
///
/// Updated incrementally on every mutation; the invariant is that its value
/// always equals the sum of `signed_final_cost` over the live entries.
/// Currency presentation (symbol, color) belongs to the interface layer; this
/// type exposes the numeric value and its sign.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Total(Decimal);

impl Total {
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// The total as a display-formatted amount, e.g. `-£1,234.50`.
    pub fn amount(&self) -> Amount {
        Amount::new(self.0.round_dp(2))
    }

    fn apply(&mut self, delta: Decimal) {
        self.0 += delta;
    }
}

/// The ledger store: an append-ordered collection of entries plus the
/// running total and the id high-water mark.
///
/// Serializable as the session snapshot; an attached [`Mirror`] is runtime
/// state and is not part of the snapshot.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Ledger {
    policy: IdPolicy,
    /// Highest id ever allocated or restored. Only consulted by the
    /// `Monotonic` policy, but always maintained.
    last_id: EntryId,
    entries: Vec<LedgerEntry>,
    total: Total,
    #[serde(skip)]
    mirror: Option<Mirror>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("policy", &self.policy)
            .field("last_id", &self.last_id)
            .field("entries", &self.entries.len())
            .field("total", &self.total)
            .field("mirror", &self.mirror.is_some())
            .finish()
    }
}

impl Ledger {
    /// Creates an empty ledger with the given id allocation policy.
    pub fn new(policy: IdPolicy) -> Self {
        Self {
            policy,
            last_id: EntryId::default(),
            entries: Vec::new(),
            total: Total::default(),
            mirror: None,
        }
    }

    /// Attaches a mirror; subsequent mutations are replicated through it.
    pub fn attach_mirror(&mut self, mirror: Mirror) {
        self.mirror = Some(mirror);
    }

    /// Detaches the mirror, if any, so the caller can drain and close it.
    pub fn detach_mirror(&mut self) -> Option<Mirror> {
        self.mirror.take()
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// The live entries in insertion order. The store never reorders them.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn total(&self) -> Total {
        self.total
    }

    /// Validates the inputs, derives the final cost, and appends a new entry.
    ///
    /// The `mode` in effect is snapshotted onto the entry and determines the
    /// sign of its contribution to the total. On a validation failure no
    /// entry is created and the total is untouched.
    pub fn add(
        &mut self,
        product: &str,
        cost: &str,
        vat: bool,
        split: bool,
        mode: Mode,
    ) -> Result<&LedgerEntry> {
        let (product, initial) = calc::validate(product, cost)?;
        let final_cost = calc::final_cost(initial, vat, split);
        let id = self.allocate_id();
        let entry = LedgerEntry::new(
            id,
            product,
            initial.plain(),
            vat,
            split,
            final_cost,
            mode,
            Utc::now(),
        );
        Ok(self.commit(entry))
    }

    /// Creates a new entry with the product, cost and flags of `source_id`.
    ///
    /// The copy gets a fresh id and a fresh timestamp; the `mode` is the one
    /// in effect now, not the source's. Fails with `NotFound` if the source
    /// id is not live, leaving the store and total unchanged.
    pub fn duplicate(&mut self, source_id: EntryId, mode: Mode) -> Result<&LedgerEntry> {
        let source = self
            .get(source_id)
            .ok_or(Error::NotFound { id: source_id })?
            .clone();
        let id = self.allocate_id();
        let entry = LedgerEntry::new(
            id,
            source.product().to_string(),
            source.initial_cost(),
            source.vat(),
            source.split(),
            source.final_cost(),
            mode,
            Utc::now(),
        );
        Ok(self.commit(entry))
    }

    /// Removes the entries whose ids appear in `ids` and returns them.
    ///
    /// Permissive batch semantics: ids that are not live are skipped without
    /// error. Each removed entry's original delta is reversed off the total.
    pub fn delete(&mut self, ids: &[EntryId]) -> Vec<LedgerEntry> {
        let wanted: BTreeSet<EntryId> = ids.iter().copied().collect();
        if wanted.is_empty() || self.entries.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if wanted.contains(&e.id()) {
                removed.push(e.clone());
                false
            } else {
                true
            }
        });
        for entry in &removed {
            self.total.apply(-entry.signed_final_cost());
            if let Some(mirror) = &self.mirror {
                mirror.remove(entry);
            }
            debug!("deleted entry {} '{}'", entry.id(), entry.product());
        }
        removed
    }

    /// Re-inserts an imported record, preserving its persisted id.
    ///
    /// The caller (the importer) has already verified that the id does not
    /// collide with a live entry. The current `mode` governs the restored
    /// entry's contribution, per the import contract.
    pub(crate) fn restore(&mut self, record: ImportRecord, mode: Mode) -> &LedgerEntry {
        if record.id > self.last_id {
            self.last_id = record.id;
        }
        let entry = LedgerEntry::new(
            record.id,
            record.product,
            record.initial_cost,
            record.vat,
            record.split,
            record.final_cost,
            mode,
            record.added,
        );
        self.commit(entry)
    }

    /// Appends a fully-formed entry, applies its delta and mirrors the push.
    fn commit(&mut self, entry: LedgerEntry) -> &LedgerEntry {
        self.total.apply(entry.signed_final_cost());
        if let Some(mirror) = &self.mirror {
            mirror.push(&entry);
        }
        debug!(
            "committed entry {} '{}' at {}",
            entry.id(),
            entry.product(),
            entry.final_cost()
        );
        self.entries.push(entry);
        self.entries.last().unwrap()
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = match self.policy {
            IdPolicy::Monotonic => self.last_id.next(),
            IdPolicy::GapFilling => self
                .entries
                .iter()
                .map(LedgerEntry::id)
                .max()
                .unwrap_or_default()
                .next(),
        };
        if id > self.last_id {
            self.last_id = id;
        }
        id
    }
}
