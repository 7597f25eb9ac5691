//! Types that represent the core data model, such as `LedgerEntry` and `Amount`.
mod amount;
mod entry;

pub use amount::{Amount, AmountFormat};
pub use entry::{EntryId, LedgerEntry, Mode};
