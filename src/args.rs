//! These structs provide the CLI interface for the splitbill CLI.

use crate::ledger::IdPolicy;
use crate::model::{EntryId, Mode};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// splitbill: a shared-cost shopping ledger.
///
/// Enter purchased items with a price and two flags (VAT, split); splitbill
/// derives each item's final cost and keeps a signed running total for the
/// session. The session survives between invocations as a snapshot in the
/// splitbill home directory. Entries can be exported to and imported from a
/// plain-text document, and every mutation can optionally be mirrored to a
/// per-day bucket store.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you
    /// want to store data in and pass it as --home (default: $HOME/splitbill),
    /// pick an id allocation policy, and choose whether mutations should be
    /// mirrored to the per-day bucket store.
    Init(InitArgs),
    /// Add an item to the ledger.
    Add(AddArgs),
    /// Duplicate an existing entry: same product, cost and flags, but a
    /// fresh id and timestamp.
    Duplicate(DuplicateArgs),
    /// Delete one or more entries by id. Ids that are not present are
    /// skipped.
    Delete(DeleteArgs),
    /// List the entries of the current session in insertion order.
    List,
    /// Show the signed running total of the current session.
    Total,
    /// Export the current session's entries to a text document.
    Export(ExportArgs),
    /// Import entries from a text document into the current session.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where splitbill data and configuration is held.
    /// Defaults to ~/splitbill
    #[arg(long, env = "SPLITBILL_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `splitbill init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// How entry ids are allocated: 'monotonic' never reuses an id within a
    /// session; 'gap-filling' reuses the ids of deleted entries (the legacy
    /// behavior).
    #[arg(long, value_enum, default_value_t = IdPolicy::Monotonic)]
    id_policy: IdPolicy,

    /// Mirror every ledger mutation to the per-day bucket store.
    #[arg(long)]
    mirroring: bool,
}

impl InitArgs {
    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    pub fn mirroring(&self) -> bool {
        self.mirroring
    }
}

/// Args for the `splitbill add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The product name. Must not be empty.
    #[arg(long)]
    product: String,

    /// The cost of the product, e.g. '4.99' or '£1,250.40'.
    #[arg(long)]
    cost: String,

    /// Apply the fixed-rate VAT uplift (20%) to the cost.
    #[arg(long)]
    vat: bool,

    /// Halve the cost (two-way split).
    #[arg(long)]
    split: bool,

    /// Subtract this entry's final cost from the running total instead of
    /// adding it.
    #[arg(long)]
    subtract: bool,
}

impl AddArgs {
    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn vat(&self) -> bool {
        self.vat
    }

    pub fn split(&self) -> bool {
        self.split
    }

    pub fn mode(&self) -> Mode {
        if self.subtract {
            Mode::Subtract
        } else {
            Mode::Add
        }
    }
}

/// Args for the `splitbill duplicate` command.
#[derive(Debug, Parser, Clone)]
pub struct DuplicateArgs {
    /// The id of the entry to duplicate.
    id: EntryId,

    /// Subtract the copy's final cost from the running total instead of
    /// adding it.
    #[arg(long)]
    subtract: bool,
}

impl DuplicateArgs {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        if self.subtract {
            Mode::Subtract
        } else {
            Mode::Add
        }
    }
}

/// Args for the `splitbill delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ids of the entries to delete.
    #[arg(required = true)]
    ids: Vec<EntryId>,
}

impl DeleteArgs {
    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }
}

/// Args for the `splitbill export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Where to write the export document.
    path: PathBuf,
}

impl ExportArgs {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Args for the `splitbill import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The document to import.
    path: PathBuf,

    /// Subtract the restored entries' final costs from the running total
    /// instead of adding them.
    #[arg(long)]
    subtract: bool,
}

impl ImportArgs {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn mode(&self) -> Mode {
        if self.subtract {
            Mode::Subtract
        } else {
            Mode::Add
        }
    }
}

/// The default home directory: `$HOME/splitbill`.
fn default_home() -> DisplayPath {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("splitbill");
    path.into()
}

/// A `PathBuf` wrapper that implements `Display` and `FromStr` so it can be
/// used with clap's `default_value_t`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayPath(PathBuf);

impl DisplayPath {
    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Deref for DisplayPath {
    type Target = PathBuf;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::parse_from([
            "splitbill", "add", "--product", "Apples", "--cost", "10.19", "--vat", "--split",
        ]);
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.product(), "Apples");
                assert_eq!(add.cost(), "10.19");
                assert!(add.vat());
                assert!(add.split());
                assert_eq!(add.mode(), Mode::Add);
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_requires_ids() {
        assert!(Args::try_parse_from(["splitbill", "delete"]).is_err());
        let args = Args::parse_from(["splitbill", "delete", "3", "5"]);
        match args.command() {
            Command::Delete(del) => {
                assert_eq!(del.ids(), &[EntryId::new(3), EntryId::new(5)])
            }
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_subtract_flag() {
        let args = Args::parse_from(["splitbill", "duplicate", "4", "--subtract"]);
        match args.command() {
            Command::Duplicate(dup) => {
                assert_eq!(dup.id(), EntryId::new(4));
                assert_eq!(dup.mode(), Mode::Subtract);
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }
}
