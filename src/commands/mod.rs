//! Command handlers for the splitbill CLI.
//!
//! This module contains implementations for all CLI subcommands. Each
//! handler loads the session ledger snapshot, applies one core operation,
//! saves the snapshot, and (when mirroring is enabled) drains the mirror
//! queue before returning.

mod delete;
mod entry;
mod fileio;
mod init;
mod query;

use crate::ledger::Ledger;
use crate::persist::Mirror;
use crate::Config;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::delete;
pub use entry::{add, duplicate};
pub use fileio::{export, import};
pub use init::init;
pub use query::{list, total};

/// The output type for a command. This allows the command to return a
/// consistent message and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Attaches the configured persistence backend to the ledger, if mirroring
/// is enabled. Must run inside a tokio runtime.
pub(crate) fn attach_backend(config: &Config, ledger: &mut Ledger) {
    if let Some(backend) = config.backend() {
        ledger.attach_mirror(Mirror::attach(backend));
    }
}

/// Saves the session snapshot and drains the mirror queue, if one is
/// attached. Mirror failures have already been logged by the worker; they do
/// not fail the command.
pub(crate) async fn finish(config: &Config, mut ledger: Ledger) -> anyhow::Result<()> {
    config.save_ledger(&ledger).await?;
    if let Some(mirror) = ledger.detach_mirror() {
        mirror.close().await;
    }
    Ok(())
}
