//! Configuration file handling.
//!
//! The configuration file is stored at `$SPLITBILL_HOME/config.json` and
//! holds the settings that shape a session: the id allocation policy and
//! whether ledger mutations are mirrored to the bucket store. The session
//! ledger snapshot (`ledger.json`) and the JSON bucket store
//! (`buckets.json`) live beside it.

use crate::home::Home;
use crate::ledger::{IdPolicy, Ledger};
use crate::persist::{Backend, JsonFileBackend};
use crate::utils;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const CONFIG_VERSION: u8 = 1;

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$SPLITBILL_HOME`, and from there
/// it loads `config.json` and provides access to the session ledger snapshot
/// and, when mirroring is enabled, the persistence backend.
#[derive(Debug, Clone)]
pub struct Config {
    home: Home,
    file: ConfigFile,
}

/// The shape of `config.json` on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    version: u8,
    id_policy: IdPolicy,
    mirroring: bool,
}

impl Config {
    /// Creates the home directory and an initial `config.json`.
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a `config.json`.
    /// - Returns an error if any file operation fails.
    pub async fn create(dir: impl AsRef<Path>, id_policy: IdPolicy, mirroring: bool) -> Result<Self> {
        let home = Home::new(dir.as_ref()).await?;
        if home.config().exists() {
            bail!(
                "A config.json already exists at {}; delete it to re-initialize",
                home.config().display()
            );
        }
        let file = ConfigFile {
            version: CONFIG_VERSION,
            id_policy,
            mirroring,
        };
        utils::serialize(home.config(), &file)
            .await
            .context("Unable to write the initial config.json")?;
        Ok(Self { home, file })
    }

    /// Loads `config.json` from an existing home directory.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let home = Home::new(dir.as_ref()).await?;
        if !home.config().exists() {
            bail!(
                "No config.json at {}; run 'splitbill init' first",
                home.config().display()
            );
        }
        let file: ConfigFile = utils::deserialize(home.config()).await?;
        if file.version > CONFIG_VERSION {
            bail!(
                "config.json is version {}, but this build understands up to version {}",
                file.version,
                CONFIG_VERSION
            );
        }
        Ok(Self { home, file })
    }

    pub fn home(&self) -> &Home {
        &self.home
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.file.id_policy
    }

    pub fn mirroring(&self) -> bool {
        self.file.mirroring
    }

    /// Loads the session ledger snapshot, or starts a fresh ledger with the
    /// configured id policy when no snapshot exists yet.
    pub async fn load_ledger(&self) -> Result<Ledger> {
        if !self.home.ledger().exists() {
            return Ok(Ledger::new(self.id_policy()));
        }
        utils::deserialize(self.home.ledger())
            .await
            .context("Unable to load the session ledger snapshot")
    }

    /// Saves the session ledger snapshot.
    pub async fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        utils::serialize(self.home.ledger(), ledger)
            .await
            .context("Unable to save the session ledger snapshot")
    }

    /// The persistence backend to mirror to, if mirroring is enabled.
    pub fn backend(&self) -> Option<Arc<dyn Backend>> {
        if self.file.mirroring {
            Some(Arc::new(JsonFileBackend::new(self.home.buckets())))
        } else {
            None
        }
    }
}
