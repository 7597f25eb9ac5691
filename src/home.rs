use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "ledger.json";
const BUCKETS_JSON: &str = "buckets.json";

/// The `Home` object represents the file paths of the `$SPLITBILL_HOME`
/// directory: the configuration file, the session ledger snapshot, and the
/// JSON bucket store used when mirroring is enabled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Home {
    root: PathBuf,
    config: PathBuf,
    ledger: PathBuf,
    buckets: PathBuf,
}

impl Home {
    /// This will create the home directory, if it does not exist, and
    /// canonicalize itself.
    pub async fn new(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        make_dir(&maybe_relative)
            .await
            .context("Unable to create the splitbill home directory")?;
        let root = fs::canonicalize(&maybe_relative).await.with_context(|| {
            format!(
                "Unable to canonicalize the path {}",
                maybe_relative.to_string_lossy()
            )
        })?;
        Ok(Self {
            config: root.join(CONFIG_JSON),
            ledger: root.join(LEDGER_JSON),
            buckets: root.join(BUCKETS_JSON),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn ledger(&self) -> &Path {
        &self.ledger
    }

    pub fn buckets(&self) -> &Path {
        &self.buckets
    }
}

/// Creates a directory (and its parents); ok if it already exists.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}
