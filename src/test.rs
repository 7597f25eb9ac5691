//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::args::{AddArgs, Args, Command, DeleteArgs, DuplicateArgs, ExportArgs, ImportArgs};
use crate::ledger::IdPolicy;
use crate::Config;
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment that sets up a splitbill home directory with a Config.
/// Holds the TempDir to keep the directory alive for the duration of the
/// test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with an initialized Config (monotonic ids,
    /// mirroring off).
    pub async fn new() -> Self {
        Self::with_settings(IdPolicy::Monotonic, false).await
    }

    /// Creates a test environment with the given settings.
    pub async fn with_settings(id_policy: IdPolicy, mirroring: bool) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("splitbill");
        let config = Config::create(&root, id_policy, mirroring).await.unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A path in the test's scratch space, outside the splitbill home.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Parses `splitbill add` args from the given flags.
    pub fn parse_add(extra: &[&str]) -> AddArgs {
        match Self::parse("add", extra) {
            Command::Add(args) => args,
            other => panic!("expected Add, got {other:?}"),
        }
    }

    /// Parses `splitbill duplicate` args from the given flags.
    pub fn parse_duplicate(extra: &[&str]) -> DuplicateArgs {
        match Self::parse("duplicate", extra) {
            Command::Duplicate(args) => args,
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    /// Parses `splitbill delete` args from the given ids.
    pub fn parse_delete(ids: &[&str]) -> DeleteArgs {
        match Self::parse("delete", ids) {
            Command::Delete(args) => args,
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    /// Parses `splitbill export` args for the given path.
    pub fn parse_export(path: &Path) -> ExportArgs {
        match Self::parse("export", &[path.to_str().unwrap()]) {
            Command::Export(args) => args,
            other => panic!("expected Export, got {other:?}"),
        }
    }

    /// Parses `splitbill import` args for the given path.
    pub fn parse_import(path: &Path) -> ImportArgs {
        match Self::parse("import", &[path.to_str().unwrap()]) {
            Command::Import(args) => args,
            other => panic!("expected Import, got {other:?}"),
        }
    }

    fn parse(subcommand: &str, extra: &[&str]) -> Command {
        let mut argv = vec!["splitbill", subcommand];
        argv.extend_from_slice(extra);
        Args::parse_from(argv).command().clone()
    }
}
