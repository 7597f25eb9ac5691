use crate::args::InitArgs;
use crate::commands::Out;
use crate::Config;
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Writes an initial `config.json` with the chosen id policy and mirroring
///   setting.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory,
///   e.g. `$HOME/splitbill`
/// - `args` - The id allocation policy and the mirroring toggle.
///
/// # Errors
/// - Returns an error if the directory is already initialized or if any file
///   operation fails.
pub async fn init(home: &Path, args: InitArgs) -> anyhow::Result<Out<()>> {
    let _config = Config::create(home, args.id_policy(), args.mirroring())
        .await
        .context("Unable to create the data directory and config")?;
    Ok("Successfully created the splitbill directory and config".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Args, Command};
    use clap::Parser;
    use tempfile::TempDir;

    fn init_args(extra: &[&str]) -> InitArgs {
        let mut argv = vec!["splitbill", "init"];
        argv.extend_from_slice(extra);
        match Args::parse_from(argv).command() {
            Command::Init(args) => args.clone(),
            other => panic!("expected Init, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("splitbill");
        let out = init(&home, init_args(&["--id-policy", "gap-filling"]))
            .await
            .unwrap();
        assert!(out.message().contains("Successfully created"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.id_policy(), crate::IdPolicy::GapFilling);
        assert!(!config.mirroring());
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("splitbill");
        init(&home, init_args(&[])).await.unwrap();
        assert!(init(&home, init_args(&[])).await.is_err());
    }
}
