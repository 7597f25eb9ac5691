use clap::Parser;
use splitbill::args::{Args, Command};
use splitbill::{commands, Config};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> anyhow::Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.clone()).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(config, add_args.clone()).await?.print()
        }

        Command::Duplicate(dup_args) => {
            let config = Config::load(home).await?;
            commands::duplicate(config, dup_args.clone()).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, delete_args.clone()).await?.print()
        }

        Command::List => {
            let config = Config::load(home).await?;
            commands::list(config).await?.print()
        }

        Command::Total => {
            let config = Config::load(home).await?;
            commands::total(config).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, export_args.clone()).await?.print()
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(config, import_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
