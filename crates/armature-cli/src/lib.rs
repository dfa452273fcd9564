//! # armature-cli
//!
//! Command-line front end for Armature applications. The application binary
//! supplies a build function that registers its plugins and tasks; [`run`]
//! parses the command line, loads configuration, initializes logging, and
//! dispatches to the requested command (`serve`, `run <task>`, `list`).

pub mod commands;

pub use commands::{Cli, Commands};

use std::future::Future;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use armature_core::config::AppConfig;
use armature_core::env::RuntimeEnv;
use armature_core::error::AppError;
use armature_host::Armature;

/// Parse the command line and execute the requested command.
///
/// `build` receives the loaded configuration, with any command-line overrides
/// already applied, and returns the host with plugins and tasks registered.
pub async fn run<F, Fut>(build: F) -> Result<(), AppError>
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = Result<Armature, AppError>>,
{
    let cli = Cli::parse();

    let runtime = RuntimeEnv::from_env();
    let mut config = AppConfig::load(&cli.config, runtime.profile.as_str())?;
    if let Commands::Serve(args) = &cli.command {
        args.apply(&mut config);
    }

    init_logging(&config);

    tracing::info!(
        profile = %runtime.profile,
        instance = %runtime.instance,
        version = env!("CARGO_PKG_VERSION"),
        "App is starting"
    );

    let host = build(config).await?;
    cli.execute(&host).await
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
