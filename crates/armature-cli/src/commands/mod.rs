//! CLI command definitions and dispatch.

pub mod list;
pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

use armature_core::error::AppError;
use armature_host::Armature;

/// Armature — plugin-driven application host
#[derive(Debug, Parser)]
#[command(name = "armature", version, about, long_about = None)]
pub struct Cli {
    /// Base path of the configuration file (the profile overlay loads from
    /// `config/{profile}` next to it)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Invoke a registered task
    Run(run::RunArgs),
    /// List registered tasks
    #[command(alias = "ls")]
    List(list::ListArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, host: &Armature) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(_) => serve::execute(host).await,
            Commands::Run(args) => run::execute(host, args).await,
            Commands::List(args) => list::execute(host, args).await,
        }
    }
}
