//! Start the HTTP server.

use clap::Args;

use armature_core::config::AppConfig;
use armature_core::error::AppError;
use armature_host::Armature;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// Apply command-line overrides to the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
    }
}

/// Execute the serve command.
///
/// A clean no-go from the launch gate is not an error: the process exits
/// zero after logging the veto reasons.
pub async fn execute(host: &Armature) -> Result<(), AppError> {
    let app = host.build()?;
    armature_host::start(host, app).await?;
    Ok(())
}
