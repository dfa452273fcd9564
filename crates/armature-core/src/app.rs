//! Shared application handles passed to lifecycle hooks and tasks.

use std::fmt;

use uuid::Uuid;

use crate::config::AppConfig;
use crate::env::RuntimeEnv;

/// Read-only view of the composed application.
///
/// Built once when the application is assembled and shared (behind an `Arc`)
/// with every lifecycle hook participant and every task invocation.
#[derive(Debug, Clone)]
pub struct AppHandle {
    /// Effective configuration.
    pub config: AppConfig,
    /// Deployment profile and instance identity.
    pub runtime: RuntimeEnv,
    /// Plugin display names in registration order, duplicates included.
    pub plugins: Vec<String>,
    /// Identity of the host that built this application.
    pub host_id: Uuid,
}

/// Address of the bound listener, available once the socket is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandle {
    /// Address the listener is bound to.
    pub host: String,
    /// Port the listener is bound to.
    pub port: u16,
}

impl fmt::Display for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
