//! Stage argument payloads.
//!
//! The async stages receive an owned clone of their payload per participant;
//! the synchronous middleware stages instead receive exclusive access to the
//! [`AppAssembly`](crate::assembly::AppAssembly) being built.

use std::sync::Arc;

use armature_core::{AppHandle, ServerHandle};

/// Payload for the launch gate.
#[derive(Debug, Clone)]
pub struct BeforeStartArgs {
    /// The composed application.
    pub app: Arc<AppHandle>,
}

/// Payload for the readiness stage.
#[derive(Debug, Clone)]
pub struct AppReadyArgs {
    /// The composed application.
    pub app: Arc<AppHandle>,
    /// The bound listener address.
    pub server: ServerHandle,
}

/// Payload for the shutdown stage.
#[derive(Debug, Clone)]
pub struct BeforeExitArgs {
    /// The composed application.
    pub app: Arc<AppHandle>,
    /// The listener address the server was serving on.
    pub server: ServerHandle,
    /// Name of the signal that triggered shutdown, e.g. `SIGTERM`.
    pub signal: String,
}
