//! Healthcheck plugin for Armature applications.
//!
//! Mounts a readiness endpoint (`GET /healthz` by default) and, when probes
//! are configured, gates startup on external dependencies being reachable.

pub mod plugin;
pub mod probe;

pub use plugin::HealthcheckPlugin;
pub use probe::{Probe, TcpProbe};
