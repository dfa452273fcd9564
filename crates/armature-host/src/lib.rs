//! # armature-host
//!
//! Host-side composition for Armature applications. The [`Armature`] facade
//! collects plugins and tasks during bootstrap; [`Armature::build`] assembles
//! the HTTP application by running the middleware hook stages around the
//! standard layer stack; [`start`] drives the launch gate, readiness, and
//! graceful shutdown.

pub mod app;
pub mod server;

pub use app::{App, Armature};
pub use server::{start, start_with_shutdown};
