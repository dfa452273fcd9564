//! # armature-core
//!
//! Core crate for Armature. Contains configuration schemas, the runtime
//! environment model (profile, instance identity, declared variable
//! requirements), shared application handles, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Armature crates.

pub mod app;
pub mod config;
pub mod env;
pub mod error;
pub mod result;

pub use app::{AppHandle, ServerHandle};
pub use error::AppError;
pub use result::AppResult;
