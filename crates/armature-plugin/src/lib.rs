//! # armature-plugin
//!
//! The extensibility layer of Armature: lifecycle stages, the hook
//! orchestration engine, plugin descriptors, and the plugin registry.
//!
//! A plugin contributes at most one callback per lifecycle stage, plus
//! environment-variable declarations and an optional value handed back to
//! the registration caller. The engine executes each stage under its
//! discipline (ordered fail-fast, ordered collecting, or concurrent
//! collecting) and reports failures per participant without ever masking
//! one participant's error with another's.

pub mod assembly;
pub mod descriptor;
pub mod hooks;
pub mod registry;

pub use assembly::AppAssembly;
pub use descriptor::{EnvNeeds, Plugin, UNNAMED_PLUGIN};
pub use hooks::args::{AppReadyArgs, BeforeExitArgs, BeforeStartArgs};
pub use hooks::error::{HookError, HookErrors};
pub use hooks::registry::{HookRegistry, HookSet};
pub use hooks::stage::Stage;
pub use hooks::vote::{StartDecision, StartVote};
pub use registry::PluginRegistry;
