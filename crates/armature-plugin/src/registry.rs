//! Plugin registration.

use armature_core::env::EnvRequirements;

use crate::descriptor::{Plugin, ReturnChannel};
use crate::hooks::registry::HookRegistry;

/// Everything plugins have contributed to one host.
///
/// One instance per host, created at process start and threaded through
/// registration and execution explicitly; there is no ambient global
/// registry, so independent instances coexist freely in tests.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    names: Vec<String>,
    hooks: HookRegistry,
    env: EnvRequirements,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one plugin.
    ///
    /// Records the display name (explicit, or the `unnamed-plugin`
    /// sentinel), forwards hooks to the hook registry under that name,
    /// forwards environment needs, and resolves the descriptor's return
    /// channel. The resolved value, if any, is handed back to the caller.
    pub async fn register<R>(&mut self, plugin: Plugin<R>) -> Option<R> {
        let name = plugin.display_name().to_string();
        tracing::debug!(plugin = %name, "Registering plugin");

        self.names.push(name.clone());
        self.hooks.register(&name, plugin.hooks);

        for var in plugin.env.required {
            self.env.add_required(var);
        }
        for var in plugin.env.optional {
            self.env.add_optional(var);
        }

        match plugin.output {
            ReturnChannel::None => None,
            ReturnChannel::Value(value) => Some(value),
            ReturnChannel::Producer(producer) => Some(producer()),
            ReturnChannel::AsyncProducer(producer) => Some(producer().await),
        }
    }

    /// Plugin display names in registration order, duplicates included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// The accumulated environment requirements.
    pub fn env(&self) -> &EnvRequirements {
        &self.env
    }
}
