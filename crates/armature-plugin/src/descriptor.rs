//! Plugin descriptors.
//!
//! A descriptor is a plain value describing what one extension contributes:
//! a display name, environment-variable declarations, lifecycle hooks, and
//! an optional value handed back to whoever registers it.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

use crate::hooks::registry::HookSet;

/// Sentinel display name for plugins registered without one.
///
/// Anonymous plugins all share it, which makes them indistinguishable in
/// logs and aggregated errors.
pub const UNNAMED_PLUGIN: &str = "unnamed-plugin";

/// Environment variables a plugin declares.
#[derive(Debug, Clone, Default)]
pub struct EnvNeeds {
    /// Variables the plugin cannot run without.
    pub required: Vec<String>,
    /// Variables the plugin reads when present.
    pub optional: Vec<String>,
}

/// The value a plugin hands back to its registration caller.
///
/// Resolved exactly once, at registration time.
pub(crate) enum ReturnChannel<R> {
    /// Nothing to hand back.
    None,
    /// A value returned verbatim.
    Value(R),
    /// A producer invoked at registration.
    Producer(Box<dyn FnOnce() -> R + Send>),
    /// An async producer awaited at registration.
    AsyncProducer(Box<dyn FnOnce() -> BoxFuture<'static, R> + Send>),
}

impl<R> fmt::Debug for ReturnChannel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::None => "None",
            Self::Value(_) => "Value",
            Self::Producer(_) => "Producer",
            Self::AsyncProducer(_) => "AsyncProducer",
        };
        f.write_str(variant)
    }
}

/// A plugin descriptor.
///
/// Starts out as `Plugin<()>`; attaching a return channel rebinds the type
/// parameter to whatever the plugin hands back:
///
/// ```ignore
/// let plugin = Plugin::named("db")
///     .require_env(["DATABASE_URL"])
///     .hooks(HookSet::new().on_before_start(check_pool))
///     .returns_async(connect_pool);
/// ```
pub struct Plugin<R = ()> {
    pub(crate) name: Option<String>,
    pub(crate) env: EnvNeeds,
    pub(crate) hooks: HookSet,
    pub(crate) output: ReturnChannel<R>,
}

impl Plugin<()> {
    /// Anonymous descriptor; it registers under [`UNNAMED_PLUGIN`].
    pub fn new() -> Self {
        Self {
            name: None,
            env: EnvNeeds::default(),
            hooks: HookSet::new(),
            output: ReturnChannel::None,
        }
    }

    /// Descriptor with an explicit display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }
}

impl Default for Plugin<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Plugin<R> {
    /// Declare environment variables the plugin cannot run without.
    pub fn require_env<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare environment variables the plugin reads when present.
    pub fn accept_env<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env.optional.extend(names.into_iter().map(Into::into));
        self
    }

    /// Contribute lifecycle hooks.
    pub fn hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = hooks;
        self
    }

    /// Hand a value back to the registration caller verbatim.
    pub fn returns<T>(self, value: T) -> Plugin<T> {
        self.with_output(ReturnChannel::Value(value))
    }

    /// Hand back the result of a producer invoked at registration.
    pub fn returns_with<T, F>(self, producer: F) -> Plugin<T>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.with_output(ReturnChannel::Producer(Box::new(producer)))
    }

    /// Hand back the result of an async producer awaited at registration.
    pub fn returns_async<T, F, Fut>(self, producer: F) -> Plugin<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.with_output(ReturnChannel::AsyncProducer(Box::new(move || {
            Box::pin(producer())
        })))
    }

    /// The display name this descriptor registers under.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_PLUGIN)
    }

    fn with_output<T>(self, output: ReturnChannel<T>) -> Plugin<T> {
        Plugin {
            name: self.name,
            env: self.env,
            hooks: self.hooks,
            output,
        }
    }
}

impl<R> fmt::Debug for Plugin<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("env", &self.env)
            .field("hooks", &self.hooks)
            .field("output", &self.output)
            .finish()
    }
}
