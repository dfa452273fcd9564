//! Hook registry: ordered participant sequences per lifecycle stage.
//!
//! Registration appends under `&mut self`; execution reads under `&self`.
//! The borrow rules make the two phases disjoint without any locking, which
//! is exactly the intended usage: plugins register at bootstrap, stages run
//! afterwards.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

use armature_core::AppError;

use crate::assembly::AppAssembly;

use super::args::{AppReadyArgs, BeforeExitArgs, BeforeStartArgs};
use super::error::{HookError, HookErrors};
use super::runner::{run_in_parallel, run_in_sequence};
use super::stage::Stage;
use super::vote::{StartDecision, StartVote};

/// Synchronous middleware-stage callback.
pub type SyncHook = Box<dyn Fn(&mut AppAssembly) -> Result<(), AppError> + Send + Sync>;

/// Asynchronous stage callback over payload `A` producing `R`.
pub type AsyncHook<A, R> = Box<dyn Fn(A) -> BoxFuture<'static, Result<R, AppError>> + Send + Sync>;

/// One participant's registration in one stage.
pub struct HookCell<H> {
    /// Display name of the contributing plugin.
    pub plugin: String,
    /// The registered callback.
    pub hook: H,
}

impl<H> fmt::Debug for HookCell<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}

/// The callbacks one plugin contributes, at most one per stage.
///
/// Setting the same stage twice replaces the earlier callback; a plugin
/// that wants several callbacks in one stage is really several plugins.
#[derive(Default)]
pub struct HookSet {
    pub(crate) before_middleware_load: Option<SyncHook>,
    pub(crate) after_middleware_load: Option<SyncHook>,
    pub(crate) before_start: Option<AsyncHook<BeforeStartArgs, StartVote>>,
    pub(crate) app_ready: Option<AsyncHook<AppReadyArgs, ()>>,
    pub(crate) before_exit: Option<AsyncHook<BeforeExitArgs, ()>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback for the stage before the standard middleware is mounted.
    pub fn on_before_middleware_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut AppAssembly) -> Result<(), AppError> + Send + Sync + 'static,
    {
        self.before_middleware_load = Some(Box::new(hook));
        self
    }

    /// Callback for the stage after the standard middleware is mounted.
    pub fn on_after_middleware_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut AppAssembly) -> Result<(), AppError> + Send + Sync + 'static,
    {
        self.after_middleware_load = Some(Box::new(hook));
        self
    }

    /// Callback for the launch gate.
    pub fn on_before_start<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(BeforeStartArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StartVote, AppError>> + Send + 'static,
    {
        self.before_start = Some(Box::new(move |args| Box::pin(hook(args))));
        self
    }

    /// Callback for the readiness stage.
    pub fn on_app_ready<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(AppReadyArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.app_ready = Some(Box::new(move |args| Box::pin(hook(args))));
        self
    }

    /// Callback for the shutdown stage.
    pub fn on_before_exit<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(BeforeExitArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.before_exit = Some(Box::new(move |args| Box::pin(hook(args))));
        self
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("before_middleware_load", &self.before_middleware_load.is_some())
            .field("after_middleware_load", &self.after_middleware_load.is_some())
            .field("before_start", &self.before_start.is_some())
            .field("app_ready", &self.app_ready.is_some())
            .field("before_exit", &self.before_exit.is_some())
            .finish()
    }
}

/// Ordered participant sequences for all five stages.
#[derive(Default)]
pub struct HookRegistry {
    before_middleware_load: Vec<HookCell<SyncHook>>,
    after_middleware_load: Vec<HookCell<SyncHook>>,
    before_start: Vec<HookCell<AsyncHook<BeforeStartArgs, StartVote>>>,
    app_ready: Vec<HookCell<AsyncHook<AppReadyArgs, ()>>>,
    before_exit: Vec<HookCell<AsyncHook<BeforeExitArgs, ()>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every callback in `hooks` under `plugin`'s display name.
    ///
    /// Duplicate plugin names are allowed; each registration keeps its own
    /// position in the stage order.
    pub fn register(&mut self, plugin: &str, hooks: HookSet) {
        if let Some(hook) = hooks.before_middleware_load {
            self.before_middleware_load.push(HookCell {
                plugin: plugin.to_string(),
                hook,
            });
        }
        if let Some(hook) = hooks.after_middleware_load {
            self.after_middleware_load.push(HookCell {
                plugin: plugin.to_string(),
                hook,
            });
        }
        if let Some(hook) = hooks.before_start {
            self.before_start.push(HookCell {
                plugin: plugin.to_string(),
                hook,
            });
        }
        if let Some(hook) = hooks.app_ready {
            self.app_ready.push(HookCell {
                plugin: plugin.to_string(),
                hook,
            });
        }
        if let Some(hook) = hooks.before_exit {
            self.before_exit.push(HookCell {
                plugin: plugin.to_string(),
                hook,
            });
        }
    }

    /// Number of participants registered for `stage`.
    pub fn participant_count(&self, stage: Stage) -> usize {
        match stage {
            Stage::BeforeMiddlewareLoad => self.before_middleware_load.len(),
            Stage::AfterMiddlewareLoad => self.after_middleware_load.len(),
            Stage::BeforeStart => self.before_start.len(),
            Stage::AppReady => self.app_ready.len(),
            Stage::BeforeExit => self.before_exit.len(),
        }
    }

    /// Run the stage before the host mounts its standard middleware.
    ///
    /// Registration order, fail-fast: the first participant error aborts the
    /// stage and later participants are not invoked at all.
    pub fn run_before_middleware_load(&self, app: &mut AppAssembly) -> Result<(), HookError> {
        run_sync_fail_fast(Stage::BeforeMiddlewareLoad, &self.before_middleware_load, app)
    }

    /// Run the stage after the standard middleware is mounted. Same
    /// discipline as [`run_before_middleware_load`](Self::run_before_middleware_load).
    pub fn run_after_middleware_load(&self, app: &mut AppAssembly) -> Result<(), HookError> {
        run_sync_fail_fast(Stage::AfterMiddlewareLoad, &self.after_middleware_load, app)
    }

    /// Run the launch gate: registration order, collecting, reduced to one
    /// [`StartDecision`].
    ///
    /// A participant that crashes (as opposed to voting no-go) turns the
    /// whole run into a [`HookErrors`] aggregate, raised only after every
    /// participant has been attempted.
    pub async fn run_before_start(
        &self,
        args: BeforeStartArgs,
    ) -> Result<StartDecision, HookErrors> {
        run_in_sequence(
            Stage::BeforeStart,
            &self.before_start,
            &args,
            StartDecision::from_votes,
        )
        .await
    }

    /// Run the readiness stage: concurrent, collecting, no result value.
    pub async fn run_app_ready(&self, args: AppReadyArgs) -> Result<(), HookErrors> {
        run_in_parallel(Stage::AppReady, &self.app_ready, &args, |_results| ()).await
    }

    /// Run the shutdown stage: registration order, collecting, no result
    /// value.
    pub async fn run_before_exit(&self, args: BeforeExitArgs) -> Result<(), HookErrors> {
        run_in_sequence(Stage::BeforeExit, &self.before_exit, &args, |_results| ()).await
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts = f.debug_struct("HookRegistry");
        for stage in Stage::ALL {
            counts.field(stage.as_str(), &self.participant_count(stage));
        }
        counts.finish()
    }
}

fn run_sync_fail_fast(
    stage: Stage,
    cells: &[HookCell<SyncHook>],
    app: &mut AppAssembly,
) -> Result<(), HookError> {
    tracing::debug!(stage = %stage, participants = cells.len(), "Running stage");

    for cell in cells {
        (cell.hook)(app).map_err(|source| {
            tracing::warn!(
                stage = %stage,
                plugin = %cell.plugin,
                error = %source,
                "Hook participant failed"
            );
            HookError {
                stage,
                plugin: cell.plugin.clone(),
                source,
            }
        })?;
    }

    Ok(())
}
