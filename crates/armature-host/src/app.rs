//! Application facade and build sequence.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use serde_json::Value;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing;
use uuid::Uuid;

use armature_core::config::AppConfig;
use armature_core::config::server::CorsConfig;
use armature_core::env::RuntimeEnv;
use armature_core::{AppError, AppHandle, AppResult};
use armature_plugin::{AppAssembly, HookRegistry, Plugin, PluginRegistry};
use armature_tasks::{TaskArgs, TaskError, TaskRegistry};

/// Composition root for an Armature application.
///
/// Created once at process start with the loaded configuration. Plugins and
/// tasks are registered while the host is exclusively owned; [`build`](Self::build)
/// and the execution entry points take shared references, so registration
/// ends before the first stage runs.
#[derive(Debug)]
pub struct Armature {
    config: AppConfig,
    runtime: RuntimeEnv,
    plugins: PluginRegistry,
    tasks: TaskRegistry,
    id: Uuid,
}

impl Armature {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            runtime: RuntimeEnv::from_env(),
            plugins: PluginRegistry::new(),
            tasks: TaskRegistry::new(),
            id: Uuid::new_v4(),
        }
    }

    /// Register a plugin, returning whatever its return channel produces.
    pub async fn extend<R>(&mut self, plugin: Plugin<R>) -> Option<R> {
        self.plugins.register(plugin).await
    }

    /// Register a plugin built by `make`.
    ///
    /// The factory receives the host itself, so it can read configuration or
    /// register tasks while constructing the plugin.
    pub async fn extend_with<R, F>(&mut self, make: F) -> Option<R>
    where
        F: FnOnce(&mut Self) -> Plugin<R>,
    {
        let plugin = make(self);
        self.extend(plugin).await
    }

    /// Register an administrative task under `name`.
    pub fn register_task<F, Fut>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(TaskArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, AppError>> + Send + 'static,
    {
        self.tasks.register(name, callback);
    }

    /// Invoke a registered task by name with a fresh application handle.
    pub async fn invoke_task(&self, name: &str) -> Result<Option<Value>, TaskError> {
        let args = TaskArgs {
            app: Arc::new(self.handle()),
        };
        self.tasks.invoke(name, args).await
    }

    /// Task names in registration order, announced on the log.
    pub fn list_tasks(&self) -> Vec<String> {
        self.tasks.list()
    }

    /// Task names in registration order, without logging.
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.names()
    }

    /// Effective configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Deployment profile and instance identity.
    pub fn runtime(&self) -> &RuntimeEnv {
        &self.runtime
    }

    /// Identity of this host instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn hooks(&self) -> &HookRegistry {
        self.plugins.hooks()
    }

    /// Assemble the HTTP application.
    ///
    /// Checks the declared environment requirements, then runs the two
    /// middleware stages around the standard layer stack (body-size limit,
    /// compression, request tracing, CORS). Routes mounted in the first
    /// stage end up inside that stack; routes mounted in the second sit
    /// outside it. A failing middleware hook aborts the build with the
    /// participant-attributed error.
    pub fn build(&self) -> AppResult<App> {
        self.plugins.env().check()?;

        tracing::debug!(plugins = ?self.plugins.names(), "Loaded plugins");

        let handle = Arc::new(self.handle());
        let mut assembly = AppAssembly::new(Arc::clone(&handle));

        let hooks = self.plugins.hooks();
        hooks
            .run_before_middleware_load(&mut assembly)
            .map_err(|e| {
                tracing::error!(plugin = %e.plugin, stage = %e.stage, "Middleware hook failed");
                AppError::from(e)
            })?;

        let server = &self.config.server;
        let cors = build_cors_layer(&server.cors);
        let max_body = server.max_body_bytes;
        assembly.map_router(|router| {
            router
                .layer(DefaultBodyLimit::max(max_body))
                .layer(CompressionLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        });

        hooks
            .run_after_middleware_load(&mut assembly)
            .map_err(|e| {
                tracing::error!(plugin = %e.plugin, stage = %e.stage, "Middleware hook failed");
                AppError::from(e)
            })?;

        Ok(App {
            router: assembly.into_router(),
            handle,
        })
    }

    fn handle(&self) -> AppHandle {
        AppHandle {
            config: self.config.clone(),
            runtime: self.runtime.clone(),
            plugins: self.plugins.names().to_vec(),
            host_id: self.id,
        }
    }
}

/// A fully assembled application, ready to start.
#[derive(Debug)]
pub struct App {
    pub(crate) router: Router,
    pub(crate) handle: Arc<AppHandle>,
}

impl App {
    /// The shared handle this application was built with.
    pub fn handle(&self) -> &Arc<AppHandle> {
        &self.handle
    }

    /// A clone of the assembled router, for serving or probing in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the CORS layer from configuration.
fn build_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors = cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds));

    cors
}
