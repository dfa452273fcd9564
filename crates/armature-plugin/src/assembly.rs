//! The application under construction, as middleware-stage hooks see it.

use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::routing::MethodRouter;

use armature_core::AppHandle;

/// The application being assembled.
///
/// Middleware-stage hooks receive exclusive access and may mount routes or
/// transform the router; the host finalizes the assembly into a serveable
/// router once both middleware stages have run. Handlers mounted here
/// receive the shared [`AppHandle`] through axum state.
pub struct AppAssembly {
    handle: Arc<AppHandle>,
    router: Router<Arc<AppHandle>>,
}

impl AppAssembly {
    /// Start an empty assembly for `handle`.
    pub fn new(handle: Arc<AppHandle>) -> Self {
        Self {
            handle,
            router: Router::new(),
        }
    }

    /// The shared application handle.
    pub fn handle(&self) -> &Arc<AppHandle> {
        &self.handle
    }

    /// Mount a single route.
    pub fn route(&mut self, path: &str, method_router: MethodRouter<Arc<AppHandle>>) {
        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, method_router);
    }

    /// Merge a whole sub-router.
    pub fn merge(&mut self, other: Router<Arc<AppHandle>>) {
        let router = std::mem::take(&mut self.router);
        self.router = router.merge(other);
    }

    /// Apply an arbitrary router transformation, e.g. adding a tower layer.
    pub fn map_router(
        &mut self,
        f: impl FnOnce(Router<Arc<AppHandle>>) -> Router<Arc<AppHandle>>,
    ) {
        let router = std::mem::take(&mut self.router);
        self.router = f(router);
    }

    /// Finalize into a serveable router with the handle attached as state.
    pub fn into_router(self) -> Router {
        self.router.with_state(self.handle)
    }
}

impl fmt::Debug for AppAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAssembly")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
