//! The healthcheck plugin descriptor.

use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::routing::get;
use serde_json::{Value, json};

use armature_core::AppHandle;
use armature_plugin::{HookSet, Plugin, StartVote};

use crate::probe::Probe;

/// Readiness endpoint plus startup dependency gating.
///
/// The endpoint is mounted after the standard middleware, outside the trace
/// and compression layers, which keeps liveness probes out of the request
/// log. Probes run during the launch gate; a failing probe vetoes startup
/// with the probe's name and reason, and the server never binds.
pub struct HealthcheckPlugin {
    probes: Vec<Arc<dyn Probe>>,
    route: String,
}

impl HealthcheckPlugin {
    pub fn new() -> Self {
        Self {
            probes: Vec::new(),
            route: "/healthz".to_string(),
        }
    }

    /// Add a startup dependency probe.
    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// Mount the readiness endpoint somewhere other than `/healthz`.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Build the plugin descriptor.
    pub fn into_plugin(self) -> Plugin<()> {
        let route = self.route;
        let probes = self.probes;

        tracing::info!(
            route = %route,
            probes = probes.len(),
            "Registering healthcheck plugin"
        );

        Plugin::named("healthcheck").hooks(
            HookSet::new()
                .on_after_middleware_load(move |app| {
                    app.route(&route, get(healthz));
                    Ok(())
                })
                .on_before_start(move |_args| {
                    let probes = probes.clone();
                    async move {
                        let mut failures = Vec::new();
                        for probe in &probes {
                            match probe.check().await {
                                Ok(()) => {
                                    tracing::debug!(probe = %probe.name(), "Dependency probe passed");
                                }
                                Err(reason) => {
                                    tracing::warn!(
                                        probe = %probe.name(),
                                        reason = %reason,
                                        "Dependency probe failed"
                                    );
                                    failures.push(format!("{}: {}", probe.name(), reason));
                                }
                            }
                        }

                        if failures.is_empty() {
                            Ok(StartVote::Go)
                        } else {
                            Ok(StartVote::no_go(failures.join("; ")))
                        }
                    }
                }),
        )
    }
}

impl fmt::Debug for HealthcheckPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let probes: Vec<&str> = self.probes.iter().map(|p| p.name()).collect();
        f.debug_struct("HealthcheckPlugin")
            .field("probes", &probes)
            .field("route", &self.route)
            .finish()
    }
}

impl Default for HealthcheckPlugin {
    fn default() -> Self {
        Self::new()
    }
}

async fn healthz(State(handle): State<Arc<AppHandle>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "profile": handle.runtime.profile.as_str(),
        "instance": handle.runtime.instance,
        "plugins": handle.plugins,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use armature_core::config::AppConfig;
    use armature_core::env::{EnvProfile, RuntimeEnv};
    use armature_plugin::{AppAssembly, BeforeStartArgs, PluginRegistry, StartDecision};

    struct StaticProbe {
        name: &'static str,
        result: Result<(), String>,
    }

    #[async_trait]
    impl Probe for StaticProbe {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> Result<(), String> {
            self.result.clone()
        }
    }

    fn test_handle() -> Arc<AppHandle> {
        Arc::new(AppHandle {
            config: AppConfig::default(),
            runtime: RuntimeEnv {
                profile: EnvProfile::Test,
                instance: "test.dev".to_string(),
            },
            plugins: vec!["healthcheck".to_string()],
            host_id: Uuid::new_v4(),
        })
    }

    #[tokio::test]
    async fn healthz_reports_the_running_instance() {
        let mut registry = PluginRegistry::new();
        registry.register(HealthcheckPlugin::new().into_plugin()).await;

        let mut assembly = AppAssembly::new(test_handle());
        registry
            .hooks()
            .run_after_middleware_load(&mut assembly)
            .unwrap();

        let response = assembly
            .into_router()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["profile"], "test");
        assert_eq!(json["instance"], "test.dev");
        assert_eq!(json["plugins"], json!(["healthcheck"]));
    }

    #[tokio::test]
    async fn endpoint_route_is_configurable() {
        let mut registry = PluginRegistry::new();
        registry
            .register(
                HealthcheckPlugin::new()
                    .with_route("/status")
                    .into_plugin(),
            )
            .await;

        let mut assembly = AppAssembly::new(test_handle());
        registry
            .hooks()
            .run_after_middleware_load(&mut assembly)
            .unwrap();
        let router = assembly.into_router();

        let hit = router
            .clone()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(hit.status(), StatusCode::OK);

        let miss = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn passing_probes_vote_go() {
        let mut registry = PluginRegistry::new();
        registry
            .register(
                HealthcheckPlugin::new()
                    .with_probe(StaticProbe {
                        name: "db",
                        result: Ok(()),
                    })
                    .with_probe(StaticProbe {
                        name: "cache",
                        result: Ok(()),
                    })
                    .into_plugin(),
            )
            .await;

        let decision = registry
            .hooks()
            .run_before_start(BeforeStartArgs { app: test_handle() })
            .await
            .unwrap();
        assert!(decision.is_go());
    }

    #[tokio::test]
    async fn failing_probes_veto_with_named_reasons() {
        let mut registry = PluginRegistry::new();
        registry
            .register(
                HealthcheckPlugin::new()
                    .with_probe(StaticProbe {
                        name: "db",
                        result: Err("connection refused".to_string()),
                    })
                    .with_probe(StaticProbe {
                        name: "cache",
                        result: Ok(()),
                    })
                    .with_probe(StaticProbe {
                        name: "queue",
                        result: Err("timed out".to_string()),
                    })
                    .into_plugin(),
            )
            .await;

        let decision = registry
            .hooks()
            .run_before_start(BeforeStartArgs { app: test_handle() })
            .await
            .unwrap();
        match decision {
            StartDecision::NoGo { reasons } => {
                assert_eq!(
                    reasons["healthcheck"],
                    "db: connection refused; queue: timed out"
                );
            }
            StartDecision::Go => panic!("expected a veto"),
        }
    }
}
