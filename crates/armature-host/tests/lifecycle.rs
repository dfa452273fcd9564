//! End-to-end lifecycle tests: registration, build, the launch gate,
//! readiness, and shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use serde_json::json;
use tower::ServiceExt;

use armature_core::config::AppConfig;
use armature_core::error::ErrorKind;
use armature_core::{AppError, AppHandle};
use armature_host::{Armature, start, start_with_shutdown};
use armature_plugin::{HookSet, Plugin, StartVote};
use armature_tasks::TaskError;

static ENV_INIT: Once = Once::new();

fn init_test_env() {
    // set_var is unsafe on edition 2024; Once keeps it to a single write.
    ENV_INIT.call_once(|| unsafe {
        std::env::set_var("ARMATURE_ENV", "test");
    });
}

#[tokio::test]
async fn middleware_hooks_run_in_order_and_mount_routes() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    let order = Arc::new(Mutex::new(Vec::new()));
    let before = Arc::clone(&order);
    let after = Arc::clone(&order);

    host.extend(
        Plugin::named("ping").hooks(
            HookSet::new()
                .on_before_middleware_load(move |app| {
                    before.lock().unwrap().push("beforeMiddlewareLoad");
                    app.route("/ping", get(|| async { "pong" }));
                    Ok(())
                })
                .on_after_middleware_load(move |app| {
                    after.lock().unwrap().push("afterMiddlewareLoad");
                    app.route(
                        "/instance",
                        get(|State(handle): State<Arc<AppHandle>>| async move {
                            handle.runtime.instance.clone()
                        }),
                    );
                    Ok(())
                }),
        ),
    )
    .await;

    let app = host.build().expect("build should succeed");
    assert_eq!(
        *order.lock().unwrap(),
        vec!["beforeMiddlewareLoad", "afterMiddlewareLoad"],
    );

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/ping")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&body[..], b"pong");

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/instance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&body),
        app.handle().runtime.instance,
    );
}

#[tokio::test]
async fn a_failing_middleware_hook_aborts_the_build() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    let later_runs = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&later_runs);

    host.extend(
        Plugin::named("boom").hooks(
            HookSet::new()
                .on_before_middleware_load(|_app| Err(AppError::validation("bad wiring"))),
        ),
    )
    .await;
    host.extend(
        Plugin::named("later").hooks(HookSet::new().on_before_middleware_load(move |_app| {
            probe.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })),
    )
    .await;

    let err = host.build().expect_err("build must fail");
    assert_eq!(err.kind, ErrorKind::Plugin);
    assert!(err.message.contains("beforeMiddlewareLoad"));
    assert!(err.message.contains("'boom'"));
    assert_eq!(later_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn build_reports_missing_required_environment() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    host.extend(Plugin::named("db").require_env(["ARMATURE_LIFECYCLE_TEST_MISSING"]))
        .await;

    let err = host.build().expect_err("build must fail");
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.message.contains("ARMATURE_LIFECYCLE_TEST_MISSING"));
}

#[tokio::test]
async fn plugin_names_reach_the_app_handle_in_order() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    host.extend(Plugin::new()).await;
    host.extend(Plugin::named("real")).await;
    host.extend(Plugin::new()).await;

    let app = host.build().expect("build should succeed");
    assert_eq!(
        app.handle().plugins,
        vec!["unnamed-plugin", "real", "unnamed-plugin"],
    );
}

#[tokio::test]
async fn plugin_return_channels_resolve_through_the_facade() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());

    let marker = host.extend(Plugin::named("value").returns(42u16)).await;
    assert_eq!(marker, Some(42));

    let port = host
        .extend_with(|host| {
            let port = host.config().server.port;
            host.register_task("server:port", move |_args| async move {
                Ok(Some(json!(port)))
            });
            Plugin::named("port-reporter").returns(port)
        })
        .await;
    assert_eq!(port, Some(3000));

    let value = host
        .invoke_task("server:port")
        .await
        .expect("task should succeed");
    assert_eq!(value, Some(json!(3000)));
}

#[tokio::test]
async fn no_go_vote_cancels_startup_cleanly() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    let ready_runs = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&ready_runs);

    host.extend(
        Plugin::named("gatekeeper").hooks(
            HookSet::new()
                .on_before_start(|_args| async { Ok(StartVote::no_go("maintenance window")) })
                .on_app_ready(move |_args| {
                    let probe = Arc::clone(&probe);
                    async move {
                        probe.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
        ),
    )
    .await;

    let app = host.build().expect("build should succeed");
    let started = start(&host, app).await.expect("no-go is not an error");
    assert!(!started);
    assert_eq!(ready_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn launch_gate_crash_surfaces_the_aggregate() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    host.extend(
        Plugin::named("broken-gate").hooks(
            HookSet::new()
                .on_before_start(|_args| async { Err(AppError::internal("gate exploded")) }),
        ),
    )
    .await;

    let app = host.build().expect("build should succeed");
    let err = start(&host, app).await.expect_err("crash must propagate");
    assert_eq!(err.kind, ErrorKind::Plugin);
    assert!(err.message.contains("beforeStart"));
}

#[tokio::test]
async fn starting_a_foreign_app_is_rejected() {
    init_test_env();

    let host_a = Armature::new(AppConfig::default());
    let host_b = Armature::new(AppConfig::default());

    let app = host_a.build().expect("build should succeed");
    let err = start(&host_b, app)
        .await
        .expect_err("foreign app must be rejected");
    assert_eq!(err.kind, ErrorKind::Internal);
    assert!(err.message.contains("not created by this host instance"));
}

#[tokio::test]
async fn full_lifecycle_reaches_ready_and_exit_stages() {
    init_test_env();

    let mut config = AppConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;

    let mut host = Armature::new(config);

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let ready_tx = Arc::new(Mutex::new(Some(ready_tx)));

    let ready_events = Arc::clone(&events);
    let exit_events = Arc::clone(&events);

    host.extend(
        Plugin::named("observer").hooks(
            HookSet::new()
                .on_app_ready(move |args| {
                    let events = Arc::clone(&ready_events);
                    let ready_tx = Arc::clone(&ready_tx);
                    async move {
                        events.lock().unwrap().push("ready".to_string());
                        if let Some(tx) = ready_tx.lock().unwrap().take() {
                            let _ = tx.send(args.server.clone());
                        }
                        Ok(())
                    }
                })
                .on_before_exit(move |args| {
                    let events = Arc::clone(&exit_events);
                    async move {
                        events.lock().unwrap().push(format!("exit:{}", args.signal));
                        Ok(())
                    }
                }),
        ),
    )
    .await;

    let app = host.build().expect("build should succeed");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let serving = tokio::spawn(async move {
        start_with_shutdown(&host, app, async move {
            let _ = stop_rx.await;
            "SIGTERM"
        })
        .await
    });

    let server = tokio::time::timeout(Duration::from_secs(5), ready_rx)
        .await
        .expect("server should become ready")
        .expect("ready notification");
    assert_eq!(server.host, "127.0.0.1");
    assert_ne!(server.port, 0);

    let probe = tokio::net::TcpStream::connect((server.host.as_str(), server.port)).await;
    assert!(probe.is_ok(), "listener should accept connections");
    drop(probe);

    stop_tx.send(()).expect("server should still be running");
    let served = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("server should shut down")
        .expect("serve task should not panic")
        .expect("start should succeed");
    assert!(served);

    let events = events.lock().unwrap();
    assert_eq!(*events, vec!["ready".to_string(), "exit:SIGTERM".to_string()]);
}

#[tokio::test]
async fn tasks_flow_through_the_facade() {
    init_test_env();

    let mut host = Armature::new(AppConfig::default());
    host.register_task("env:profile", |args| async move {
        Ok(Some(json!({ "profile": args.app.runtime.profile.as_str() })))
    });
    host.register_task("broken", |_args| async {
        Err(AppError::internal("task exploded"))
    });

    assert_eq!(host.task_names(), vec!["env:profile", "broken"]);

    let value = host
        .invoke_task("env:profile")
        .await
        .expect("task should succeed");
    assert_eq!(value, Some(json!({ "profile": "test" })));

    let err = host
        .invoke_task("missing")
        .await
        .expect_err("unknown task must be rejected");
    assert!(matches!(err, TaskError::Unknown(name) if name == "missing"));

    let err = host
        .invoke_task("broken")
        .await
        .expect_err("failure must propagate");
    match err {
        TaskError::Failed(inner) => assert_eq!(inner.message, "task exploded"),
        other => panic!("expected Failed, got {other:?}"),
    }
}
