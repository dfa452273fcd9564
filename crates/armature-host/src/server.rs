//! Server startup, readiness, and graceful shutdown.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing;

use armature_core::{AppError, AppResult, ServerHandle};
use armature_plugin::{AppReadyArgs, BeforeExitArgs, BeforeStartArgs, StartDecision};

use crate::app::{App, Armature};

/// Start the application and serve until a termination signal arrives.
///
/// Runs the launch gate first: a no-go decision cancels startup cleanly and
/// returns `Ok(false)` without binding the listener. On go, binds the
/// listener, runs the readiness stage (a readiness failure is logged but does
/// not stop serving), serves with graceful shutdown on SIGINT/SIGTERM, runs
/// the shutdown stage with the signal name, and returns `Ok(true)`.
pub async fn start(host: &Armature, app: App) -> AppResult<bool> {
    start_with_shutdown(host, app, shutdown_signal()).await
}

/// [`start`] with a caller-supplied shutdown trigger resolving to the signal
/// name handed to the shutdown stage. For embedders and tests that stop the
/// server programmatically.
pub async fn start_with_shutdown<F>(
    host: &Armature,
    app: App,
    shutdown: F,
) -> AppResult<bool>
where
    F: Future<Output = &'static str> + Send + 'static,
{
    let App { router, handle } = app;

    if handle.host_id != host.id() {
        return Err(AppError::internal(
            "This application was not created by this host instance",
        ));
    }

    let decision = host
        .hooks()
        .run_before_start(BeforeStartArgs {
            app: Arc::clone(&handle),
        })
        .await
        .map_err(|errors| {
            let participants: Vec<_> = errors.participants().collect();
            tracing::error!(error = %errors, participants = ?participants, "Launch gate crashed");
            AppError::from(errors)
        })?;

    if let StartDecision::NoGo { reasons } = decision {
        for (plugin, reason) in &reasons {
            tracing::warn!(plugin = %plugin, reason = %reason, "Plugin voted no-go");
        }
        tracing::warn!("App startup cancelled by beforeStart hooks");
        return Ok(false);
    }

    let server_config = &host.config().server;
    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    let local = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Failed to read bound address: {}", e)))?;

    let server_handle = ServerHandle {
        host: local.ip().to_string(),
        port: local.port(),
    };

    tracing::info!(
        instance = %handle.runtime.instance,
        "Armature server listening on {}",
        server_handle
    );

    if let Err(errors) = host
        .hooks()
        .run_app_ready(AppReadyArgs {
            app: Arc::clone(&handle),
            server: server_handle.clone(),
        })
        .await
    {
        let participants: Vec<_> = errors.participants().collect();
        tracing::error!(error = %errors, participants = ?participants, "Readiness hooks failed");
    }

    let (signal_tx, signal_rx) = watch::channel(String::new());
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let signal = shutdown.await;
        tracing::info!(signal = %signal, "Shutdown signal received, starting graceful shutdown...");
        let _ = signal_tx.send(signal.to_string());
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    let signal = signal_rx.borrow().clone();

    host.hooks()
        .run_before_exit(BeforeExitArgs {
            app: Arc::clone(&handle),
            server: server_handle,
            signal: signal.clone(),
        })
        .await
        .map_err(|errors| {
            let participants: Vec<_> = errors.participants().collect();
            tracing::error!(error = %errors, participants = ?participants, "Shutdown hooks failed");
            AppError::from(errors)
        })?;

    tracing::info!(signal = %signal, "Bye bye");
    Ok(true)
}

/// Wait for a termination signal (Ctrl+C or SIGTERM), resolving to its name.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
