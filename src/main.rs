//! Armature Server — reference application for the Armature host.
//!
//! Wires the healthcheck plugin, a lifecycle banner, and a couple of
//! administrative tasks into a host, then hands control to the CLI.

use serde_json::json;

use armature_core::config::AppConfig;
use armature_core::error::AppError;
use armature_host::Armature;
use armature_plugin::{HookSet, Plugin};
use plugin_healthcheck::{HealthcheckPlugin, TcpProbe};

#[tokio::main]
async fn main() {
    if let Err(e) = armature_cli::run(build_host).await {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

/// Compose the reference application.
async fn build_host(config: AppConfig) -> Result<Armature, AppError> {
    let mut host = Armature::new(config);

    let mut healthcheck = HealthcheckPlugin::new();
    if let Some(addr) = std::env::var("ARMATURE_PROBE_ADDR")
        .ok()
        .filter(|v| !v.is_empty())
    {
        healthcheck = healthcheck.with_probe(TcpProbe::new("upstream", addr));
    }
    host.extend(
        healthcheck
            .into_plugin()
            .accept_env(["ARMATURE_PROBE_ADDR"]),
    )
    .await;

    host.extend(banner_plugin()).await;

    // The factory form hands the host to the plugin, which uses it to
    // register administrative tasks.
    host.extend_with(|host| {
        host.register_task("config:show", |args| async move {
            let config = serde_json::to_value(&args.app.config)
                .map_err(|e| AppError::internal(format!("Config did not serialize: {}", e)))?;
            Ok(Some(config))
        });
        host.register_task("env:instance", |args| async move {
            Ok(Some(json!({
                "profile": args.app.runtime.profile.as_str(),
                "instance": args.app.runtime.instance,
                "plugins": args.app.plugins,
            })))
        });
        Plugin::named("admin-tasks")
    })
    .await;

    Ok(host)
}

/// Logs lifecycle transitions with the bound address.
fn banner_plugin() -> Plugin<()> {
    Plugin::named("banner").hooks(
        HookSet::new()
            .on_app_ready(|args| async move {
                tracing::info!(
                    instance = %args.app.runtime.instance,
                    "Serving on http://{}",
                    args.server
                );
                Ok(())
            })
            .on_before_exit(|args| async move {
                tracing::info!(signal = %args.signal, "Stopped serving on {}", args.server);
                Ok(())
            }),
    )
}
