//! Invoke a registered task.

use clap::Args;

use armature_core::error::AppError;
use armature_host::Armature;

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Name of the task to invoke
    pub task: String,
}

/// Execute the run command.
///
/// The application is assembled first, so the environment check and the
/// middleware stages run exactly as they do for `serve`; the task is then
/// invoked and its JSON result, if any, printed to stdout. A task failure
/// propagates as the process result.
pub async fn execute(host: &Armature, args: &RunArgs) -> Result<(), AppError> {
    let _app = host.build()?;

    tracing::info!(task = %args.task, "Running task");
    match host.invoke_task(&args.task).await? {
        Some(value) => {
            let pretty = serde_json::to_string_pretty(&value)?;
            println!("{}", pretty);
        }
        None => {
            tracing::info!(task = %args.task, "Task completed with no output");
        }
    }
    Ok(())
}
