//! List registered tasks.

use clap::Args;

use armature_core::error::AppError;
use armature_host::Armature;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print names only, without the diagnostic log line
    #[arg(long)]
    pub plain: bool,
}

/// Execute the list command: task names to stdout, one per line, in
/// registration order.
pub async fn execute(host: &Armature, args: &ListArgs) -> Result<(), AppError> {
    let names = if args.plain {
        host.task_names()
    } else {
        host.list_tasks()
    };

    for name in names {
        println!("{}", name);
    }
    Ok(())
}
