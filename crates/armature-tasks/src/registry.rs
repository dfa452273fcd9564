//! Named task directory.
//!
//! Tasks are registered while the host is being assembled and invoked later,
//! one at a time, by name. Registration order is preserved so listings come
//! out the way the operator wired them up. Re-registering a name replaces the
//! callback but keeps the original position in the listing.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;
use tracing;

use armature_core::{AppError, AppHandle};

/// Error raised when invoking a task.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task is registered under the requested name.
    #[error("Cannot invoke unknown task `{0}`")]
    Unknown(String),
    /// The task ran and failed. The underlying error passes through
    /// unmodified so callers see exactly what the task reported.
    #[error(transparent)]
    Failed(#[from] AppError),
}

/// Arguments handed to every task invocation.
#[derive(Debug, Clone)]
pub struct TaskArgs {
    /// Shared application handle.
    pub app: Arc<AppHandle>,
}

type TaskCallback =
    Box<dyn Fn(TaskArgs) -> BoxFuture<'static, Result<Option<Value>, AppError>> + Send + Sync>;

/// Directory of named asynchronous tasks.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: IndexMap<String, TaskCallback>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under `name`.
    ///
    /// Registering the same name twice replaces the earlier callback; the
    /// name keeps its original slot in the listing.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(TaskArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, AppError>> + Send + 'static,
    {
        let name = name.into();
        tracing::debug!(task = %name, "Registering task");
        self.tasks
            .insert(name, Box::new(move |args| Box::pin(callback(args))));
    }

    /// Invoke the task registered under `name`.
    ///
    /// Unknown names fail with [`TaskError::Unknown`]; failures from the task
    /// itself come back as [`TaskError::Failed`] wrapping the original error.
    pub async fn invoke(&self, name: &str, args: TaskArgs) -> Result<Option<Value>, TaskError> {
        let callback = self
            .tasks
            .get(name)
            .ok_or_else(|| TaskError::Unknown(name.to_string()))?;

        tracing::debug!(task = %name, "Invoking task");
        Ok(callback(args).await?)
    }

    /// Task names in registration order, announced on the log.
    pub fn list(&self) -> Vec<String> {
        let names = self.names();
        tracing::info!(tasks = ?names, "Available tasks");
        names
    }

    /// Task names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.names())
            .finish()
    }
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Unknown(_) => AppError::not_found(err.to_string()),
            TaskError::Failed(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use uuid::Uuid;

    use armature_core::config::AppConfig;
    use armature_core::env::{EnvProfile, RuntimeEnv};

    fn test_args() -> TaskArgs {
        TaskArgs {
            app: Arc::new(AppHandle {
                config: AppConfig::default(),
                runtime: RuntimeEnv {
                    profile: EnvProfile::Test,
                    instance: "test.dev".to_string(),
                },
                plugins: Vec::new(),
                host_id: Uuid::new_v4(),
            }),
        }
    }

    #[tokio::test]
    async fn invoking_unknown_task_names_the_task() {
        let registry = TaskRegistry::new();

        let err = registry
            .invoke("db:migrate", test_args())
            .await
            .expect_err("unknown task must be rejected");

        match err {
            TaskError::Unknown(ref name) => assert_eq!(name, "db:migrate"),
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Cannot invoke unknown task `db:migrate`",
        );
    }

    #[tokio::test]
    async fn invoke_returns_the_task_value() {
        let mut registry = TaskRegistry::new();
        registry.register("greet", |_args| async {
            Ok(Some(json!({ "hello": "world" })))
        });

        let value = registry
            .invoke("greet", test_args())
            .await
            .expect("task should succeed");

        assert_eq!(value, Some(json!({ "hello": "world" })));
    }

    #[tokio::test]
    async fn tasks_may_complete_without_a_value() {
        let mut registry = TaskRegistry::new();
        registry.register("noop", |_args| async { Ok(None) });

        let value = registry
            .invoke("noop", test_args())
            .await
            .expect("task should succeed");

        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn task_failures_pass_through_unmodified() {
        let mut registry = TaskRegistry::new();
        registry.register("explode", |_args| async {
            Err(AppError::internal("task exploded"))
        });

        let err = registry
            .invoke("explode", test_args())
            .await
            .expect_err("task failure must propagate");

        match err {
            TaskError::Failed(inner) => assert_eq!(inner.message, "task exploded"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tasks_receive_the_application_handle() {
        let mut registry = TaskRegistry::new();
        registry.register("whoami", |args: TaskArgs| async move {
            Ok(Some(json!({ "instance": args.app.runtime.instance })))
        });

        let value = registry
            .invoke("whoami", test_args())
            .await
            .expect("task should succeed");

        assert_eq!(value, Some(json!({ "instance": "test.dev" })));
    }

    #[tokio::test]
    async fn re_registering_replaces_the_callback_in_place() {
        let mut registry = TaskRegistry::new();
        registry.register("a", |_args| async { Ok(Some(json!(1))) });
        registry.register("dup", |_args| async { Ok(Some(json!("first"))) });
        registry.register("b", |_args| async { Ok(Some(json!(2))) });
        registry.register("dup", |_args| async { Ok(Some(json!("second"))) });

        assert_eq!(registry.names(), vec!["a", "dup", "b"]);

        let value = registry
            .invoke("dup", test_args())
            .await
            .expect("task should succeed");
        assert_eq!(value, Some(json!("second")));
    }

    #[test]
    fn conversion_to_app_error_keeps_the_original_failure() {
        use armature_core::error::ErrorKind;

        let unknown = AppError::from(TaskError::Unknown("db:migrate".to_string()));
        assert_eq!(unknown.kind, ErrorKind::NotFound);
        assert!(unknown.message.contains("db:migrate"));

        let failed = AppError::from(TaskError::Failed(AppError::validation("bad input")));
        assert_eq!(failed.kind, ErrorKind::Validation);
        assert_eq!(failed.message, "bad input");
    }

    #[tokio::test]
    async fn names_come_back_in_registration_order() {
        let mut registry = TaskRegistry::new();
        registry.register("cache:clear", |_args| async { Ok(None) });
        registry.register("db:migrate", |_args| async { Ok(None) });
        registry.register("audit:report", |_args| async { Ok(None) });

        assert_eq!(
            registry.names(),
            vec!["cache:clear", "db:migrate", "audit:report"],
        );
        assert_eq!(registry.list(), registry.names());
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("db:migrate"));
        assert!(!registry.contains("db:rollback"));
    }
}
