//! # armature-tasks
//!
//! Directory of named administrative procedures. Tasks are async callbacks
//! registered against a string name and invoked on demand, typically from the
//! command line, outside the HTTP request path. Each invocation receives the
//! shared application handle and may return a JSON value for display.

pub mod registry;

pub use registry::{TaskArgs, TaskError, TaskRegistry};
