//! Convenience result type alias for Armature.

use crate::error::AppError;

/// A specialized `Result` type for Armature operations.
///
/// Defined once so that every crate does not need to spell out
/// `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
