//! Stage failure types.
//!
//! Two distinct shapes, because callers branch on them: a fail-fast stage
//! surfaces the single [`HookError`] of the participant that broke it, while
//! a collecting stage gathers every participant failure into [`HookErrors`]
//! and raises that only after all participants have been attempted.

use std::fmt;

use thiserror::Error;

use armature_core::AppError;
use armature_core::error::ErrorKind;

use super::stage::Stage;

/// One participant's failure, attributed to its stage and plugin.
#[derive(Debug, Error)]
#[error("Hook {stage} failed in plugin '{plugin}': {source}")]
pub struct HookError {
    /// Stage that was executing.
    pub stage: Stage,
    /// Display name of the failing participant.
    pub plugin: String,
    /// The participant's original error, preserved unmodified.
    #[source]
    pub source: AppError,
}

/// Aggregated failure of a collecting stage.
///
/// Holds one record per failing participant, in reporting order
/// (registration order for sequential stages, settle order for the
/// concurrent stage). Records are keyed by participant name: when the same
/// name is registered twice in one stage and both registrations fail, the
/// later failure replaces the earlier record while keeping its position.
/// Participants that succeeded never appear.
#[derive(Debug)]
pub struct HookErrors {
    stage: Stage,
    errors: Vec<HookError>,
}

impl HookErrors {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage,
            errors: Vec::new(),
        }
    }

    /// Record a participant failure, collapsing on the participant name.
    pub(crate) fn record(&mut self, error: HookError) {
        match self.errors.iter_mut().find(|e| e.plugin == error.plugin) {
            Some(existing) => *existing = error,
            None => self.errors.push(error),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Per-participant failure records in reporting order.
    pub fn errors(&self) -> &[HookError] {
        &self.errors
    }

    /// Names of the failing participants, in reporting order.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.plugin.as_str())
    }
}

impl fmt::Display for HookErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() > 1 {
            write!(f, "Errors encountered in hook {}", self.stage)
        } else {
            write!(f, "Error encountered in hook {}", self.stage)
        }
    }
}

impl std::error::Error for HookErrors {}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::Plugin, message, err)
    }
}

impl From<HookErrors> for AppError {
    fn from(err: HookErrors) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::Plugin, message, err)
    }
}
