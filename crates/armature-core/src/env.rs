//! Process environment model.
//!
//! Covers three related concerns: the deployment profile and instance
//! identity parsed from the environment, the registry of environment
//! variables declared by plugins, and the startup check that verifies the
//! process environment against those declarations.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::AppError;

/// Variables the host itself always requires.
pub const CORE_REQUIRED_VARS: &[&str] = &["ARMATURE_ENV"];

/// Variables the host understands but does not require.
pub const CORE_OPTIONAL_VARS: &[&str] = &["ARMATURE_APP_NAME", "ARMATURE_INSTANCE_ID"];

/// Deployment profile parsed from `ARMATURE_ENV`.
///
/// Unknown or missing values fall back to [`EnvProfile::Development`]; the
/// startup environment check still reports the missing variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvProfile {
    Development,
    Production,
    Test,
}

impl EnvProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl From<&str> for EnvProfile {
    fn from(value: &str) -> Self {
        match value {
            "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }
}

impl fmt::Display for EnvProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the running process, assembled from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    /// Deployment profile.
    pub profile: EnvProfile,
    /// Instance label used in logs, e.g. `my-app.1a2b3c4d`.
    pub instance: String,
}

impl RuntimeEnv {
    /// Assemble the runtime identity from the process environment.
    ///
    /// The instance label joins `ARMATURE_APP_NAME` (default `armature-app`)
    /// with the first 8 characters of `ARMATURE_INSTANCE_ID` (default `dev`).
    pub fn from_env() -> Self {
        let profile = EnvProfile::from(
            non_empty_var("ARMATURE_ENV").unwrap_or_default().as_str(),
        );
        let app_name =
            non_empty_var("ARMATURE_APP_NAME").unwrap_or_else(|| "armature-app".to_string());
        let instance_id = non_empty_var("ARMATURE_INSTANCE_ID")
            .map(|id| id.chars().take(8).collect::<String>())
            .unwrap_or_else(|| "dev".to_string());

        Self {
            profile,
            instance: format!("{app_name}.{instance_id}"),
        }
    }
}

/// Assembled requirement lists: core names plus plugin declarations,
/// sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReport {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

/// Registry of environment variables declared by plugins.
///
/// Names have set semantics: the same variable declared by several plugins
/// collapses into one entry.
#[derive(Debug, Clone, Default)]
pub struct EnvRequirements {
    required: BTreeSet<String>,
    optional: BTreeSet<String>,
}

impl EnvRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable the process cannot run without.
    pub fn add_required(&mut self, name: impl Into<String>) {
        self.required.insert(name.into());
    }

    /// Declare a variable the process reads when present.
    pub fn add_optional(&mut self, name: impl Into<String>) {
        self.optional.insert(name.into());
    }

    /// Full requirement lists, merging the core names with everything
    /// plugins declared.
    pub fn report(&self) -> EnvReport {
        let mut required: BTreeSet<String> =
            CORE_REQUIRED_VARS.iter().map(|s| s.to_string()).collect();
        required.extend(self.required.iter().cloned());

        let mut optional: BTreeSet<String> =
            CORE_OPTIONAL_VARS.iter().map(|s| s.to_string()).collect();
        optional.extend(self.optional.iter().cloned());

        EnvReport {
            required: required.into_iter().collect(),
            optional: optional.into_iter().collect(),
        }
    }

    /// Check the process environment against the declared requirements.
    ///
    /// Every missing required variable is logged at error level and collected
    /// into the returned configuration error; missing optional variables are
    /// logged at warn level only. A variable set to the empty string counts
    /// as missing.
    pub fn check(&self) -> Result<(), AppError> {
        let report = self.report();
        let mut missing = Vec::new();

        for name in &report.required {
            if non_empty_var(name).is_none() {
                tracing::error!(name = %name, "Missing required environment variable");
                missing.push(name.clone());
            }
        }

        for name in &report.optional {
            if non_empty_var(name).is_none() {
                tracing::warn!(name = %name, "Optional environment variable not set");
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
