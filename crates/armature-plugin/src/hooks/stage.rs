//! Lifecycle stage definitions.

use std::fmt;

/// Enumeration of the five lifecycle stages.
///
/// Stage names keep their camelCase form in logs and error messages; that is
/// the name plugins and operators know them by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs before the host mounts its standard middleware. Ordered,
    /// fail-fast, synchronous.
    BeforeMiddlewareLoad,
    /// Runs after the standard middleware is mounted. Ordered, fail-fast,
    /// synchronous.
    AfterMiddlewareLoad,
    /// The launch gate: every participant votes go or no-go before the
    /// listener opens. Ordered, error-collecting.
    BeforeStart,
    /// Runs once the listener is accepting connections. Concurrent,
    /// error-collecting.
    AppReady,
    /// Runs after a termination signal, before the process exits. Ordered,
    /// error-collecting.
    BeforeExit,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 5] = [
        Stage::BeforeMiddlewareLoad,
        Stage::AfterMiddlewareLoad,
        Stage::BeforeStart,
        Stage::AppReady,
        Stage::BeforeExit,
    ];

    /// Returns the string name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeMiddlewareLoad => "beforeMiddlewareLoad",
            Self::AfterMiddlewareLoad => "afterMiddlewareLoad",
            Self::BeforeStart => "beforeStart",
            Self::AppReady => "appReady",
            Self::BeforeExit => "beforeExit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
