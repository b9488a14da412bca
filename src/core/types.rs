use serde::{Deserialize, Serialize};

/// Run status enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunStatus {
    #[default]
    Preparing,
    Running,
    Completed,
    Aborted,
}

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    ConfigurationError,
    StagingError,
    StepExecutionError,
    StructuralEditError,
    ValidationError,
    IoError,
    InternalError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}

/// Severity assigned to a single step outcome, used for logging and
/// run summaries. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepSeverity {
    Error,
    Warning,
    NoOp,
    Success,
    Skipped,
}

impl StepSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepSeverity::Error => "error",
            StepSeverity::Warning => "warning",
            StepSeverity::NoOp => "no-op",
            StepSeverity::Success => "success",
            StepSeverity::Skipped => "skipped",
        }
    }
}
