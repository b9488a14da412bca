use crate::core::error::AppError;
use crate::core::transform::context::ContextValue;
use crate::core::types::{ErrorCategory, StepSeverity};
use serde::Serialize;

/// Redacted, storable summary of an error attached to a result envelope.
/// Result envelopes outlive the `AppError` values that produced them, so
/// causes are captured as plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub code: String,
    pub category: String,
    pub message: String,
}

impl ErrorSummary {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        ErrorSummary {
            code: String::new(),
            category: category.to_string(),
            message: message.into(),
        }
    }

    pub fn from_app_error(error: &AppError) -> Self {
        ErrorSummary {
            code: error.code.clone(),
            category: error.category.to_string(),
            message: error.message.clone(),
        }
    }
}

/// Why a step body never ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// A declared precondition evaluated false.
    Condition(String),
    /// A declared dependency was itself skipped or failed.
    Dependency(String),
}

/// Outcome of an operation's execution against the output tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperationOutcome {
    /// The tree was mutated as requested.
    Success { details: String },
    /// The operation determined no change was needed.
    NoOp { details: String },
    /// The mutation happened but the operation flags one or more anomalies.
    Warning {
        details: String,
        causes: Vec<ErrorSummary>,
    },
    /// The operation classified its own execution as failed.
    Error { cause: ErrorSummary },
}

/// Outcome of a read-only utility's execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UtilityOutcome {
    /// The utility legitimately has nothing to report.
    Null,
    /// The utility computed a value, publishable to the context.
    Value(ContextValue),
    Warning {
        value: ContextValue,
        causes: Vec<ErrorSummary>,
    },
    Error { cause: ErrorSummary },
}

/// Execution outcome, tagged by step shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExecutionOutcome {
    Operation(OperationOutcome),
    Utility(UtilityOutcome),
}

/// Full result envelope for one step invocation. Exactly one variant is
/// ever active; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PerformResult {
    Skipped { reason: SkipReason },
    Executed(ExecutionOutcome),
    Error { cause: ErrorSummary },
}

impl PerformResult {
    pub fn severity(&self) -> StepSeverity {
        match self {
            PerformResult::Skipped { .. } => StepSeverity::Skipped,
            PerformResult::Error { .. } => StepSeverity::Error,
            PerformResult::Executed(outcome) => match outcome {
                ExecutionOutcome::Operation(op) => match op {
                    OperationOutcome::Success { .. } => StepSeverity::Success,
                    OperationOutcome::NoOp { .. } => StepSeverity::NoOp,
                    OperationOutcome::Warning { .. } => StepSeverity::Warning,
                    OperationOutcome::Error { .. } => StepSeverity::Error,
                },
                ExecutionOutcome::Utility(ut) => match ut {
                    UtilityOutcome::Value(_) => StepSeverity::Success,
                    UtilityOutcome::Null => StepSeverity::NoOp,
                    UtilityOutcome::Warning { .. } => StepSeverity::Warning,
                    UtilityOutcome::Error { .. } => StepSeverity::Error,
                },
            },
        }
    }

    /// Human-readable details line for logs and run reports.
    pub fn details(&self) -> String {
        match self {
            PerformResult::Skipped {
                reason: SkipReason::Condition(details),
            } => details.clone(),
            PerformResult::Skipped {
                reason: SkipReason::Dependency(details),
            } => details.clone(),
            PerformResult::Error { cause } => cause.message.clone(),
            PerformResult::Executed(outcome) => match outcome {
                ExecutionOutcome::Operation(op) => match op {
                    OperationOutcome::Success { details }
                    | OperationOutcome::NoOp { details }
                    | OperationOutcome::Warning { details, .. } => details.clone(),
                    OperationOutcome::Error { cause } => cause.message.clone(),
                },
                ExecutionOutcome::Utility(ut) => match ut {
                    UtilityOutcome::Null => String::new(),
                    UtilityOutcome::Value(_) | UtilityOutcome::Warning { .. } => {
                        "value computed".to_string()
                    }
                    UtilityOutcome::Error { cause } => cause.message.clone(),
                },
            },
        }
    }

    /// A dependent step must be skipped when its dependency never ran or
    /// failed.
    pub fn blocks_dependents(&self) -> bool {
        matches!(self, PerformResult::Skipped { .. })
            || self.severity() == StepSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_is_error_first() {
        assert!(StepSeverity::Error < StepSeverity::Warning);
        assert!(StepSeverity::Warning < StepSeverity::NoOp);
        assert!(StepSeverity::NoOp < StepSeverity::Success);
        assert!(StepSeverity::Success < StepSeverity::Skipped);
    }

    #[test]
    fn test_operation_outcome_severities() {
        let success = PerformResult::Executed(ExecutionOutcome::Operation(
            OperationOutcome::Success {
                details: "added".into(),
            },
        ));
        assert_eq!(success.severity(), StepSeverity::Success);
        assert!(!success.blocks_dependents());

        let error = PerformResult::Executed(ExecutionOutcome::Operation(
            OperationOutcome::Error {
                cause: ErrorSummary::new(ErrorCategory::StepExecutionError, "already present"),
            },
        ));
        assert_eq!(error.severity(), StepSeverity::Error);
        assert!(error.blocks_dependents());
    }

    #[test]
    fn test_skipped_blocks_dependents() {
        let skipped = PerformResult::Skipped {
            reason: SkipReason::Condition("condition false".into()),
        };
        assert_eq!(skipped.severity(), StepSeverity::Skipped);
        assert!(skipped.blocks_dependents());
    }

    #[test]
    fn test_utility_null_maps_to_noop_tier() {
        let null = PerformResult::Executed(ExecutionOutcome::Utility(UtilityOutcome::Null));
        assert_eq!(null.severity(), StepSeverity::NoOp);
    }
}
