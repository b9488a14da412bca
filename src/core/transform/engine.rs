use crate::core::error::AppError;
use crate::core::transform::context::{ContextValue, TransformationContext};
use crate::core::transform::result::{
    ErrorSummary, ExecutionOutcome, OperationOutcome, PerformResult, SkipReason, UtilityOutcome,
};
use crate::core::transform::staging;
use crate::core::transform::step::{FanOutStep, OperationStep, Step, StepSpec, UtilityStep};
use crate::core::transform::template::Transformation;
use crate::core::types::{RunStatus, StepSeverity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// One line of the run report: a step invocation with its order label and
/// folded outcome.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// "n" for top-level operations, "n.m" for fan-out children, "-" for
    /// utilities.
    pub order: String,
    pub name: String,
    pub severity: StepSeverity,
    pub details: String,
}

/// Step that stopped the run, with the failure that triggered the abort.
#[derive(Debug, Clone, Serialize)]
pub struct AbortInfo {
    pub step: String,
    pub cause: ErrorSummary,
}

/// Complete record of one transformation run, serializable for reporting.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub template: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status: RunStatus,
    pub aborted: Option<AbortInfo>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Worst severity observed across all steps, for the summary line.
    pub fn worst_severity(&self) -> Option<StepSeverity> {
        self.steps.iter().map(|s| s.severity).min()
    }
}

struct RunState {
    root: PathBuf,
    ctx: TransformationContext,
    recorded: HashMap<String, PerformResult>,
    steps: Vec<StepReport>,
}

/// Runs every step of a transformation in declaration order on a single
/// thread, against a staged copy of the source tree.
pub struct TransformationEngine;

impl TransformationEngine {
    pub fn new() -> Self {
        TransformationEngine
    }

    /// Stage the output tree and run the template over it. Staging and
    /// configuration failures are returned as errors; step failures are
    /// folded into the report and, depending on each step's failure
    /// policy, may abort the run.
    pub fn perform(&self, transformation: &mut Transformation) -> Result<RunReport, AppError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(
            %run_id,
            template = %transformation.template.name,
            source = %transformation.source.display(),
            "beginning transformation"
        );

        let root = staging::prepare_output_tree(
            &transformation.source,
            transformation.output_parent.as_deref(),
            started_at,
        )?;
        transformation.set_transformed_location(root.clone());
        tracing::info!(output = %root.display(), "output tree staged");

        let mut state = RunState {
            root,
            ctx: TransformationContext::new(),
            recorded: HashMap::new(),
            steps: Vec::new(),
        };

        let operation_total = transformation.template.operation_count();
        let mut operation_order: u32 = 0;
        let mut aborted: Option<AbortInfo> = None;

        for step in &transformation.template.steps {
            let label = match step {
                Step::Utility(_) => "-".to_string(),
                Step::Operation(_) | Step::FanOut(_) => {
                    operation_order += 1;
                    operation_order.to_string()
                }
            };
            tracing::debug!(
                order = %label,
                step = %step.spec().name,
                total = operation_total,
                "dispatching step"
            );

            let abort = match step {
                Step::Utility(utility) => self.run_utility(utility, &label, &mut state),
                Step::Operation(operation) => self.run_operation(operation, &label, &mut state),
                Step::FanOut(fan_out) => self.run_fan_out(fan_out, &label, &mut state),
            };
            if let Some(info) = abort {
                tracing::error!(step = %info.step, "aborting run: {}", info.cause.message);
                aborted = Some(info);
                break;
            }
        }

        let status = if aborted.is_some() {
            RunStatus::Aborted
        } else {
            RunStatus::Completed
        };
        let report = RunReport {
            run_id,
            template: transformation.template.name.clone(),
            source: transformation.source.clone(),
            output: state.root,
            started_at,
            completed_at: Utc::now(),
            status: status.clone(),
            aborted,
            steps: state.steps,
        };
        tracing::info!(%run_id, status = ?status, "transformation finished");
        Ok(report)
    }

    fn run_utility(
        &self,
        utility: &UtilityStep,
        label: &str,
        state: &mut RunState,
    ) -> Option<AbortInfo> {
        let result = match self.resolve_skip(&utility.spec, state) {
            Some(skipped) => skipped,
            None => match utility.exec.execute(&state.root, &state.ctx) {
                Ok(outcome) => PerformResult::Executed(ExecutionOutcome::Utility(outcome)),
                Err(error) => PerformResult::Error {
                    cause: ErrorSummary::from_app_error(&error),
                },
            },
        };
        self.finish_step(label, &utility.spec, result, state)
    }

    fn run_operation(
        &self,
        operation: &OperationStep,
        label: &str,
        state: &mut RunState,
    ) -> Option<AbortInfo> {
        let result = match self.resolve_skip(&operation.spec, state) {
            Some(skipped) => skipped,
            None => {
                let target = operation.resolve_target(&state.root);
                match operation.exec.execute(&target, &state.ctx) {
                    Ok(outcome) => PerformResult::Executed(ExecutionOutcome::Operation(outcome)),
                    Err(error) => PerformResult::Error {
                        cause: ErrorSummary::from_app_error(&error),
                    },
                }
            }
        };
        self.finish_step(label, &operation.spec, result, state)
    }

    /// Expand a fan-out into its operations and run them immediately, each
    /// under a nested order label. The fan-out's own envelope records the
    /// list of files it expanded over.
    fn run_fan_out(
        &self,
        fan_out: &FanOutStep,
        label: &str,
        state: &mut RunState,
    ) -> Option<AbortInfo> {
        if let Some(skipped) = self.resolve_skip(&fan_out.spec, state) {
            return self.finish_step(label, &fan_out.spec, skipped, state);
        }

        let operations = match fan_out.exec.expand(&state.root, &state.ctx) {
            Ok(operations) => operations,
            Err(error) => {
                let result = PerformResult::Error {
                    cause: ErrorSummary::from_app_error(&error),
                };
                return self.finish_step(label, &fan_out.spec, result, state);
            }
        };

        tracing::info!(
            step = %fan_out.spec.name,
            count = operations.len(),
            "executing fan-out over {} files",
            operations.len()
        );

        let files: Vec<PathBuf> = operations
            .iter()
            .map(|op| op.relative_path.clone())
            .collect();
        let envelope = PerformResult::Executed(ExecutionOutcome::Utility(UtilityOutcome::Value(
            ContextValue::FileList(files),
        )));
        if let Some(info) = self.finish_step(label, &fan_out.spec, envelope, state) {
            return Some(info);
        }

        for (index, operation) in operations.iter().enumerate() {
            let nested_label = format!("{}.{}", label, index + 1);
            if let Some(info) = self.run_operation(operation, &nested_label, state) {
                return Some(info);
            }
        }
        None
    }

    /// Decide whether a step's body may run: dependencies are checked
    /// first, then preconditions. An unknown or never-ran dependency
    /// blocks exactly like a failed one.
    fn resolve_skip(&self, spec: &StepSpec, state: &RunState) -> Option<PerformResult> {
        for dependency in &spec.dependencies {
            let blocked = match state.recorded.get(dependency) {
                None => true,
                Some(result) => result.blocks_dependents(),
            };
            if blocked {
                return Some(PerformResult::Skipped {
                    reason: SkipReason::Dependency(format!(
                        "dependency '{}' did not complete successfully",
                        dependency
                    )),
                });
            }
        }
        for condition in &spec.preconditions {
            if !condition.evaluate(&state.root, &state.ctx) {
                return Some(PerformResult::Skipped {
                    reason: SkipReason::Condition(format!(
                        "condition not met: {}",
                        condition.label
                    )),
                });
            }
        }
        None
    }

    /// Record, log, and report one finished step; returns abort info when
    /// the step failed and its policy says the run must stop.
    fn finish_step(
        &self,
        label: &str,
        spec: &StepSpec,
        result: PerformResult,
        state: &mut RunState,
    ) -> Option<AbortInfo> {
        let severity = result.severity();
        let details = result.details();
        match severity {
            StepSeverity::Success | StepSeverity::Skipped => {
                tracing::info!(order = %label, step = %spec.name, outcome = severity.as_str(), "{}", details);
            }
            StepSeverity::NoOp | StepSeverity::Warning => {
                tracing::warn!(order = %label, step = %spec.name, outcome = severity.as_str(), "{}", details);
            }
            StepSeverity::Error => {
                tracing::error!(order = %label, step = %spec.name, outcome = severity.as_str(), "{}", details);
            }
        }

        if spec.save_result {
            if let PerformResult::Executed(ExecutionOutcome::Utility(
                UtilityOutcome::Value(value) | UtilityOutcome::Warning { value, .. },
            )) = &result
            {
                state.ctx.put(spec.publish_key(), value.clone());
            }
            state.ctx.put_result(&spec.name, result.clone());
        }
        state.recorded.insert(spec.name.clone(), result.clone());
        state.steps.push(StepReport {
            order: label.to_string(),
            name: spec.name.clone(),
            severity,
            details,
        });

        if severity == StepSeverity::Error && spec.abort_on_failure {
            let cause = match &result {
                PerformResult::Error { cause } => cause.clone(),
                PerformResult::Executed(ExecutionOutcome::Operation(
                    OperationOutcome::Error { cause },
                )) => cause.clone(),
                PerformResult::Executed(ExecutionOutcome::Utility(UtilityOutcome::Error {
                    cause,
                })) => cause.clone(),
                _ => ErrorSummary::new(
                    crate::core::types::ErrorCategory::InternalError,
                    "step failed",
                ),
            };
            return Some(AbortInfo {
                step: spec.name.clone(),
                cause,
            });
        }
        None
    }
}

impl Default for TransformationEngine {
    fn default() -> Self {
        TransformationEngine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::template::TransformationTemplate;
    use std::fs;
    use std::path::Path;

    fn succeed(
        _target: &Path,
        _ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError> {
        Ok(OperationOutcome::Success {
            details: "done".into(),
        })
    }

    fn fail(
        _target: &Path,
        _ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError> {
        Ok(OperationOutcome::Error {
            cause: ErrorSummary::new(
                crate::core::types::ErrorCategory::StepExecutionError,
                "boom",
            ),
        })
    }

    fn seeded_source() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("app");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("pom.xml"), "<project/>").unwrap();
        (tmp, source)
    }

    #[test]
    fn test_order_labels_and_completion() {
        let (_tmp, source) = seeded_source();
        fn locate(
            _root: &Path,
            _ctx: &TransformationContext,
        ) -> Result<UtilityOutcome, AppError> {
            Ok(UtilityOutcome::Value(ContextValue::Text("pom.xml".into())))
        }
        let steps = vec![
            Step::utility(StepSpec::utility("locate", "Locate descriptor"), locate),
            Step::operation(StepSpec::operation("first", "First edit"), "pom.xml", succeed),
            Step::operation(StepSpec::operation("second", "Second edit"), "pom.xml", succeed),
        ];
        let template = TransformationTemplate::new("sample", "three steps", steps);
        let mut transformation = Transformation::new(&source, None, template);

        let report = TransformationEngine::new()
            .perform(&mut transformation)
            .unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        let labels: Vec<&str> = report.steps.iter().map(|s| s.order.as_str()).collect();
        assert_eq!(labels, vec!["-", "1", "2"]);
        assert!(transformation.transformed_location().is_some());
    }

    #[test]
    fn test_abort_stops_remaining_steps() {
        let (_tmp, source) = seeded_source();
        let steps = vec![
            Step::operation(StepSpec::operation("breaks", "Fails"), "pom.xml", fail),
            Step::operation(StepSpec::operation("never", "Unreached"), "pom.xml", succeed),
        ];
        let template = TransformationTemplate::new("sample", "aborts", steps);
        let mut transformation = Transformation::new(&source, None, template);

        let report = TransformationEngine::new()
            .perform(&mut transformation)
            .unwrap();
        assert_eq!(report.status, RunStatus::Aborted);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.aborted.as_ref().unwrap().step, "breaks");
        assert_eq!(report.worst_severity(), Some(StepSeverity::Error));
    }

    #[test]
    fn test_non_aborting_failure_continues() {
        let (_tmp, source) = seeded_source();
        let steps = vec![
            Step::operation(
                StepSpec::operation("tolerated", "Fails quietly").abort_on_failure(false),
                "pom.xml",
                fail,
            ),
            Step::operation(StepSpec::operation("still-runs", "Runs"), "pom.xml", succeed),
        ];
        let template = TransformationTemplate::new("sample", "continues", steps);
        let mut transformation = Transformation::new(&source, None, template);

        let report = TransformationEngine::new()
            .perform(&mut transformation)
            .unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[1].severity, StepSeverity::Success);
    }

    #[test]
    fn test_unknown_dependency_skips() {
        let (_tmp, source) = seeded_source();
        let steps = vec![Step::operation(
            StepSpec::operation("dependent", "Needs ghost").with_dependency("ghost"),
            "pom.xml",
            succeed,
        )];
        let template = TransformationTemplate::new("sample", "skips", steps);
        let mut transformation = Transformation::new(&source, None, template);

        let report = TransformationEngine::new()
            .perform(&mut transformation)
            .unwrap();
        assert_eq!(report.steps[0].severity, StepSeverity::Skipped);
        assert_eq!(report.status, RunStatus::Completed);
    }

    #[test]
    fn test_missing_source_is_configuration_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let template = TransformationTemplate::new("sample", "empty", vec![]);
        let mut transformation =
            Transformation::new(tmp.path().join("not-there"), None, template);

        let err = TransformationEngine::new()
            .perform(&mut transformation)
            .unwrap_err();
        assert!(err.is_fatal_pre_run());
    }
}
