use crate::core::editor::lines;
use crate::core::error::AppError;
use crate::core::transform::context::TransformationContext;
use crate::core::transform::result::OperationOutcome;
use crate::core::transform::step::{OperationExec, OperationStep, Step, StepSpec};
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Path, PathBuf};

/// Removes a key definition from a line-oriented properties file. A
/// missing file or missing key is a no-op, never an error.
#[derive(Clone)]
pub struct RemoveProperty {
    key: String,
}

impl RemoveProperty {
    pub fn new(key: impl Into<String>) -> Result<Self, AppError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "property key must not be blank",
            ));
        }
        Ok(RemoveProperty { key })
    }

    pub fn into_step(self, relative_path: impl Into<PathBuf>) -> Step {
        Step::Operation(self.into_operation_step(relative_path))
    }

    pub fn into_operation_step(self, relative_path: impl Into<PathBuf>) -> OperationStep {
        let relative_path = relative_path.into();
        let spec = StepSpec::operation(
            format!("remove-property-{}", self.key),
            format!(
                "Remove property {} from file {}",
                self.key,
                relative_path.display()
            ),
        );
        OperationStep {
            spec,
            relative_path,
            exec: Box::new(self),
        }
    }
}

impl OperationExec for RemoveProperty {
    fn execute(
        &self,
        target: &Path,
        _ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError> {
        if !target.exists() {
            return Ok(OperationOutcome::NoOp {
                details: format!("File {} does not exist", target.display()),
            });
        }

        let content = fs::read_to_string(target).map_err(|e| {
            AppError::new(
                ErrorCategory::StepExecutionError,
                format!("could not read {}: {}", target.display(), e),
            )
        })?;

        match lines::remove_key(&content, &self.key) {
            None => Ok(OperationOutcome::NoOp {
                details: format!(
                    "Property {} is not defined in {}",
                    self.key,
                    target.display()
                ),
            }),
            Some(edited) => {
                fs::write(target, &edited).map_err(|e| {
                    AppError::new(
                        ErrorCategory::StepExecutionError,
                        format!("could not write {}: {}", target.display(), e),
                    )
                })?;
                Ok(OperationOutcome::Success {
                    details: format!(
                        "Property {} has been removed from {}",
                        self.key,
                        target.display()
                    ),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_remove() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("application.properties");
        fs::write(&target, "foo=foov\nbar=barv\nfoofoo=foofoov\n").unwrap();
        let ctx = TransformationContext::new();

        let op = RemoveProperty::new("bar").unwrap();
        let outcome = op.execute(&target, &ctx).unwrap();
        assert!(matches!(outcome, OperationOutcome::Success { .. }));
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "foo=foov\nfoofoo=foofoov\n"
        );
    }

    #[test]
    fn test_missing_key_is_noop_and_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("application.properties");
        let original = "foo=foov\n";
        fs::write(&target, original).unwrap();
        let ctx = TransformationContext::new();

        let op = RemoveProperty::new("zeta").unwrap();
        let outcome = op.execute(&target, &ctx).unwrap();
        assert!(matches!(outcome, OperationOutcome::NoOp { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), original);
    }

    #[test]
    fn test_missing_file_is_noop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ctx = TransformationContext::new();
        let op = RemoveProperty::new("foo").unwrap();
        let outcome = op
            .execute(&tmp.path().join("application_zeta.properties"), &ctx)
            .unwrap();
        assert!(matches!(outcome, OperationOutcome::NoOp { .. }));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(RemoveProperty::new("  ").is_err());
    }
}
