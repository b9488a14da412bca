use crate::core::editor::lines;
use crate::core::error::AppError;
use crate::core::transform::context::TransformationContext;
use crate::core::transform::result::OperationOutcome;
use crate::core::transform::step::{OperationExec, OperationStep, Step, StepSpec};
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Path, PathBuf};

/// Appends a `key=value` definition to a line-oriented properties file.
/// A missing file or an already-defined key is a no-op, never an error;
/// existing content is preserved byte for byte.
#[derive(Clone)]
pub struct AddProperty {
    key: String,
    value: String,
}

impl AddProperty {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, AppError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "property key must not be blank",
            ));
        }
        Ok(AddProperty {
            key,
            value: value.into(),
        })
    }

    pub fn into_step(self, relative_path: impl Into<PathBuf>) -> Step {
        Step::Operation(self.into_operation_step(relative_path))
    }

    pub fn into_operation_step(self, relative_path: impl Into<PathBuf>) -> OperationStep {
        let relative_path = relative_path.into();
        let spec = StepSpec::operation(
            format!("add-property-{}", self.key),
            format!(
                "Add property {} to file {}",
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

impl OperationExec for AddProperty {
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

        if lines::defines_key(&content, &self.key) {
            return Ok(OperationOutcome::NoOp {
                details: format!(
                    "Property {} is already defined in {}",
                    self.key,
                    target.display()
                ),
            });
        }

        let edited = lines::append_key(&content, &self.key, &self.value);
        fs::write(target, &edited).map_err(|e| {
            AppError::new(
                ErrorCategory::StepExecutionError,
                format!("could not write {}: {}", target.display(), e),
            )
        })?;
        Ok(OperationOutcome::Success {
            details: format!(
                "Property {} has been added to {}",
                self.key,
                target.display()
            ),
        })
    }
}
