use crate::core::error::AppError;
use crate::core::transform::context::TransformationContext;
use crate::core::transform::step::{FanOutExec, OperationStep, Step, StepSpec};
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Path, PathBuf};

/// Fan-out over every file in the output tree with a given name. Each
/// match is handed to a factory that builds the operation to run against
/// that file.
pub struct FindFiles {
    file_name: String,
    factory: Box<dyn Fn(&Path) -> OperationStep + Send + Sync>,
}

impl FindFiles {
    pub fn new<F>(file_name: impl Into<String>, factory: F) -> Result<Self, AppError>
    where
        F: Fn(&Path) -> OperationStep + Send + Sync + 'static,
    {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "file name to search for must not be blank",
            ));
        }
        Ok(FindFiles {
            file_name,
            factory: Box::new(factory),
        })
    }

    pub fn into_step(self) -> Step {
        let spec = StepSpec::fan_out(
            format!("find-files-{}", self.file_name),
            format!("Run an operation over every {} in the tree", self.file_name),
        );
        Step::fan_out(spec, self)
    }

    /// Depth-first walk collecting tree-relative paths of matching files.
    /// Entries are visited in sorted order so runs are deterministic.
    fn collect(&self, root: &Path, dir: &Path, matches: &mut Vec<PathBuf>) -> Result<(), AppError> {
        let read = fs::read_dir(dir).map_err(|e| {
            AppError::new(
                ErrorCategory::StepExecutionError,
                format!("could not read directory {}: {}", dir.display(), e),
            )
        })?;
        let mut entries: Vec<PathBuf> = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| {
                AppError::new(
                    ErrorCategory::StepExecutionError,
                    format!("could not read directory {}: {}", dir.display(), e),
                )
            })?;
            entries.push(entry.path());
        }
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.collect(root, &path, matches)?;
            } else if path.file_name().and_then(|n| n.to_str()) == Some(self.file_name.as_str()) {
                let relative = path
                    .strip_prefix(root)
                    .map_err(|e| {
                        AppError::new(
                            ErrorCategory::InternalError,
                            format!("path {} escapes the tree root: {}", path.display(), e),
                        )
                    })?
                    .to_path_buf();
                matches.push(relative);
            }
        }
        Ok(())
    }
}

impl FanOutExec for FindFiles {
    fn expand(
        &self,
        root: &Path,
        _ctx: &TransformationContext,
    ) -> Result<Vec<OperationStep>, AppError> {
        let mut matches = Vec::new();
        self.collect(root, root, &mut matches)?;
        Ok(matches
            .into_iter()
            .map(|relative| (self.factory)(&relative))
            .collect())
    }
}
