use crate::core::transform::step::Step;
use std::path::{Path, PathBuf};

/// Ordered list of steps supplied by the caller. Registration and
/// authoring of templates live outside this crate; the engine only
/// consumes the ordered list.
pub struct TransformationTemplate {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl TransformationTemplate {
    pub fn new(name: impl Into<String>, description: impl Into<String>, steps: Vec<Step>) -> Self {
        TransformationTemplate {
            name: name.into(),
            description: description.into(),
            steps,
        }
    }

    /// Number of top-level operations, counting a fan-out step as one.
    pub fn operation_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| !matches!(s, Step::Utility(_)))
            .count()
    }
}

/// One transformation run request. Immutable after creation except for the
/// derived output location, which the engine sets exactly once before the
/// first step runs.
pub struct Transformation {
    pub source: PathBuf,
    pub output_parent: Option<PathBuf>,
    pub template: TransformationTemplate,
    transformed_location: Option<PathBuf>,
}

impl Transformation {
    pub fn new(
        source: impl Into<PathBuf>,
        output_parent: Option<PathBuf>,
        template: TransformationTemplate,
    ) -> Self {
        Transformation {
            source: source.into(),
            output_parent,
            template,
            transformed_location: None,
        }
    }

    pub fn transformed_location(&self) -> Option<&Path> {
        self.transformed_location.as_deref()
    }

    pub(crate) fn set_transformed_location(&mut self, location: PathBuf) {
        if self.transformed_location.is_some() {
            tracing::warn!("transformed location already set, keeping first value");
            return;
        }
        self.transformed_location = Some(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::core::transform::context::TransformationContext;
    use crate::core::transform::result::{OperationOutcome, UtilityOutcome};
    use crate::core::transform::step::StepSpec;

    #[test]
    fn test_transformed_location_set_once() {
        let template = TransformationTemplate::new("empty", "no steps", vec![]);
        let mut transformation = Transformation::new("/tmp/app", None, template);
        assert!(transformation.transformed_location().is_none());

        transformation.set_transformed_location(PathBuf::from("/tmp/app-transformed-1"));
        transformation.set_transformed_location(PathBuf::from("/tmp/app-transformed-2"));
        assert_eq!(
            transformation.transformed_location(),
            Some(Path::new("/tmp/app-transformed-1"))
        );
    }

    #[test]
    fn test_operation_count_excludes_plain_utilities() {
        fn probe(
            _root: &Path,
            _ctx: &TransformationContext,
        ) -> Result<UtilityOutcome, AppError> {
            Ok(UtilityOutcome::Null)
        }
        fn touch(
            _target: &Path,
            _ctx: &TransformationContext,
        ) -> Result<OperationOutcome, AppError> {
            Ok(OperationOutcome::NoOp {
                details: "nothing".into(),
            })
        }
        let steps = vec![
            Step::utility(StepSpec::utility("probe", "Probe"), probe),
            Step::operation(StepSpec::operation("touch", "Touch"), "pom.xml", touch),
        ];
        let template = TransformationTemplate::new("sample", "one op", steps);
        assert_eq!(template.operation_count(), 1);
    }
}
