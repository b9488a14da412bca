use crate::core::error::AppError;
use crate::core::transform::context::TransformationContext;
use crate::core::transform::result::{OperationOutcome, UtilityOutcome};
use std::path::{Path, PathBuf};

/// Boolean check evaluated against the output tree and the shared context
/// immediately before a step executes.
pub struct Precondition {
    pub label: String,
    check: Box<dyn Fn(&Path, &TransformationContext) -> bool + Send + Sync>,
}

impl Precondition {
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Path, &TransformationContext) -> bool + Send + Sync + 'static,
    {
        Precondition {
            label: label.into(),
            check: Box::new(check),
        }
    }

    /// Condition satisfied when the given tree-relative path exists.
    pub fn file_exists(relative_path: impl Into<PathBuf>) -> Self {
        let relative_path = relative_path.into();
        let label = format!("file {} exists", relative_path.display());
        Precondition::new(label, move |root, _ctx| root.join(&relative_path).exists())
    }

    /// Condition satisfied when the given context attribute has been
    /// published by an earlier step.
    pub fn context_has(key: impl Into<String>) -> Self {
        let key = key.into();
        let label = format!("context attribute '{}' present", key);
        Precondition::new(label, move |_root, ctx| ctx.get(&key).is_some())
    }

    pub fn evaluate(&self, root: &Path, ctx: &TransformationContext) -> bool {
        (self.check)(root, ctx)
    }
}

impl std::fmt::Debug for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Precondition")
            .field("label", &self.label)
            .finish()
    }
}

/// Immutable configuration record shared by every step shape.
///
/// Constructed through `StepSpec::operation` or `StepSpec::utility`, which
/// codify the default failure policy: operations abort the run on failure,
/// pure utilities log and continue.
#[derive(Debug)]
pub struct StepSpec {
    pub name: String,
    pub description: String,
    pub preconditions: Vec<Precondition>,
    pub dependencies: Vec<String>,
    pub abort_on_failure: bool,
    pub save_result: bool,
    pub context_attribute: Option<String>,
}

impl StepSpec {
    pub fn operation(name: impl Into<String>, description: impl Into<String>) -> Self {
        StepSpec {
            name: name.into(),
            description: description.into(),
            preconditions: Vec::new(),
            dependencies: Vec::new(),
            abort_on_failure: true,
            save_result: false,
            context_attribute: None,
        }
    }

    pub fn utility(name: impl Into<String>, description: impl Into<String>) -> Self {
        StepSpec {
            name: name.into(),
            description: description.into(),
            preconditions: Vec::new(),
            dependencies: Vec::new(),
            abort_on_failure: false,
            save_result: false,
            context_attribute: None,
        }
    }

    /// Fan-out steps abort the run when their own expansion fails; each
    /// expanded operation still carries its own failure policy.
    pub fn fan_out(name: impl Into<String>, description: impl Into<String>) -> Self {
        StepSpec {
            name: name.into(),
            description: description.into(),
            preconditions: Vec::new(),
            dependencies: Vec::new(),
            abort_on_failure: true,
            save_result: false,
            context_attribute: None,
        }
    }

    pub fn with_precondition(mut self, condition: Precondition) -> Self {
        self.preconditions.push(condition);
        self
    }

    pub fn with_dependency(mut self, step_name: impl Into<String>) -> Self {
        self.dependencies.push(step_name.into());
        self
    }

    pub fn abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = abort;
        self
    }

    pub fn save_result(mut self, save: bool) -> Self {
        self.save_result = save;
        self
    }

    /// Publish key used when saving a utility's computed value; defaults to
    /// the step name when unset.
    pub fn with_context_attribute(mut self, key: impl Into<String>) -> Self {
        self.context_attribute = Some(key.into());
        self
    }

    pub fn publish_key(&self) -> &str {
        self.context_attribute.as_deref().unwrap_or(&self.name)
    }
}

/// Read-only step body: may compute a value against the tree and context.
pub trait UtilityExec: Send + Sync {
    fn execute(
        &self,
        root: &Path,
        ctx: &TransformationContext,
    ) -> Result<UtilityOutcome, AppError>;
}

impl<F> UtilityExec for F
where
    F: Fn(&Path, &TransformationContext) -> Result<UtilityOutcome, AppError> + Send + Sync,
{
    fn execute(
        &self,
        root: &Path,
        ctx: &TransformationContext,
    ) -> Result<UtilityOutcome, AppError> {
        self(root, ctx)
    }
}

/// Tree-mutating step body. Receives the resolved absolute target path.
pub trait OperationExec: Send + Sync {
    fn execute(
        &self,
        target: &Path,
        ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError>;
}

impl<F> OperationExec for F
where
    F: Fn(&Path, &TransformationContext) -> Result<OperationOutcome, AppError> + Send + Sync,
{
    fn execute(
        &self,
        target: &Path,
        ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError> {
        self(target, ctx)
    }
}

/// Fan-out step body: yields an owned, fully parameterized list of
/// operations which the engine runs immediately, nested under this step's
/// order label.
pub trait FanOutExec: Send + Sync {
    fn expand(
        &self,
        root: &Path,
        ctx: &TransformationContext,
    ) -> Result<Vec<OperationStep>, AppError>;
}

pub struct UtilityStep {
    pub spec: StepSpec,
    pub exec: Box<dyn UtilityExec>,
}

pub struct OperationStep {
    pub spec: StepSpec,
    /// Target file path, relative to the output tree root; resolved at
    /// execution time.
    pub relative_path: PathBuf,
    pub exec: Box<dyn OperationExec>,
}

impl OperationStep {
    pub fn resolve_target(&self, root: &Path) -> PathBuf {
        root.join(&self.relative_path)
    }
}

pub struct FanOutStep {
    pub spec: StepSpec,
    pub exec: Box<dyn FanOutExec>,
}

/// One orderable unit of work in a transformation template.
pub enum Step {
    Utility(UtilityStep),
    Operation(OperationStep),
    FanOut(FanOutStep),
}

impl Step {
    pub fn utility(spec: StepSpec, exec: impl UtilityExec + 'static) -> Self {
        Step::Utility(UtilityStep {
            spec,
            exec: Box::new(exec),
        })
    }

    pub fn operation(
        spec: StepSpec,
        relative_path: impl Into<PathBuf>,
        exec: impl OperationExec + 'static,
    ) -> Self {
        Step::Operation(OperationStep {
            spec,
            relative_path: relative_path.into(),
            exec: Box::new(exec),
        })
    }

    pub fn fan_out(spec: StepSpec, exec: impl FanOutExec + 'static) -> Self {
        Step::FanOut(FanOutStep {
            spec,
            exec: Box::new(exec),
        })
    }

    pub fn spec(&self) -> &StepSpec {
        match self {
            Step::Utility(step) => &step.spec,
            Step::Operation(step) => &step.spec,
            Step::FanOut(step) => &step.spec,
        }
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Step::Operation(_))
    }
}
