pub mod context;
pub mod engine;
pub mod result;
pub mod staging;
pub mod step;
pub mod template;

pub use context::{ContextValue, TransformationContext};
pub use engine::{AbortInfo, RunReport, StepReport, TransformationEngine};
pub use result::{
    ErrorSummary, ExecutionOutcome, OperationOutcome, PerformResult, SkipReason, UtilityOutcome,
};
pub use step::{
    FanOutExec, FanOutStep, OperationExec, OperationStep, Precondition, Step, StepSpec,
    UtilityExec, UtilityStep,
};
pub use template::{Transformation, TransformationTemplate};
