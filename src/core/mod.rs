pub mod editor;
pub mod error;
pub mod operations;
pub mod transform;
pub mod types;

pub use error::AppError;
pub use transform::{
    Transformation, TransformationContext, TransformationEngine, TransformationTemplate,
};
pub use types::{ErrorCategory, ErrorSeverity, RunStatus, StepSeverity};
