pub mod lines;
pub mod xml;

use thiserror::Error;

/// Failure shapes of the document editor. Always folded into the issuing
/// step's error result by the caller; the editor itself never aborts a run.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("malformed document: {0}")]
    Parse(String),
    #[error("structural anchor not found: {0}")]
    AnchorNotFound(String),
}

pub use xml::{EventCondition, XmlEditor, XmlEvent};
