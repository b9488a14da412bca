use crate::core::transform::result::PerformResult;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Value shape allowed in the transformation context. Keeping the set
/// closed means publish/consume mismatches surface as compile errors in
/// step code instead of downcast failures at run time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ContextValue {
    Text(String),
    Number(i64),
    Flag(bool),
    FileList(Vec<PathBuf>),
    Blob(Vec<u8>),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file_list(&self) -> Option<&[PathBuf]> {
        match self {
            ContextValue::FileList(files) => Some(files),
            _ => None,
        }
    }
}

/// Run-scoped, append-only store shared by every step of one
/// transformation. Values published by earlier steps become visible to
/// later ones; nothing is ever removed, and the whole store is dropped
/// when the run ends.
///
/// First writer wins per key. Step authors must not rely on overwrite.
#[derive(Debug, Default)]
pub struct TransformationContext {
    attributes: HashMap<String, ContextValue>,
    results: HashMap<String, PerformResult>,
}

impl TransformationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value under the given attribute name. A second write to
    /// the same key within one run is ignored.
    pub fn put(&mut self, key: &str, value: ContextValue) {
        if self.attributes.contains_key(key) {
            tracing::debug!(key, "context attribute already set, keeping first value");
            return;
        }
        self.attributes.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.attributes.get(key)
    }

    /// Store the full result envelope for a step that opted in via its
    /// save-result flag.
    pub fn put_result(&mut self, step_name: &str, result: PerformResult) {
        self.results.insert(step_name.to_string(), result);
    }

    pub fn get_result(&self, step_name: &str) -> Option<&PerformResult> {
        self.results.get(step_name)
    }
}
