use crate::core::editor::xml::{scan_entries, EventCondition, XmlEditor};
use crate::core::editor::EditError;
use crate::core::error::AppError;
use crate::core::transform::context::TransformationContext;
use crate::core::transform::result::{ErrorSummary, OperationOutcome};
use crate::core::transform::step::{OperationExec, OperationStep, Step, StepSpec};
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Path, PathBuf};

const CONTAINER: &str = "dependencies";
const ENTRY: &str = "dependency";

/// What to do when the dependency is already declared in the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfPresent {
    /// Fail the operation (the default).
    #[default]
    Fail,
    /// Warn and leave the descriptor untouched.
    WarnNotAdd,
    /// Add anyway, attaching a warning to the result.
    WarnButAdd,
    /// Report a no-op and leave the descriptor untouched.
    NoOp,
    /// Replace the existing declaration in place.
    Overwrite,
}

/// Adds a dependency declaration to an XML project descriptor, preserving
/// every untouched byte of the file. When the descriptor has no dependency
/// list at all, a new one is created before the root element closes.
#[derive(Clone)]
pub struct AddDependency {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    scope: Option<String>,
    if_present: IfPresent,
}

impl AddDependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Result<Self, AppError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        check_not_blank("groupId", &group_id)?;
        check_not_blank("artifactId", &artifact_id)?;
        Ok(AddDependency {
            group_id,
            artifact_id,
            version: None,
            scope: None,
            if_present: IfPresent::default(),
        })
    }

    /// Parse a `group:artifact` or `group:artifact:version` coordinate.
    pub fn from_coordinate(coordinate: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = coordinate.split(':').collect();
        match parts.as_slice() {
            [group, artifact] => AddDependency::new(*group, *artifact),
            [group, artifact, version] => {
                let mut op = AddDependency::new(*group, *artifact)?;
                op = op.with_version(*version)?;
                Ok(op)
            }
            _ => Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid dependency coordinate: {}", coordinate),
            )),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Result<Self, AppError> {
        let version = version.into();
        check_not_blank("version", &version)?;
        self.version = Some(version);
        Ok(self)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Result<Self, AppError> {
        let scope = scope.into();
        check_not_blank("scope", &scope)?;
        self.scope = Some(scope);
        Ok(self)
    }

    pub fn if_present(mut self, policy: IfPresent) -> Self {
        self.if_present = policy;
        self
    }

    pub fn coordinate(&self) -> String {
        match &self.version {
            Some(version) => format!("{}:{}:{}", self.group_id, self.artifact_id, version),
            None => format!("{}:{}", self.group_id, self.artifact_id),
        }
    }

    /// Wrap this operation into an engine step targeting a descriptor at
    /// the given tree-relative path.
    pub fn into_step(self, relative_path: impl Into<PathBuf>) -> Step {
        Step::Operation(self.into_operation_step(relative_path))
    }

    pub fn into_operation_step(self, relative_path: impl Into<PathBuf>) -> OperationStep {
        let relative_path = relative_path.into();
        let spec = StepSpec::operation(
            format!("add-dependency-{}", self.coordinate()),
            format!(
                "Add dependency {} to descriptor {}",
                self.coordinate(),
                relative_path.display()
            ),
        );
        OperationStep {
            spec,
            relative_path,
            exec: Box::new(self),
        }
    }

    fn declared_index(&self, content: &str) -> Result<Option<usize>, EditError> {
        let entries = scan_entries(content, CONTAINER, ENTRY)?;
        Ok(entries.iter().position(|fields| {
            fields.get("groupId").map(String::as_str) == Some(self.group_id.as_str())
                && fields.get("artifactId").map(String::as_str) == Some(self.artifact_id.as_str())
        }))
    }

    fn entry_fields(&self) -> Vec<(&str, &str)> {
        let mut fields = vec![
            ("groupId", self.group_id.as_str()),
            ("artifactId", self.artifact_id.as_str()),
        ];
        if let Some(version) = &self.version {
            fields.push(("version", version.as_str()));
        }
        if let Some(scope) = &self.scope {
            fields.push(("scope", scope.as_str()));
        }
        fields
    }

    fn edit(&self, content: &str, replace_index: Option<usize>) -> Result<String, EditError> {
        let mut editor = XmlEditor::new(content)?;
        let start_container = EventCondition::StartElement(CONTAINER.to_string());
        let end_container = EventCondition::EndElement(CONTAINER.to_string());
        let end_entry = EventCondition::EndElement(ENTRY.to_string());

        if let Some(index) = replace_index {
            editor.copy_until_root_child(&start_container, true)?;
            for _ in 0..index {
                editor.copy_until(&end_entry, true)?;
            }
            editor.skip_until(&end_entry)?;
            editor.write_element(ENTRY, &self.entry_fields(), 2);
            return Ok(editor.drain());
        }

        match top_level_container_shape(content)? {
            ContainerShape::Open => {
                editor.copy_until_root_child(&start_container, true)?;
                editor.write_element(ENTRY, &self.entry_fields(), 2);
            }
            ContainerShape::SelfClosing => {
                // The container exists but only as an empty self-closing
                // tag; replace it in place with a populated one.
                editor.copy_until_root_child(&start_container, false)?;
                editor.skip_until(&end_container)?;
                self.write_container(&mut editor, false);
            }
            ContainerShape::Absent => {
                let root = editor
                    .root_name()
                    .ok_or_else(|| EditError::Parse("document has no root element".to_string()))?
                    .to_string();
                editor.copy_until(&EventCondition::EndElement(root), false)?;
                self.write_container(&mut editor, true);
                let lb = editor.line_break().to_string();
                editor.write_raw(&lb);
            }
        }

        Ok(editor.drain())
    }

    fn write_container(&self, editor: &mut XmlEditor, indent_open: bool) {
        let lb = editor.line_break().to_string();
        let unit = editor.indent_unit().to_string();
        if indent_open {
            editor.write_raw(&unit);
        }
        editor.write_raw(&format!("<{}>", CONTAINER));
        editor.write_element(ENTRY, &self.entry_fields(), 2);
        editor.write_raw(&format!("{}{}</{}>", lb, unit, CONTAINER));
    }
}

impl OperationExec for AddDependency {
    fn execute(
        &self,
        target: &Path,
        _ctx: &TransformationContext,
    ) -> Result<OperationOutcome, AppError> {
        let content = fs::read_to_string(target).map_err(|e| {
            AppError::new(
                ErrorCategory::StepExecutionError,
                format!("could not read descriptor {}: {}", target.display(), e),
            )
        })?;

        let existing = self
            .declared_index(&content)
            .map_err(|e| structural_error(target, e))?;

        let mut warning: Option<ErrorSummary> = None;
        let mut replace_index = None;
        if let Some(index) = existing {
            let message = format!(
                "Dependency {}:{} is already present in {}",
                self.group_id,
                self.artifact_id,
                target.display()
            );
            match self.if_present {
                IfPresent::Fail => {
                    return Ok(OperationOutcome::Error {
                        cause: ErrorSummary::new(ErrorCategory::StepExecutionError, message),
                    });
                }
                IfPresent::WarnNotAdd => {
                    return Ok(OperationOutcome::Warning {
                        details: message.clone(),
                        causes: vec![ErrorSummary::new(
                            ErrorCategory::StepExecutionError,
                            message,
                        )],
                    });
                }
                IfPresent::NoOp => {
                    return Ok(OperationOutcome::NoOp { details: message });
                }
                IfPresent::WarnButAdd => {
                    warning = Some(ErrorSummary::new(ErrorCategory::StepExecutionError, message));
                }
                IfPresent::Overwrite => {
                    replace_index = Some(index);
                }
            }
        }

        let edited = self
            .edit(&content, replace_index)
            .map_err(|e| structural_error(target, e))?;
        fs::write(target, &edited).map_err(|e| {
            AppError::new(
                ErrorCategory::StepExecutionError,
                format!("could not write descriptor {}: {}", target.display(), e),
            )
        })?;

        let details = format!(
            "Dependency {} has been added to {}",
            self.coordinate(),
            target.display()
        );
        match warning {
            Some(cause) => Ok(OperationOutcome::Warning {
                details,
                causes: vec![cause],
            }),
            None => Ok(OperationOutcome::Success { details }),
        }
    }
}

enum ContainerShape {
    Open,
    SelfClosing,
    Absent,
}

/// Shape of the dependency container that is a direct child of the root
/// element. Same-named containers nested deeper (a managed-dependency
/// block) do not count.
fn top_level_container_shape(content: &str) -> Result<ContainerShape, EditError> {
    use crate::core::editor::xml::{scan, XmlEvent};
    let mut depth = 0usize;
    for event in &scan(content)? {
        match event {
            XmlEvent::StartTag { name, .. } => {
                if depth == 1 && name == CONTAINER {
                    return Ok(ContainerShape::Open);
                }
                depth += 1;
            }
            XmlEvent::SelfClosingTag { name, .. } => {
                if depth == 1 && name == CONTAINER {
                    return Ok(ContainerShape::SelfClosing);
                }
            }
            XmlEvent::EndTag { .. } => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(ContainerShape::Absent)
}

fn structural_error(target: &Path, e: EditError) -> AppError {
    AppError::new(
        ErrorCategory::StructuralEditError,
        format!("{} while editing {}", e, target.display()),
    )
}

fn check_not_blank(what: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("{} must not be blank", what),
        ));
    }
    Ok(())
}
