use crate::cli::args::{
    AddDependencyArgs, AddPropertyArgs, RemovePropertyArgs, ReportFormat, RunOptions,
};
use crate::core::operations::{AddDependency, AddProperty, FindFiles, RemoveProperty};
use crate::core::transform::{
    RunReport, Step, Transformation, TransformationEngine, TransformationTemplate,
};
use crate::core::types::RunStatus;
use anyhow::{anyhow, bail};
use std::path::{Path, PathBuf};

pub fn add_dependency(args: AddDependencyArgs) -> crate::Result<()> {
    let mut operation = AddDependency::from_coordinate(&args.coordinate)?;
    if let Some(scope) = &args.scope {
        operation = operation.with_scope(scope.clone())?;
    }
    let operation = operation.if_present(args.if_present.into());

    let step = if args.all_descriptors {
        let file_name = plain_file_name(&args.descriptor)?;
        FindFiles::new(file_name, move |relative: &Path| {
            operation.clone().into_operation_step(relative.to_path_buf())
        })?
        .into_step()
    } else {
        operation.into_step(args.descriptor.clone())
    };

    run_template(
        "add-dependency",
        "Add a dependency declaration to project descriptors",
        step,
        args.source,
        &args.run,
    )
}

pub fn add_property(args: AddPropertyArgs) -> crate::Result<()> {
    let operation = AddProperty::new(args.key.clone(), args.value.clone())?;

    let step = if args.all_files {
        let file_name = plain_file_name(&args.file)?;
        FindFiles::new(file_name, move |relative: &Path| {
            operation.clone().into_operation_step(relative.to_path_buf())
        })?
        .into_step()
    } else {
        operation.into_step(args.file.clone())
    };

    run_template(
        "add-property",
        "Add a property definition to configuration files",
        step,
        args.source,
        &args.run,
    )
}

pub fn remove_property(args: RemovePropertyArgs) -> crate::Result<()> {
    let operation = RemoveProperty::new(args.key.clone())?;

    let step = if args.all_files {
        let file_name = plain_file_name(&args.file)?;
        FindFiles::new(file_name, move |relative: &Path| {
            operation.clone().into_operation_step(relative.to_path_buf())
        })?
        .into_step()
    } else {
        operation.into_step(args.file.clone())
    };

    run_template(
        "remove-property",
        "Remove a property definition from configuration files",
        step,
        args.source,
        &args.run,
    )
}

fn run_template(
    name: &str,
    description: &str,
    step: Step,
    source: PathBuf,
    options: &RunOptions,
) -> crate::Result<()> {
    let template = TransformationTemplate::new(name, description, vec![step]);
    let mut transformation =
        Transformation::new(source, options.output_parent.clone(), template);

    let report = TransformationEngine::new().perform(&mut transformation)?;
    match options.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print!("{}", render_text(&report)),
    }

    if report.status == RunStatus::Aborted {
        bail!("transformation aborted, see report for the failing step");
    }
    Ok(())
}

/// Fan-out matching works on bare file names; reject paths with directory
/// components so `--all-*` flags are unambiguous.
fn plain_file_name(path: &Path) -> crate::Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("not a usable file name: {}", path.display()))?;
    if Path::new(name) != path {
        bail!(
            "expected a bare file name, got a path: {}",
            path.display()
        );
    }
    Ok(name.to_string())
}

fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Transformation '{}' {}\n",
        report.template,
        match report.status {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "ABORTED",
            RunStatus::Preparing | RunStatus::Running => "in progress",
        }
    ));
    out.push_str(&format!("  run:    {}\n", report.run_id));
    out.push_str(&format!("  source: {}\n", report.source.display()));
    out.push_str(&format!("  output: {}\n", report.output.display()));
    if let Some(worst) = report.worst_severity() {
        out.push_str(&format!("  worst:  {}\n", worst.as_str()));
    }
    out.push_str("  steps:\n");
    for step in &report.steps {
        out.push_str(&format!(
            "    [{:>4}] {:<8} {}: {}\n",
            step.order,
            step.severity.as_str(),
            step.name,
            step.details
        ));
    }
    if let Some(abort) = &report.aborted {
        out.push_str(&format!(
            "  aborted at '{}': {}\n",
            abort.step, abort.cause.message
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::StepReport;
    use crate::core::types::StepSeverity;

    #[test]
    fn test_plain_file_name_accepts_bare_names() {
        assert_eq!(plain_file_name(Path::new("pom.xml")).unwrap(), "pom.xml");
    }

    #[test]
    fn test_plain_file_name_rejects_paths() {
        assert!(plain_file_name(Path::new("modules/pom.xml")).is_err());
    }

    #[test]
    fn test_render_text_summarizes_worst_severity() {
        let now = chrono::Utc::now();
        let report = RunReport {
            run_id: uuid::Uuid::new_v4(),
            template: "sample".into(),
            source: PathBuf::from("/work/app"),
            output: PathBuf::from("/work/app-transformed-1"),
            started_at: now,
            completed_at: now,
            status: RunStatus::Completed,
            aborted: None,
            steps: vec![
                StepReport {
                    order: "1".into(),
                    name: "first".into(),
                    severity: StepSeverity::Success,
                    details: "added".into(),
                },
                StepReport {
                    order: "2".into(),
                    name: "second".into(),
                    severity: StepSeverity::Warning,
                    details: "anomaly".into(),
                },
            ],
        };
        let text = render_text(&report);
        assert!(text.contains("  worst:  warning\n"));
        assert!(text.contains("Transformation 'sample' completed"));
    }
}
