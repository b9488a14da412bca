use metamorph::core::operations::{
    AddDependency, AddProperty, FindFiles, IfPresent, RemoveProperty,
};
use metamorph::core::transform::{Transformation, TransformationEngine, TransformationTemplate};
use metamorph::core::types::{RunStatus, StepSeverity};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const POM: &str = "<?xml version=\"1.0\"?>\n<project>\n    <artifactId>sample</artifactId>\n    <dependencies>\n        <dependency>\n            <groupId>junit</groupId>\n            <artifactId>junit</artifactId>\n            <version>4.13</version>\n        </dependency>\n    </dependencies>\n</project>\n";

fn seeded_source(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("app");
    fs::create_dir(&source).unwrap();
    for (relative, content) in files {
        let path = source.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    (tmp, source)
}

fn run(
    source: &Path,
    step: metamorph::core::transform::Step,
) -> (metamorph::core::transform::RunReport, PathBuf) {
    let template = TransformationTemplate::new("test-run", "single step", vec![step]);
    let mut transformation = Transformation::new(source, None, template);
    let report = TransformationEngine::new()
        .perform(&mut transformation)
        .unwrap();
    let output = transformation.transformed_location().unwrap().to_path_buf();
    (report, output)
}

#[test]
fn test_add_dependency_end_to_end() {
    let (_tmp, source) = seeded_source(&[("pom.xml", POM)]);
    let step = AddDependency::new("org.slf4j", "slf4j-api")
        .unwrap()
        .with_version("1.7.36")
        .unwrap()
        .into_step("pom.xml");

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.steps[0].severity, StepSeverity::Success);

    // The source descriptor is untouched, the staged one gained the entry
    // and kept every pre-existing byte.
    assert_eq!(fs::read_to_string(source.join("pom.xml")).unwrap(), POM);
    let edited = fs::read_to_string(output.join("pom.xml")).unwrap();
    assert!(edited.contains("<groupId>org.slf4j</groupId>"));
    assert!(edited.contains("<artifactId>slf4j-api</artifactId>"));
    assert!(edited.contains("        <dependency>\n            <groupId>junit</groupId>"));
}

#[test]
fn test_add_dependency_already_present_aborts_run() {
    let (_tmp, source) = seeded_source(&[("pom.xml", POM)]);
    let step = AddDependency::from_coordinate("junit:junit:4.13")
        .unwrap()
        .into_step("pom.xml");

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Aborted);
    assert!(report.aborted.is_some());
    // Failed edit leaves the staged descriptor untouched too.
    assert_eq!(fs::read_to_string(output.join("pom.xml")).unwrap(), POM);
}

#[test]
fn test_add_dependency_noop_policy_completes() {
    let (_tmp, source) = seeded_source(&[("pom.xml", POM)]);
    let step = AddDependency::from_coordinate("junit:junit")
        .unwrap()
        .if_present(IfPresent::NoOp)
        .into_step("pom.xml");

    let (report, _output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.steps[0].severity, StepSeverity::NoOp);
}

#[test]
fn test_add_dependency_across_modules() {
    let (_tmp, source) = seeded_source(&[
        ("pom.xml", POM),
        ("modules/core/pom.xml", POM),
        ("modules/web/pom.xml", POM),
    ]);
    let operation = AddDependency::from_coordinate("org.acme:shared:2.1").unwrap();
    let step = FindFiles::new("pom.xml", move |relative: &Path| {
        operation.clone().into_operation_step(relative.to_path_buf())
    })
    .unwrap()
    .into_step();

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    // One envelope line plus one line per descriptor.
    assert_eq!(report.steps.len(), 4);
    for relative in ["pom.xml", "modules/core/pom.xml", "modules/web/pom.xml"] {
        let edited = fs::read_to_string(output.join(relative)).unwrap();
        assert!(edited.contains("<artifactId>shared</artifactId>"), "{}", relative);
    }
}

#[test]
fn test_remove_property_end_to_end() {
    let props = "# app config\nserver.port=8080\nspring.datasource.url=jdbc:h2:mem\n";
    let (_tmp, source) = seeded_source(&[("application.properties", props)]);
    let step = RemoveProperty::new("spring.datasource.url")
        .unwrap()
        .into_step("application.properties");

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(
        fs::read_to_string(output.join("application.properties")).unwrap(),
        "# app config\nserver.port=8080\n"
    );
    assert_eq!(
        fs::read_to_string(source.join("application.properties")).unwrap(),
        props
    );
}

#[test]
fn test_add_property_end_to_end() {
    let props = "server.port=8080\n";
    let (_tmp, source) = seeded_source(&[("application.properties", props)]);
    let step = AddProperty::new("management.port", "8081")
        .unwrap()
        .into_step("application.properties");

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.steps[0].severity, StepSeverity::Success);
    assert_eq!(
        fs::read_to_string(output.join("application.properties")).unwrap(),
        "server.port=8080\nmanagement.port=8081\n"
    );
    assert_eq!(
        fs::read_to_string(source.join("application.properties")).unwrap(),
        props
    );
}

#[test]
fn test_add_property_existing_key_is_noop() {
    let props = "server.port=8080\n";
    let (_tmp, source) = seeded_source(&[("application.properties", props)]);
    let step = AddProperty::new("server.port", "9090")
        .unwrap()
        .into_step("application.properties");

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.steps[0].severity, StepSeverity::NoOp);
    assert_eq!(
        fs::read_to_string(output.join("application.properties")).unwrap(),
        props
    );
}

#[test]
fn test_remove_property_missing_file_is_noop() {
    let (_tmp, source) = seeded_source(&[("pom.xml", POM)]);
    let step = RemoveProperty::new("server.port")
        .unwrap()
        .into_step("application.properties");

    let (report, _output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.steps[0].severity, StepSeverity::NoOp);
}

#[test]
fn test_remove_property_across_files() {
    let (_tmp, source) = seeded_source(&[
        ("config/application.properties", "debug=true\nport=1\n"),
        ("other/application.properties", "port=2\n"),
    ]);
    let operation = RemoveProperty::new("debug").unwrap();
    let step = FindFiles::new("application.properties", move |relative: &Path| {
        operation.clone().into_operation_step(relative.to_path_buf())
    })
    .unwrap()
    .into_step();

    let (report, output) = run(&source, step);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(
        fs::read_to_string(output.join("config/application.properties")).unwrap(),
        "port=1\n"
    );
    // File without the key reports a no-op but the run still completes.
    assert_eq!(report.steps[2].severity, StepSeverity::NoOp);
}