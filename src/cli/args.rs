use crate::core::operations::IfPresent;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Rendering of the final run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Policy applied when the dependency is already declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum IfPresentArg {
    #[default]
    Fail,
    WarnNotAdd,
    WarnButAdd,
    NoOp,
    Overwrite,
}

impl From<IfPresentArg> for IfPresent {
    fn from(arg: IfPresentArg) -> Self {
        match arg {
            IfPresentArg::Fail => IfPresent::Fail,
            IfPresentArg::WarnNotAdd => IfPresent::WarnNotAdd,
            IfPresentArg::WarnButAdd => IfPresent::WarnButAdd,
            IfPresentArg::NoOp => IfPresent::NoOp,
            IfPresentArg::Overwrite => IfPresent::Overwrite,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddDependencyArgs {
    /// Path to the application source tree (never modified in place)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Dependency coordinate, group:artifact or group:artifact:version
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Dependency scope to declare (e.g. test, provided)
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// What to do when the dependency is already declared
    #[arg(long, value_enum, default_value = "fail")]
    pub if_present: IfPresentArg,

    /// Descriptor file to edit, relative to the tree root
    #[arg(long, default_value = "pom.xml", value_name = "FILE")]
    pub descriptor: PathBuf,

    /// Apply to every descriptor with that file name anywhere in the tree
    #[arg(long)]
    pub all_descriptors: bool,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Args)]
pub struct AddPropertyArgs {
    /// Path to the application source tree (never modified in place)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Property key to define
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Value to assign
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Properties file to edit, relative to the tree root
    #[arg(long, default_value = "application.properties", value_name = "FILE")]
    pub file: PathBuf,

    /// Apply to every file with that name anywhere in the tree
    #[arg(long)]
    pub all_files: bool,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Args)]
pub struct RemovePropertyArgs {
    /// Path to the application source tree (never modified in place)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Property key to remove
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Properties file to edit, relative to the tree root
    #[arg(long, default_value = "application.properties", value_name = "FILE")]
    pub file: PathBuf,

    /// Apply to every file with that name anywhere in the tree
    #[arg(long)]
    pub all_files: bool,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Options common to every transformation run.
#[derive(Debug, Args)]
pub struct RunOptions {
    /// Directory to stage the transformed copy under (default: next to SOURCE)
    #[arg(long, value_name = "DIR", help_heading = "Output Options")]
    pub output_parent: Option<PathBuf>,

    /// Run report rendering
    #[arg(long, value_enum, default_value = "text", help_heading = "Output Options")]
    pub format: ReportFormat,

    /// Enable verbose (debug-level) logging
    #[arg(long, help_heading = "Output Options")]
    pub verbose: bool,
}
