pub mod args;
pub mod commands;

pub use args::{AddDependencyArgs, AddPropertyArgs, RemovePropertyArgs, ReportFormat};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
TRANSFORMATION COMMANDS:\n{subcommands}\n";

#[derive(Debug, Parser)]
#[command(name = "metamorph")]
#[command(version = crate::VERSION)]
#[command(about = "Structural, format-preserving transformation of project source trees")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Every run stages a timestamped copy of the source tree and edits the copy; the original is never touched."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(
        about = "Add a dependency to an XML project descriptor",
        long_about = "Adds a dependency declaration to the descriptor, preserving every untouched byte of the file. The descriptor's own indentation and line-break conventions are reused for the new element.",
        after_help = "Examples:\n    metamorph add-dependency ./app org.slf4j:slf4j-api:1.7.36\n    metamorph add-dependency ./app org.slf4j:slf4j-api --all-descriptors --if-present no-op"
    )]
    AddDependency(AddDependencyArgs),
    #[command(
        about = "Add a property to configuration files",
        long_about = "Appends a key=value definition to a line-oriented properties file, reusing its trailing-newline convention. A missing file or an already-defined key is reported as a no-op.",
        after_help = "Example:\n    metamorph add-property ./app server.port 8081"
    )]
    AddProperty(AddPropertyArgs),
    #[command(
        about = "Remove a property from configuration files",
        long_about = "Removes a key definition from a line-oriented properties file. A missing file or missing key is reported as a no-op, never an error.",
        after_help = "Example:\n    metamorph remove-property ./app spring.datasource.url --all-files"
    )]
    RemoveProperty(RemovePropertyArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::AddDependency(add_args) => {
            crate::logging::init(add_args.run.verbose);
            commands::add_dependency(add_args)
        }
        Command::AddProperty(add_args) => {
            crate::logging::init(add_args.run.verbose);
            commands::add_property(add_args)
        }
        Command::RemoveProperty(remove_args) => {
            crate::logging::init(remove_args.run.verbose);
            commands::remove_property(remove_args)
        }
    }
}
