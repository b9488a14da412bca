pub mod add_dependency;
pub mod add_property;
pub mod find_files;
pub mod remove_property;

pub use add_dependency::{AddDependency, IfPresent};
pub use add_property::AddProperty;
pub use find_files::FindFiles;
pub use remove_property::RemoveProperty;
