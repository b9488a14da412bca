use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed-width, lexicographically sortable stamp: year through millisecond,
/// no separators. A pure function of the supplied instant.
pub fn timestamp_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Name of the staged output directory for a given source tree.
pub fn output_dir_name(source: &Path, now: DateTime<Utc>) -> Result<String, AppError> {
    let source_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("source path has no usable directory name: {}", source.display()),
            )
        })?;
    Ok(format!(
        "{}-transformed-{}",
        source_name,
        timestamp_stamp(now)
    ))
}

/// Stage the output tree: create a freshly named directory next to the
/// source (or under the supplied parent override) and copy the source tree
/// into it in full. Any failure here is fatal and leaves no partially
/// staged tree behind.
pub fn prepare_output_tree(
    source: &Path,
    output_parent: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<PathBuf, AppError> {
    if !source.is_dir() {
        return Err(AppError::new(
            ErrorCategory::ConfigurationError,
            format!("source tree is not a directory: {}", source.display()),
        ));
    }

    let parent = match output_parent {
        Some(parent) => {
            if !parent.is_dir() {
                return Err(AppError::new(
                    ErrorCategory::ConfigurationError,
                    format!("invalid output folder: {}", parent.display()),
                ));
            }
            parent.to_path_buf()
        }
        None => source.parent().map(Path::to_path_buf).ok_or_else(|| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("source tree has no parent directory: {}", source.display()),
            )
        })?,
    };

    let destination = parent.join(output_dir_name(source, now)?);
    fs::create_dir(&destination).map_err(|e| {
        AppError::new(
            ErrorCategory::StagingError,
            format!(
                "transformed application folder {} could not be created: {}",
                destination.display(),
                e
            ),
        )
    })?;

    if let Err(e) = copy_dir_recursive(source, &destination) {
        // Remove the partial copy so staging is all-or-nothing.
        let _ = fs::remove_dir_all(&destination);
        return Err(AppError::new(
            ErrorCategory::StagingError,
            format!(
                "failed to stage {} into {}: {}",
                source.display(),
                destination.display(),
                e
            ),
        ));
    }

    Ok(destination)
}

fn copy_dir_recursive(from: &Path, to: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            fs::create_dir(&target)?;
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_stamp_is_fixed_width() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(timestamp_stamp(instant), "20240307090502042");
    }

    #[test]
    fn test_timestamp_stamp_sorts_with_time() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(timestamp_stamp(earlier) < timestamp_stamp(later));
    }

    #[test]
    fn test_output_dir_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let name = output_dir_name(Path::new("/work/sample-app"), now).unwrap();
        assert_eq!(name, "sample-app-transformed-20240102030405000");
    }

    #[test]
    fn test_staging_copies_full_tree() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("app");
        fs::create_dir_all(source.join("src/main")).unwrap();
        fs::write(source.join("pom.xml"), "<project/>").unwrap();
        fs::write(source.join("src/main/App.java"), "class App {}").unwrap();

        let staged = prepare_output_tree(&source, None, Utc::now()).unwrap();
        assert!(staged.join("pom.xml").exists());
        assert!(staged.join("src/main/App.java").exists());
        assert_eq!(
            fs::read(staged.join("pom.xml")).unwrap(),
            fs::read(source.join("pom.xml")).unwrap()
        );
    }

    #[test]
    fn test_missing_output_parent_is_configuration_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("app");
        fs::create_dir(&source).unwrap();

        let missing_parent = tmp.path().join("not-there");
        let err = prepare_output_tree(&source, Some(&missing_parent), Utc::now()).unwrap_err();
        assert_eq!(
            err.category,
            crate::core::types::ErrorCategory::ConfigurationError
        );
    }

    #[test]
    fn test_two_stagings_produce_identical_trees() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("app");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "alpha").unwrap();
        fs::write(source.join("b.txt"), "beta").unwrap();

        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let first = prepare_output_tree(&source, None, base).unwrap();
        let second =
            prepare_output_tree(&source, None, base + chrono::Duration::milliseconds(5)).unwrap();

        assert_ne!(first, second);
        for file in ["a.txt", "b.txt"] {
            assert_eq!(
                fs::read(first.join(file)).unwrap(),
                fs::read(second.join(file)).unwrap()
            );
        }
    }
}
