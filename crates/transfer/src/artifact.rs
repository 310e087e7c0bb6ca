//! Build-artifact discovery.
//!
//! The build-output directory is expected to hold exactly one file (the
//! artifact produced by the build). Subdirectories are ignored.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::TransferError;

/// The single build output file to deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Absolute or build-dir-relative path to the file.
    pub path: PathBuf,
    /// Bare file name, used in logs and the deploy report.
    pub file_name: String,
    /// File size in bytes.
    pub size: u64,
}

/// Locates the artifact in `build_dir`.
///
/// Returns an error if the directory cannot be read or holds no regular
/// file. If several files are present, the lexicographically first one is
/// selected and the rest are logged as ignored — directory-listing order
/// is not stable enough to deploy whatever happens to come back first.
pub fn find_build_artifact(build_dir: &Path) -> Result<BuildArtifact, TransferError> {
    let mut files: Vec<(String, PathBuf, u64)> = Vec::new();

    for entry in std::fs::read_dir(build_dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, entry.path(), metadata.len()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    let Some((file_name, path, size)) = files.first().cloned() else {
        return Err(TransferError::NoArtifact(
            build_dir.to_string_lossy().into_owned(),
        ));
    };

    if files.len() > 1 {
        let ignored: Vec<&str> = files[1..].iter().map(|(n, _, _)| n.as_str()).collect();
        warn!(
            artifact = %file_name,
            ignored = ?ignored,
            "build directory holds more than one file"
        );
    }

    Ok(BuildArtifact {
        path,
        file_name,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_single_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app-1.0.jar"), b"JAR_BYTES").unwrap();

        let artifact = find_build_artifact(dir.path()).unwrap();
        assert_eq!(artifact.file_name, "app-1.0.jar");
        assert_eq!(artifact.size, 9);
        assert_eq!(artifact.path, dir.path().join("app-1.0.jar"));
    }

    #[test]
    fn empty_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = find_build_artifact(dir.path());
        assert!(matches!(result, Err(TransferError::NoArtifact(_))));
    }

    #[test]
    fn missing_dir_is_an_error() {
        let result = find_build_artifact(Path::new("/nonexistent/build/libs"));
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("classes")).unwrap();
        fs::write(dir.path().join("app.jar"), b"JAR").unwrap();

        let artifact = find_build_artifact(dir.path()).unwrap();
        assert_eq!(artifact.file_name, "app.jar");
    }

    #[test]
    fn multiple_files_pick_lexicographically_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b-sources.jar"), b"SRC").unwrap();
        fs::write(dir.path().join("a.jar"), b"JAR").unwrap();

        let artifact = find_build_artifact(dir.path()).unwrap();
        assert_eq!(artifact.file_name, "a.jar");
    }

    #[test]
    fn only_subdirectories_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("classes")).unwrap();
        let result = find_build_artifact(dir.path());
        assert!(matches!(result, Err(TransferError::NoArtifact(_))));
    }
}
