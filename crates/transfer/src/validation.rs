use std::path::{Component, Path};

use crate::TransferError;

/// Validates the fixed remote file name the artifact is uploaded as.
///
/// Rejects:
/// - Empty names
/// - Path separators (the name must be a bare file name)
/// - `.` and `..`
pub fn validate_remote_file_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidPath("empty remote file name".into()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(TransferError::InvalidPath(format!(
            "remote file name must not contain path separators: {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(TransferError::InvalidPath(format!(
            "remote file name must be a file name: {name}"
        )));
    }
    Ok(())
}

/// Validates the remote target directory.
///
/// The directory must be absolute and free of parent-directory traversal;
/// it names a fixed location on the server, not something derived from
/// the artifact.
pub fn validate_remote_dir(dir: &str) -> Result<(), TransferError> {
    if dir.is_empty() {
        return Err(TransferError::InvalidPath("empty remote directory".into()));
    }

    let path = Path::new(dir);
    if !path.is_absolute() {
        return Err(TransferError::InvalidPath(format!(
            "remote directory must be absolute: {dir}"
        )));
    }

    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(TransferError::InvalidPath(format!(
                "parent directory traversal not allowed: {dir}"
            )));
        }
    }

    Ok(())
}
