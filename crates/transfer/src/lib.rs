//! Artifact discovery and chunked file reading for deployment uploads.

mod artifact;
mod chunked;
mod progress;
mod validation;

pub use artifact::{BuildArtifact, find_build_artifact};
pub use chunked::{Chunk, ChunkReader, calculate_file_checksum, checksum_bytes};
pub use progress::SpeedCalculator;
pub use validation::{validate_remote_dir, validate_remote_file_name};

/// Default chunk size: 1 MiB.
///
/// Bounds memory per write and the granularity of progress reporting.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("build directory contains no artifact: {0}")]
    NoArtifact(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
