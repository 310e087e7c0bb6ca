//! Deploy error types.

/// Errors produced during deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] capstan_transfer::TransferError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("remote command for step `{step}` exited with status {exit_status:?}: {stderr}")]
    CommandFailed {
        step: &'static str,
        exit_status: Option<u32>,
        stderr: String,
    },

    #[error("uploaded artifact digest mismatch: local {local}, remote {remote}")]
    ChecksumMismatch { local: String, remote: String },

    #[error("cancelled")]
    Cancelled,
}
