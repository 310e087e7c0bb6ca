//! SSH transport and SFTP client used by the deployer.
//!
//! One [`SshClient`] per run: password authentication, one exec channel per
//! remote command (blocking, with captured exit status), and one SFTP
//! subchannel for the artifact upload. No pooling, no reconnect, no retry —
//! a deploy is a single attempt.

mod client;
mod sftp;

pub use client::{CommandOutput, SshClient, Target};
pub use sftp::{SftpClient, UploadReceipt};

/// Errors produced by the session crate.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] capstan_transfer::TransferError),

    #[error("authentication failed for user {0}")]
    AuthenticationFailed(String),
}
