//! SFTP operations: directory checks and the artifact upload.

use std::path::Path;

use russh_sftp::client::SftpSession;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::protocol::{OpenFlags, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use capstan_transfer::{ChunkReader, SpeedCalculator};

use crate::SessionError;

/// What the upload actually placed on the remote host.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Bytes written to the remote file.
    pub bytes: u64,
    /// Hex SHA-256 of the local file as it was read.
    pub sha256: String,
}

/// SFTP subchannel client.
pub struct SftpClient {
    session: SftpSession,
}

impl SftpClient {
    pub(crate) fn new(session: SftpSession) -> Self {
        Self { session }
    }

    /// Returns whether `path` exists on the remote host.
    ///
    /// Existence is queried instead of attempting a create and swallowing
    /// the failure; "no such file" is an answer here, not an error.
    pub async fn dir_exists(&self, path: &str) -> Result<bool, SessionError> {
        match self.session.metadata(path).await {
            Ok(_) => Ok(true),
            Err(SftpError::Status(status))
                if matches!(status.status_code, StatusCode::NoSuchFile) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates `path` on the remote host.
    pub async fn create_dir(&self, path: &str) -> Result<(), SessionError> {
        self.session.create_dir(path).await?;
        info!(path, "remote directory created");
        Ok(())
    }

    /// Uploads `local` to the fixed `remote` path, replacing any previous
    /// file there.
    ///
    /// The file is streamed in chunks; the receipt carries the byte count
    /// and the SHA-256 digest of everything read, for post-upload
    /// verification. Any error leaves the remote file incomplete and the
    /// deploy aborted — there is no partial-success path.
    pub async fn put_file(&self, local: &Path, remote: &str) -> Result<UploadReceipt, SessionError> {
        let mut reader = {
            let path = local.to_path_buf();
            tokio::task::spawn_blocking(move || ChunkReader::new(&path, 0))
                .await
                .map_err(|e| SessionError::Io(std::io::Error::other(e)))??
        };
        let total = reader.file_size();
        info!(local = %local.display(), remote, bytes = total, "uploading artifact");

        let mut file = self
            .session
            .open_with_flags(
                remote,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;

        let speed = SpeedCalculator::new(None, None);
        let mut written: u64 = 0;

        loop {
            let (returned, chunk) = tokio::task::spawn_blocking(move || {
                let mut r = reader;
                let chunk = r.next_chunk();
                (r, chunk)
            })
            .await
            .map_err(|e| SessionError::Io(std::io::Error::other(e)))?;
            reader = returned;

            let Some(chunk) = chunk? else {
                break;
            };

            file.write_all(&chunk.data).await?;
            written += chunk.size as u64;
            speed.add_sample(chunk.size as u64);
            debug!(
                offset = chunk.offset,
                written,
                total,
                checksum = %chunk.checksum,
                "chunk written"
            );
        }

        file.shutdown().await?;

        let sha256 = reader.file_checksum();
        info!(
            remote,
            bytes = written,
            rate_bps = speed.bytes_per_second() as u64,
            sha256 = %sha256,
            "upload complete"
        );
        Ok(UploadReceipt {
            bytes: written,
            sha256,
        })
    }

    /// Closes the SFTP subchannel.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.session.close().await?;
        debug!("SFTP subsystem closed");
        Ok(())
    }
}
