//! SSH-backed implementation of the pipeline's server traits.
//!
//! Bridges [`capstan_deploy::ServerConnection`] to the session crate: the
//! SFTP subchannel handles the filesystem side, exec channels handle the
//! restart commands.

use std::path::Path;

use tokio::sync::Mutex;

use capstan_deploy::{
    ArtifactUpload, ConnFuture, DeployError, ExecOutput, ServerConnection, ServerConnector,
};
use capstan_session::{SessionError, SftpClient, SshClient, Target};

fn bridge(e: SessionError) -> DeployError {
    match e {
        SessionError::Transfer(t) => DeployError::Transfer(t),
        other => DeployError::Connection(other.to_string()),
    }
}

/// Connects to the deployment target over SSH.
pub struct SshConnector {
    target: Target,
}

impl SshConnector {
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

impl ServerConnector for SshConnector {
    fn connect(&self) -> ConnFuture<'_, Box<dyn ServerConnection>> {
        Box::pin(async move {
            let mut client = SshClient::connect(&self.target).await.map_err(bridge)?;
            let sftp = client.open_sftp().await.map_err(bridge)?;
            Ok(Box::new(SshServerConnection {
                client: Mutex::new(client),
                sftp,
            }) as Box<dyn ServerConnection>)
        })
    }
}

/// One SSH transport with an open SFTP subchannel.
pub struct SshServerConnection {
    client: Mutex<SshClient>,
    sftp: SftpClient,
}

impl ServerConnection for SshServerConnection {
    fn dir_exists<'a>(&'a self, path: &'a str) -> ConnFuture<'a, bool> {
        Box::pin(async move { self.sftp.dir_exists(path).await.map_err(bridge) })
    }

    fn create_dir<'a>(&'a self, path: &'a str) -> ConnFuture<'a, ()> {
        Box::pin(async move { self.sftp.create_dir(path).await.map_err(bridge) })
    }

    fn put_file<'a>(&'a self, local: &'a Path, remote: &'a str) -> ConnFuture<'a, ArtifactUpload> {
        Box::pin(async move {
            let receipt = self.sftp.put_file(local, remote).await.map_err(bridge)?;
            Ok(ArtifactUpload {
                bytes: receipt.bytes,
                sha256: receipt.sha256,
            })
        })
    }

    fn exec<'a>(&'a self, command: &'a str) -> ConnFuture<'a, ExecOutput> {
        Box::pin(async move {
            let output = self.client.lock().await.exec(command).await.map_err(bridge)?;
            Ok(ExecOutput {
                exit_status: output.exit_status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }

    fn close<'a>(&'a self) -> ConnFuture<'a, ()> {
        Box::pin(async move {
            // Transfer channel first, then the transport.
            self.sftp.close().await.map_err(bridge)?;
            self.client.lock().await.disconnect().await.map_err(bridge)?;
            Ok(())
        })
    }
}
