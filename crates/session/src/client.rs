//! SSH transport client.
//!
//! Thin wrapper over `russh`: connect + password auth, then one exec
//! channel per remote command. Commands block until the channel closes so
//! the caller always sees the exit status before issuing the next step.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client;
use russh::keys::key::PublicKey;
use russh::{ChannelMsg, Disconnect};
use tracing::{debug, info};

use crate::sftp::SftpClient;
use crate::SessionError;

/// Remote endpoint and credentials, resolved from configuration.
#[derive(Clone)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

// Manual Debug so the password never reaches logs.
impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Captured result of one remote command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status reported by the server. `None` if the channel closed
    /// without one (e.g. the command was killed by a signal).
    pub exit_status: Option<u32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` for a clean zero exit.
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        // The target host is fixed operator configuration; the host key is
        // not pinned.
        Ok(true)
    }
}

/// An authenticated SSH session to the deployment target.
pub struct SshClient {
    handle: client::Handle<ClientHandler>,
    host: String,
}

impl SshClient {
    /// Opens the transport on `target.port` and authenticates with the
    /// configured password.
    pub async fn connect(target: &Target) -> Result<Self, SessionError> {
        debug!(host = %target.host, port = target.port, "opening SSH transport");

        let config = Arc::new(client::Config::default());
        let mut handle = client::connect(
            config,
            (target.host.as_str(), target.port),
            ClientHandler,
        )
        .await?;

        let authenticated = handle
            .authenticate_password(target.username.as_str(), target.password.as_str())
            .await?;
        if !authenticated {
            return Err(SessionError::AuthenticationFailed(target.username.clone()));
        }

        info!(host = %target.host, user = %target.username, "SSH session established");
        Ok(Self {
            handle,
            host: target.host.clone(),
        })
    }

    /// Runs `command` on a fresh exec channel and waits for the channel to
    /// close, collecting stdout, stderr and the exit status.
    pub async fn exec(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        debug!(command, "executing remote command");

        let mut channel = self.handle.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut stdout: Vec<u8> = Vec::new();
        let mut stderr: Vec<u8> = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext: 1 } => stderr.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status: status } => exit_status = Some(status),
                _ => {}
            }
        }

        let output = CommandOutput {
            exit_status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };
        debug!(command, exit_status = ?output.exit_status, "remote command finished");
        Ok(output)
    }

    /// Opens the SFTP subsystem on a dedicated channel.
    pub async fn open_sftp(&mut self) -> Result<SftpClient, SessionError> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let session = russh_sftp::client::SftpSession::new(channel.into_stream()).await?;
        debug!(host = %self.host, "SFTP subsystem ready");
        Ok(SftpClient::new(session))
    }

    /// Sends an SSH disconnect and drops the transport.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        info!(host = %self.host, "SSH session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_output_success_requires_zero() {
        let ok = CommandOutput {
            exit_status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());

        let failed = CommandOutput {
            exit_status: Some(1),
            ..ok.clone()
        };
        assert!(!failed.success());

        let signalled = CommandOutput {
            exit_status: None,
            ..ok
        };
        assert!(!signalled.success());
    }

    #[test]
    fn target_debug_redacts_password() {
        let target = Target {
            host: "deploy.example.net".into(),
            port: 22,
            username: "root".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{target:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("deploy.example.net"));
    }
}
