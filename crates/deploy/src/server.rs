//! Server connection traits.
//!
//! The pipeline talks to the remote host through these traits so it stays
//! decoupled from the actual SSH/SFTP transport and testable with mocks.
//! The binary implements them on top of the session crate.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::error::DeployError;
use crate::types::{ArtifactUpload, ExecOutput};

/// Boxed future returned by connection methods.
pub type ConnFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeployError>> + Send + 'a>>;

/// An open connection to the deployment target.
pub trait ServerConnection: Send + Sync {
    /// Returns whether the remote path exists.
    fn dir_exists<'a>(&'a self, path: &'a str) -> ConnFuture<'a, bool>;

    /// Creates the remote directory.
    fn create_dir<'a>(&'a self, path: &'a str) -> ConnFuture<'a, ()>;

    /// Uploads `local` to the fixed `remote` path, replacing any previous
    /// file. All-or-nothing: an error means the deploy aborts.
    fn put_file<'a>(&'a self, local: &'a Path, remote: &'a str) -> ConnFuture<'a, ArtifactUpload>;

    /// Runs a remote command and waits for its exit status.
    fn exec<'a>(&'a self, command: &'a str) -> ConnFuture<'a, ExecOutput>;

    /// Closes the connection.
    fn close<'a>(&'a self) -> ConnFuture<'a, ()>;
}

/// Produces connections, so the pipeline controls *when* a connection is
/// opened — nothing touches the network before the gate has passed.
pub trait ServerConnector: Send + Sync {
    fn connect(&self) -> ConnFuture<'_, Box<dyn ServerConnection>>;
}
