//! Deploy flow: gate check, artifact upload, verification, remote restart.
//!
//! This crate implements the **business logic** of a deployment. It is a
//! library crate with no transport dependencies — the binary provides a
//! [`ServerConnection`] implementation that bridges to the actual SSH/SFTP
//! client, and tests drive the pipeline with mocks.
//!
//! # Pipeline
//!
//! 1. **Gate** — deploy only from the trusted CI context
//! 2. **Locate** — find the single artifact in the build directory
//! 3. **Connect** — open the server connection
//! 4. **Ensure** — create the target directory if absent
//! 5. **Upload** — stream the artifact to its fixed remote path
//! 6. **Verify** — compare remote and local digests
//! 7. **Restart** — stop, clear the log, relaunch detached
//! 8. **Close**

pub mod error;
pub mod gate;
pub mod pipeline;
pub mod restart;
pub mod server;
pub mod types;

// Re-export primary types for convenience.
pub use error::DeployError;
pub use gate::{CiContext, Gate, GateDecision};
pub use pipeline::{DeployPlan, Deployer};
pub use restart::{RestartPlan, RestartStep, shell_quote};
pub use server::{ConnFuture, ServerConnection, ServerConnector};
pub use types::{ArtifactReport, ArtifactUpload, DeployReport, ExecOutput, RestartStepReport};
