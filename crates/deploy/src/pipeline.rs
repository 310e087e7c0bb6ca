//! The deploy pipeline.

use std::path::PathBuf;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use capstan_transfer::{find_build_artifact, validate_remote_dir, validate_remote_file_name};

use crate::error::DeployError;
use crate::gate::{CiContext, Gate, GateDecision};
use crate::restart::{RestartPlan, shell_quote};
use crate::server::{ServerConnection, ServerConnector};
use crate::types::{ArtifactReport, DeployReport, RestartStepReport};

/// Everything a deploy run needs to know, resolved from configuration
/// before anything touches the network.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub gate: Gate,
    pub ci: CiContext,
    /// Target host, for the report.
    pub host: String,
    /// Local build-output directory holding the single artifact.
    pub build_dir: PathBuf,
    /// Fixed remote target directory.
    pub remote_dir: String,
    /// Fixed remote file name the artifact is uploaded as.
    pub remote_file: String,
    pub restart: RestartPlan,
    /// Compare remote and local digests after the upload.
    pub verify_upload: bool,
}

impl DeployPlan {
    /// Full remote path of the uploaded artifact.
    pub fn remote_path(&self) -> String {
        format!(
            "{}/{}",
            self.remote_dir.trim_end_matches('/'),
            self.remote_file
        )
    }
}

/// Runs the fixed linear deploy pipeline.
pub struct Deployer {
    cancel: CancellationToken,
}

impl Default for Deployer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deployer {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a cancellation token for this deployment.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn check_cancelled(&self) -> Result<(), DeployError> {
        if self.cancel.is_cancelled() {
            return Err(DeployError::Cancelled);
        }
        Ok(())
    }

    /// Runs the deploy described by `plan`.
    ///
    /// The gate is evaluated before `connector` is ever called, so a
    /// skipped run has zero remote side effects. A fatal error aborts the
    /// remaining steps without a cleanup pass; the transport drops with
    /// the process.
    pub async fn run(
        &self,
        plan: &DeployPlan,
        connector: &dyn ServerConnector,
    ) -> Result<DeployReport, DeployError> {
        let deploy_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();

        // 1. Gate
        if let GateDecision::Skip { reason } = plan.gate.evaluate(&plan.ci) {
            info!(%reason, "deployment gate not satisfied, skipping");
            return Ok(DeployReport {
                deploy_id,
                host: plan.host.clone(),
                skipped: true,
                skip_reason: Some(reason),
                artifact: None,
                remote_path: None,
                verified: false,
                restart: Vec::new(),
                started_at,
                finished_at: Utc::now(),
            });
        }

        validate_remote_dir(&plan.remote_dir)?;
        validate_remote_file_name(&plan.remote_file)?;

        // 2. Locate the artifact
        self.check_cancelled()?;
        let artifact = find_build_artifact(&plan.build_dir)?;
        info!(
            artifact = %artifact.file_name,
            bytes = artifact.size,
            "build artifact located"
        );

        // 3. Connect
        self.check_cancelled()?;
        let conn = connector.connect().await?;

        // 4. Ensure the target directory exists
        self.check_cancelled()?;
        if conn.dir_exists(&plan.remote_dir).await? {
            debug!(dir = %plan.remote_dir, "remote directory already present");
        } else {
            conn.create_dir(&plan.remote_dir).await?;
        }

        // 5. Upload
        self.check_cancelled()?;
        let remote_path = plan.remote_path();
        let upload = conn.put_file(&artifact.path, &remote_path).await?;

        // 6. Verify
        let verified = if plan.verify_upload {
            self.check_cancelled()?;
            verify_upload(conn.as_ref(), &remote_path, &upload.sha256).await?;
            true
        } else {
            false
        };

        // 7. Restart
        let mut restart = Vec::new();
        for step in plan.restart.steps() {
            self.check_cancelled()?;
            info!(step = step.name, command = %step.command, "running restart step");
            let output = conn.exec(&step.command).await?;
            if !step.accepts(output.exit_status) {
                return Err(DeployError::CommandFailed {
                    step: step.name,
                    exit_status: output.exit_status,
                    stderr: output.stderr.trim().to_string(),
                });
            }
            restart.push(RestartStepReport {
                step: step.name.to_string(),
                command: step.command,
                exit_status: output.exit_status,
            });
        }

        // 8. Close
        conn.close().await?;

        let report = DeployReport {
            deploy_id,
            host: plan.host.clone(),
            skipped: false,
            skip_reason: None,
            artifact: Some(ArtifactReport {
                file_name: artifact.file_name,
                bytes: upload.bytes,
                sha256: upload.sha256,
            }),
            remote_path: Some(remote_path),
            verified,
            restart,
            started_at,
            finished_at: Utc::now(),
        };
        info!(deploy_id = %report.deploy_id, host = %report.host, "deployment complete");
        Ok(report)
    }
}

/// Compares the remote file's digest with the one streamed locally.
async fn verify_upload(
    conn: &dyn ServerConnection,
    remote_path: &str,
    expected: &str,
) -> Result<(), DeployError> {
    let command = format!("sha256sum {}", shell_quote(remote_path));
    let output = conn.exec(&command).await?;
    if !output.success() {
        return Err(DeployError::CommandFailed {
            step: "verify",
            exit_status: output.exit_status,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let remote = output
        .stdout
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if remote != expected {
        return Err(DeployError::ChecksumMismatch {
            local: expected.to_string(),
            remote,
        });
    }
    debug!(sha256 = %expected, "upload verified");
    Ok(())
}
