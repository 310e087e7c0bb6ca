//! Data types for the deploy flow.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one remote command, as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit status reported by the server; `None` if the command died
    /// without one.
    pub exit_status: Option<u32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

/// What the upload placed on the remote host.
#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    pub bytes: u64,
    /// Hex SHA-256 of the local artifact as it was streamed.
    pub sha256: String,
}

/// Artifact section of the deploy report.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub file_name: String,
    pub bytes: u64,
    pub sha256: String,
}

/// One restart step as it actually ran.
#[derive(Debug, Clone, Serialize)]
pub struct RestartStepReport {
    pub step: String,
    pub command: String,
    pub exit_status: Option<u32>,
}

/// Machine-readable summary of a deploy run, printed as JSON by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub deploy_id: String,
    pub host: String,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    pub verified: bool,
    pub restart: Vec<RestartStepReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_report_omits_empty_sections() {
        let report = DeployReport {
            deploy_id: "d1".into(),
            host: "deploy.example.net".into(),
            skipped: true,
            skip_reason: Some("branch feature is not main".into()),
            artifact: None,
            remote_path: None,
            verified: false,
            restart: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("skip_reason"));
        assert!(!json.contains("artifact"));
        assert!(!json.contains("remote_path"));
    }

    #[test]
    fn exec_output_success() {
        let out = ExecOutput {
            exit_status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(out.success());
        assert!(!ExecOutput {
            exit_status: None,
            ..out
        }
        .success());
    }
}
