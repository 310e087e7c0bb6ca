//! Deployer configuration.
//!
//! Everything comes from the process environment, read once at startup
//! into an explicit struct. Required variables are validated eagerly and
//! a single error enumerates every missing key.
//!
//! Required: `SERVER_HOST`, `SERVER_USER`, `SERVER_PASS`, `DEPLOY_REPO`.
//! CI context (read, never required): `TRAVIS_REPO_SLUG`,
//! `TRAVIS_PULL_REQUEST`, `TRAVIS_BRANCH`.

use std::path::PathBuf;

use capstan_deploy::{CiContext, DeployPlan, Gate, RestartPlan};
use capstan_session::Target;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Deployer configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    pub gate: Gate,
    pub ci: CiContext,
    pub build_dir: PathBuf,
    pub remote_dir: String,
    pub remote_file: String,
    pub log_file: String,
    pub process_pattern: String,
    pub launch_command: String,
    pub restart_script: Option<String>,
    pub verify_upload: bool,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, so tests never touch the
    /// real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &str| -> String {
            match lookup(key) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        };

        let host = required("SERVER_HOST");
        let username = required("SERVER_USER");
        let password = required("SERVER_PASS");
        let repo_slug = required("DEPLOY_REPO");

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let port = match lookup("SERVER_PORT") {
            Some(v) if !v.is_empty() => {
                v.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    key: "SERVER_PORT".into(),
                    value: v.clone(),
                })?
            }
            _ => 22,
        };

        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let branch = optional("DEPLOY_BRANCH", "main");
        let build_dir = PathBuf::from(optional("DEPLOY_BUILD_DIR", "build/libs"));
        let remote_dir = optional("DEPLOY_REMOTE_DIR", "/root/web");
        let remote_file = optional("DEPLOY_REMOTE_FILE", "server.jar");
        let log_file = optional("DEPLOY_LOG_FILE", "/root/web/log.txt");
        let process_pattern = optional("DEPLOY_PROCESS_PATTERN", "server.jar");
        let launch_command = optional("DEPLOY_LAUNCH_COMMAND", "java -jar server.jar");
        let restart_script = lookup("DEPLOY_RESTART_SCRIPT").filter(|v| !v.is_empty());
        let verify_upload = lookup("DEPLOY_SKIP_VERIFY")
            .filter(|v| !v.is_empty())
            .is_none();

        let ci = CiContext {
            repo_slug: lookup("TRAVIS_REPO_SLUG"),
            pull_request: lookup("TRAVIS_PULL_REQUEST"),
            branch: lookup("TRAVIS_BRANCH"),
        };

        Ok(Self {
            target: Target {
                host,
                port,
                username,
                password,
            },
            gate: Gate::new(repo_slug, branch),
            ci,
            build_dir,
            remote_dir,
            remote_file,
            log_file,
            process_pattern,
            launch_command,
            restart_script,
            verify_upload,
        })
    }

    /// Restart policy: the consolidated remote script when configured,
    /// otherwise the inline stop/clear/launch sequence.
    pub fn restart_plan(&self) -> RestartPlan {
        match &self.restart_script {
            Some(path) => RestartPlan::Script { path: path.clone() },
            None => RestartPlan::Inline {
                process_pattern: self.process_pattern.clone(),
                remote_dir: self.remote_dir.clone(),
                launch_command: self.launch_command.clone(),
                log_file: self.log_file.clone(),
            },
        }
    }

    /// Builds the pipeline plan.
    pub fn deploy_plan(&self) -> DeployPlan {
        DeployPlan {
            gate: self.gate.clone(),
            ci: self.ci.clone(),
            host: self.target.host.clone(),
            build_dir: self.build_dir.clone(),
            remote_dir: self.remote_dir.clone(),
            remote_file: self.remote_file.clone(),
            restart: self.restart_plan(),
            verify_upload: self.verify_upload,
        }
    }
}
