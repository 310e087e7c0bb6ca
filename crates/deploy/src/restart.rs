//! Remote restart sequence.
//!
//! Two policies, matching how the deployment target may be set up:
//! an inline stop / clear-log / relaunch sequence, or a single consolidated
//! restart script already present on the server. Every step runs blocking
//! and is exit-checked before the next one is issued, so the old process
//! is gone before the new one starts.

/// One remote command of the restart sequence.
#[derive(Debug, Clone)]
pub struct RestartStep {
    pub name: &'static str,
    pub command: String,
    /// Exit statuses that count as success for this step.
    acceptable: &'static [u32],
}

impl RestartStep {
    /// Returns whether `status` is an acceptable outcome.
    ///
    /// A missing exit status never is.
    pub fn accepts(&self, status: Option<u32>) -> bool {
        status.is_some_and(|s| self.acceptable.contains(&s))
    }
}

/// How the server process is restarted after the upload.
#[derive(Debug, Clone)]
pub enum RestartPlan {
    /// Stop any running instance, clear the log, relaunch detached.
    Inline {
        /// `pkill -f` pattern matching the running instance.
        process_pattern: String,
        /// Directory the process is launched from.
        remote_dir: String,
        /// Launch command, e.g. `java -jar server.jar`. Trusted operator
        /// configuration, interpolated verbatim.
        launch_command: String,
        /// Log file the relaunched process writes to.
        log_file: String,
    },
    /// Run a consolidated restart script on the server.
    Script { path: String },
}

impl RestartPlan {
    /// Expands the plan into the ordered command sequence.
    pub fn steps(&self) -> Vec<RestartStep> {
        match self {
            RestartPlan::Inline {
                process_pattern,
                remote_dir,
                launch_command,
                log_file,
            } => vec![
                RestartStep {
                    name: "stop",
                    command: format!("pkill -f {}", shell_quote(process_pattern)),
                    // pkill exits 1 when nothing matched — nothing was
                    // running, which is fine on a first deploy.
                    acceptable: &[0, 1],
                },
                RestartStep {
                    name: "clear-log",
                    command: format!("rm -f {}", shell_quote(log_file)),
                    acceptable: &[0],
                },
                RestartStep {
                    name: "launch",
                    // The shell returns once the process is backgrounded;
                    // the process itself outlives the command session.
                    command: format!(
                        "cd {} && nohup {} > {} 2>&1 &",
                        shell_quote(remote_dir),
                        launch_command,
                        shell_quote(log_file)
                    ),
                    acceptable: &[0],
                },
            ],
            RestartPlan::Script { path } => vec![RestartStep {
                name: "restart-script",
                command: format!("sh {}", shell_quote(path)),
                acceptable: &[0],
            }],
        }
    }
}

/// Single-quotes `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}
