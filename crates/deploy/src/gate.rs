//! CI deployment gate.
//!
//! Deployment is permitted only from a trusted CI context: the expected
//! repository, not a pull request, on the expected branch. Anything else
//! is a silent skip — a successful run with zero remote side effects.

/// CI context as supplied by the build environment.
///
/// Absent variables stay `None`; the gate treats them as a mismatch, so a
/// run outside CI skips deployment instead of failing.
#[derive(Debug, Clone, Default)]
pub struct CiContext {
    pub repo_slug: Option<String>,
    pub pull_request: Option<String>,
    pub branch: Option<String>,
}

/// Expected trusted CI values.
#[derive(Debug, Clone)]
pub struct Gate {
    pub repo_slug: String,
    pub branch: String,
}

/// Outcome of the gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Skip { reason: String },
}

impl Gate {
    pub fn new(repo_slug: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_slug: repo_slug.into(),
            branch: branch.into(),
        }
    }

    /// Checks `ctx` against the trusted values.
    pub fn evaluate(&self, ctx: &CiContext) -> GateDecision {
        let Some(repo_slug) = ctx.repo_slug.as_deref() else {
            return skip("repository slug not set");
        };
        if repo_slug != self.repo_slug {
            return skip(format!(
                "repository {repo_slug} is not {}",
                self.repo_slug
            ));
        }

        let Some(pull_request) = ctx.pull_request.as_deref() else {
            return skip("pull request flag not set");
        };
        if pull_request != "false" {
            return skip(format!("pull request build ({pull_request})"));
        }

        let Some(branch) = ctx.branch.as_deref() else {
            return skip("branch not set");
        };
        if branch != self.branch {
            return skip(format!("branch {branch} is not {}", self.branch));
        }

        GateDecision::Proceed
    }
}

fn skip(reason: impl Into<String>) -> GateDecision {
    GateDecision::Skip {
        reason: reason.into(),
    }
}
