//! Opens an issue for a failed pipeline, from inside a CI job.

use clap::Args;
use log::info;

use crate::error::Result;
use crate::gitlab::types::Issue;
use crate::gitlab::{NewIssue, Session};

pub const FAILURE_LABELS: [&str; 2] = ["bug", "workflow::to-do"];

/// Predefined CI/CD variables describing the failed commit.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CiContext {
    #[arg(long, env = "CI_PROJECT_ID")]
    pub project_id: u64,

    #[arg(long, env = "CI_PROJECT_NAME")]
    pub project_name: String,

    #[arg(long, env = "CI_PROJECT_URL")]
    pub project_url: String,

    #[arg(long, env = "CI_COMMIT_SHA")]
    pub commit_sha: String,

    #[arg(long, env = "CI_COMMIT_SHORT_SHA")]
    pub commit_short_sha: String,

    /// User who triggered the pipeline; the issue is assigned to them
    #[arg(long, env = "GITLAB_USER_ID")]
    pub user_id: u64,
}

impl CiContext {
    pub fn issue(&self) -> NewIssue {
        NewIssue {
            title: format!(
                "Commit ({}) in {} ({}) failed",
                self.commit_short_sha, self.project_name, self.project_id
            ),
            description: format!(
                "Pipeline failed. Please review commit in {}/-/commit/{}",
                self.project_url.trim_end_matches('/'),
                self.commit_sha
            ),
            labels: FAILURE_LABELS.iter().map(ToString::to_string).collect(),
            assignee_ids: vec![self.user_id],
        }
    }
}

pub async fn notify_failure(session: &Session, ctx: &CiContext) -> Result<Issue> {
    let issue = session.create_issue(ctx.project_id, &ctx.issue()).await?;
    info!(
        "Reported failure of {} as issue #{}",
        ctx.commit_short_sha, issue.iid
    );
    Ok(issue)
}
