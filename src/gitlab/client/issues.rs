use log::info;
use serde::Serialize;

use super::core::Session;
use crate::error::{Mutation, Result};
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::{Commit, Issue, IssueState};

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    /// Sent as the comma-separated form the API expects
    #[serde(serialize_with = "join_labels")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<u64>,
}

fn join_labels<S>(labels: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&labels.join(","))
}

impl Session {
    pub async fn list_issues(&self, project_id: u64, state: Option<IssueState>) -> Result<Vec<Issue>> {
        let _timer = ScopedTimer::operation("list_issues");

        let query: Vec<(&str, String)> = state
            .map(|s| vec![("state", s.as_str().to_string())])
            .unwrap_or_default();

        self.get_all(&format!("projects/{project_id}/issues"), &query)
            .await
    }

    pub async fn create_issue(&self, project_id: u64, issue: &NewIssue) -> Result<Issue> {
        let _timer = ScopedTimer::operation("create_issue");

        let created: Issue = self
            .post(&format!("projects/{project_id}/issues"), issue)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("issue in project {project_id}")))?;

        info!("Issue #{} created in project {project_id}", created.iid);
        Ok(created)
    }

    /// The `limit` most recent commits on the default branch (one page).
    pub async fn list_recent_commits(&self, project_id: u64, limit: usize) -> Result<Vec<Commit>> {
        self.get(
            &format!("projects/{project_id}/repository/commits"),
            &[("per_page", limit.to_string())],
        )
        .await
    }
}
