use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access_level::AccessLevel;
use super::timestamp;

/// The user a token authenticates as, returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// A GitLab group.
///
/// Groups created through this tool are always subgroups, so `parent_id`
/// is set for them; groups listed from the API may be top-level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub path: String,
    /// Slash-separated path including all parent groups
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: u64,
    #[serde(default)]
    pub full_path: String,
}

/// A GitLab project with the subset of fields this tool reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub name_with_namespace: String,
    #[serde(default)]
    pub namespace: Option<Namespace>,
    /// Absent on projects with an empty repository
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub shared_with_groups: Vec<SharedGroupBinding>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Project {
    pub fn display_name(&self) -> &str {
        if self.name_with_namespace.is_empty() {
            &self.name
        } else {
            &self.name_with_namespace
        }
    }
}

/// A group granted access to a project independently of direct membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedGroupBinding {
    pub group_id: u64,
    pub group_name: String,
    #[serde(default)]
    pub group_full_path: String,
    pub group_access_level: u8,
}

impl SharedGroupBinding {
    pub fn level(&self) -> Option<AccessLevel> {
        AccessLevel::try_from(self.group_access_level).ok()
    }
}

/// A direct member of a group or project.
///
/// `access_level` is kept raw because the API also reports tiers outside the
/// managed set (owners, minimal access).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// User ID
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub access_level: u8,
}

impl Member {
    pub fn level(&self) -> Option<AccessLevel> {
        AccessLevel::try_from(self.access_level).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    #[serde(other)]
    Unknown,
}

impl PipelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::WaitingForResource => "waiting_for_resource",
            Self::Preparing => "preparing",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Unknown => "unknown",
        }
    }
}

/// A CI/CD pipeline run.
///
/// List endpoints omit `started_at`/`finished_at`; they are only populated
/// when a pipeline is fetched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    /// Git reference that triggered the pipeline (e.g., "main")
    #[serde(rename = "ref", default)]
    pub ref_: String,
    pub status: PipelineStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub started_at: Option<DateTime<Utc>>,
    /// Empty while the pipeline is still running
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Opened,
    Closed,
    #[serde(other)]
    Other,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Project-scoped issue number
    pub iid: u64,
    pub title: String,
    pub state: IssueState,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub short_id: String,
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedTag {
    pub name: String,
}

/// Response of the repository file creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryFile {
    pub file_path: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupVariable {
    pub key: String,
    #[serde(default)]
    pub masked: bool,
}
