use std::collections::HashSet;

use log::info;
use serde::Serialize;

use super::core::Session;
use crate::error::{LabError, Mutation, Result};
use crate::gitlab::access_level::AccessLevel;
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::{Group, Project, SharedGroupBinding};

#[derive(Serialize)]
struct ShareRequest {
    group_id: u64,
    group_access: u8,
}

/// A project, the caller's owned groups and the groups the project is
/// shared with, fetched together for the sharing view.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectGroupSharing {
    pub project: Project,
    pub groups: Vec<Group>,
    pub shared: Vec<SharedGroupBinding>,
}

impl ProjectGroupSharing {
    /// Owned groups the project is not yet shared with.
    pub fn unshared_groups(&self) -> Vec<&Group> {
        let shared: HashSet<u64> = self.shared.iter().map(|b| b.group_id).collect();
        self.groups
            .iter()
            .filter(|g| !shared.contains(&g.id))
            .collect()
    }
}

impl Session {
    /// Grants `group_id` access to `project_id` at `level`.
    pub async fn share_project(
        &self,
        project_id: u64,
        group_id: u64,
        level: AccessLevel,
    ) -> Result<()> {
        let _timer = ScopedTimer::operation("share_project");

        let project = self.get_project(project_id).await?;
        let group = self.get_group(group_id).await?;

        let body = ShareRequest {
            group_id: group.id,
            group_access: level.value(),
        };

        self.post_discard(&format!("projects/{}/share", project.id), &body)
            .await
            .map_err(|e| {
                e.rejected(
                    Mutation::Create,
                    format!("share of {} with {}", project.display_name(), group.name),
                )
            })?;

        info!(
            "Project {} shared with group {} as {level}",
            project.display_name(),
            group.name
        );
        Ok(())
    }

    pub async fn unshare_project(&self, project_id: u64, group_id: u64) -> Result<()> {
        let _timer = ScopedTimer::operation("unshare_project");

        let project = self.get_project(project_id).await?;
        let group = self.get_group(group_id).await?;

        self.delete(&format!("projects/{}/share/{}", project.id, group.id))
            .await
            .map_err(|e| {
                e.rejected(
                    Mutation::Delete,
                    format!("share of {} with {}", project.display_name(), group.name),
                )
            })?;

        info!(
            "Project {} unshared from group {}",
            project.display_name(),
            group.name
        );
        Ok(())
    }

    /// Fetches everything the sharing view needs in one call.
    ///
    /// Fails as a whole with [`LabError::PartialFailure`] when any sub-fetch
    /// fails; callers never see partially populated collections.
    pub async fn fetch_project_group_sharing(&self, project_id: u64) -> Result<ProjectGroupSharing> {
        let _timer = ScopedTimer::operation("fetch_project_group_sharing");

        let project = self
            .get_project(project_id)
            .await
            .map_err(|e| LabError::PartialFailure(format!("project {project_id}: {e}")))?;

        let groups = self
            .list_owned_groups()
            .await
            .map_err(|e| LabError::PartialFailure(format!("owned groups: {e}")))?;

        let shared = project.shared_with_groups.clone();

        Ok(ProjectGroupSharing {
            project,
            groups,
            shared,
        })
    }
}
