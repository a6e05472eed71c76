use log::info;
use serde::Serialize;

use super::core::Session;
use crate::error::{Mutation, Result};
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::{Group, Project};

#[derive(Serialize)]
struct NewGroup<'a> {
    name: &'a str,
    path: String,
    parent_id: u64,
}

impl Session {
    /// Creates a subgroup of `parent_id`.
    ///
    /// GitLab.com rejects creation of top-level groups through the API, so
    /// the parent is mandatory. The group path is derived from the name plus
    /// a random suffix, which means repeated calls create distinct groups.
    pub async fn create_group(&self, name: &str, parent_id: u64) -> Result<Group> {
        let _timer = ScopedTimer::operation("create_group");

        let body = NewGroup {
            name,
            path: unique_group_path(name),
            parent_id,
        };

        let group: Group = self
            .post("groups", &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("group '{name}'")))?;

        info!("Group created: {} ({})", group.name, group.full_path);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: u64) -> Result<Group> {
        self.get(&format!("groups/{group_id}"), &[]).await
    }

    /// Groups owned by the authenticated user, across all pages.
    pub async fn list_owned_groups(&self) -> Result<Vec<Group>> {
        let _timer = ScopedTimer::operation("list_owned_groups");
        self.get_all("groups", &[("owned", "true".to_string())])
            .await
    }

    pub async fn list_group_projects(&self, group_id: u64) -> Result<Vec<Project>> {
        let _timer = ScopedTimer::operation("list_group_projects");
        self.get_all(&format!("groups/{group_id}/projects"), &[])
            .await
    }
}

/// Builds a path-safe, collision-resistant group path from a display name.
pub(crate) fn unique_group_path(name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slugify(name), &suffix[..8])
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "group".to_string()
    } else {
        slug.to_string()
    }
}
