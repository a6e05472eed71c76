use log::{info, warn};
use serde::Serialize;

use super::core::Session;
use crate::error::{Mutation, Result};
use crate::gitlab::access_level::AccessLevel;
use crate::gitlab::seeder::{SeedReport, TemplateSeeder};
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::{Project, ProtectedTag, Tag};

/// Tag pattern only maintainers may create on new projects
pub const RELEASE_TAG_PATTERN: &str = "v*";
pub const INITIAL_TAG: &str = "v1.0.0";
pub const FALLBACK_BRANCH: &str = "main";

#[derive(Serialize)]
struct NewProject<'a> {
    name: &'a str,
    namespace_id: u64,
    initialize_with_readme: bool,
}

#[derive(Serialize)]
struct NewProtectedTag<'a> {
    name: &'a str,
    create_access_level: u8,
}

#[derive(Serialize)]
struct NewTag<'a> {
    tag_name: &'a str,
    #[serde(rename = "ref")]
    ref_: &'a str,
}

/// Result of one best-effort follow-up step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    Failed(String),
}

impl StepOutcome {
    fn from_result<T>(step: &str, result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::Done,
            Err(e) => {
                warn!("{step} failed: {e}");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// A created project together with the outcome of each follow-up step.
///
/// The project exists as soon as this value exists; follow-up failures are
/// recorded here and never undo the creation.
#[derive(Debug, Serialize)]
pub struct ProjectCreation {
    pub project: Project,
    pub protected_tag: StepOutcome,
    pub initial_tag: StepOutcome,
    pub templates: Option<SeedReport>,
}

impl Session {
    /// Creates a README-initialised project in `namespace_id`.
    ///
    /// Afterwards, each of these runs regardless of whether the others
    /// succeeded: protect `v*` tags for maintainers, tag the default branch
    /// as `v1.0.0`, and upload the templates when a seeder is given.
    pub async fn create_project(
        &self,
        name: &str,
        namespace_id: u64,
        seeder: Option<&TemplateSeeder>,
    ) -> Result<ProjectCreation> {
        let _timer = ScopedTimer::operation("create_project");

        let body = NewProject {
            name,
            namespace_id,
            initialize_with_readme: true,
        };

        let project: Project = self
            .post("projects", &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("project '{name}'")))?;

        info!("Project created: {} ({})", project.display_name(), project.id);

        let branch = project
            .default_branch
            .clone()
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());

        let protected_tag = StepOutcome::from_result(
            "Protecting release tags",
            self.protect_tags(project.id, RELEASE_TAG_PATTERN, AccessLevel::Maintainer)
                .await,
        );

        let initial_tag = StepOutcome::from_result(
            "Creating initial tag",
            self.create_tag(project.id, INITIAL_TAG, &branch).await,
        );

        let templates = match seeder {
            Some(seeder) => Some(seeder.seed(self, project.id, &branch).await),
            None => None,
        };

        Ok(ProjectCreation {
            project,
            protected_tag,
            initial_tag,
            templates,
        })
    }

    pub async fn protect_tags(
        &self,
        project_id: u64,
        pattern: &str,
        level: AccessLevel,
    ) -> Result<ProtectedTag> {
        let body = NewProtectedTag {
            name: pattern,
            create_access_level: level.value(),
        };

        self.post(&format!("projects/{project_id}/protected_tags"), &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("protected tag '{pattern}'")))
    }

    pub async fn create_tag(&self, project_id: u64, name: &str, ref_: &str) -> Result<Tag> {
        let body = NewTag {
            tag_name: name,
            ref_,
        };

        self.post(&format!("projects/{project_id}/repository/tags"), &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("tag '{name}'")))
    }

    pub async fn get_project(&self, project_id: u64) -> Result<Project> {
        let _timer = ScopedTimer::operation("get_project");
        self.get(&format!("projects/{project_id}"), &[]).await
    }

    /// Projects owned by the authenticated user, across all pages.
    pub async fn list_owned_projects(&self) -> Result<Vec<Project>> {
        let _timer = ScopedTimer::operation("list_owned_projects");
        self.get_all("projects", &[("owned", "true".to_string())])
            .await
    }

    /// Default branch of a project, falling back to `main` for empty repos.
    pub async fn default_branch(&self, project_id: u64) -> Result<String> {
        let project = self.get_project(project_id).await?;
        Ok(project
            .default_branch
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
    }
}
