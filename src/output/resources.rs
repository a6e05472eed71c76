use std::fmt::Write;

use super::styling::{bright, cyan, dim, outcome};
use super::tables::table_with_header;
use super::Render;
use crate::gitlab::seeder::{SeedReport, SeedStatus};
use crate::gitlab::types::{CurrentUser, Group, GroupVariable, Issue, Member, Project};
use crate::gitlab::{
    describe_raw_level, AccessLevel, ProjectCreation, ProjectGroupSharing, StepOutcome,
};

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

impl Render for CurrentUser {
    fn render(&self) -> String {
        format!(
            "  {} {} {}\n  {} {}",
            dim("Logged in as:"),
            cyan(&self.username),
            dim(format!("({})", self.name)),
            dim("User ID:"),
            self.id
        )
    }
}

impl Render for Vec<Group> {
    fn render(&self) -> String {
        let mut table = table_with_header(&["ID", "Name", "Full path", "Parent"]);
        for group in self {
            table.add_row(vec![
                group.id.to_string(),
                group.name.clone(),
                group.full_path.clone(),
                group
                    .parent_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
            ]);
        }
        table.to_string()
    }
}

impl Render for Group {
    fn render(&self) -> String {
        format!(
            "  {} {}\n  {} {}\n  {} {}\n  {} {}",
            dim("Group:"),
            cyan(&self.name),
            dim("ID:"),
            self.id,
            dim("Path:"),
            self.full_path,
            dim("URL:"),
            or_dash(self.web_url.as_deref())
        )
    }
}

impl Render for Vec<Project> {
    fn render(&self) -> String {
        let mut table = table_with_header(&["ID", "Project", "Default branch"]);
        for project in self {
            table.add_row(vec![
                project.id.to_string(),
                project.display_name().to_string(),
                or_dash(project.default_branch.as_deref()).to_string(),
            ]);
        }
        table.to_string()
    }
}

impl Render for Project {
    fn render(&self) -> String {
        let mut output = format!(
            "  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
            dim("Project:"),
            cyan(self.display_name()),
            dim("ID:"),
            self.id,
            dim("Default branch:"),
            or_dash(self.default_branch.as_deref()),
            dim("URL:"),
            or_dash(self.web_url.as_deref())
        );

        if !self.shared_with_groups.is_empty() {
            let mut table = table_with_header(&["Shared with", "Access"]);
            for binding in &self.shared_with_groups {
                table.add_row(vec![
                    binding.group_full_path.clone(),
                    level_text(binding.level(), binding.group_access_level),
                ]);
            }
            let _ = write!(output, "{table}");
        }
        output
    }
}

impl Render for Vec<Member> {
    fn render(&self) -> String {
        let mut table = table_with_header(&["User ID", "Username", "Name", "Access"]);
        for member in self {
            table.add_row(vec![
                member.id.to_string(),
                member.username.clone(),
                member.name.clone(),
                level_text(member.level(), member.access_level),
            ]);
        }
        table.to_string()
    }
}

impl Render for Member {
    fn render(&self) -> String {
        format!(
            "  {} {} {} {}",
            cyan(&self.username),
            dim(format!("({})", self.id)),
            dim("has access"),
            bright(level_text(self.level(), self.access_level))
        )
    }
}

impl Render for GroupVariable {
    fn render(&self) -> String {
        let masked = if self.masked { "masked" } else { "visible" };
        format!("  {} {} {}", dim("Variable:"), cyan(&self.key), dim(masked))
    }
}

impl Render for Issue {
    fn render(&self) -> String {
        format!(
            "  {} #{} {}\n  {} {}",
            dim("Issue:"),
            self.iid,
            cyan(&self.title),
            dim("URL:"),
            or_dash(self.web_url.as_deref())
        )
    }
}

fn step(result: &StepOutcome) -> String {
    let reason = match result {
        StepOutcome::Done => None,
        StepOutcome::Failed(reason) => Some(reason.as_str()),
    };
    outcome(result.is_done(), reason)
}

/// Managed tiers by name; anything else dimmed.
fn level_text(managed: Option<AccessLevel>, raw: u8) -> String {
    match managed {
        Some(level) => level.to_string(),
        None => dim(describe_raw_level(raw)).to_string(),
    }
}

impl Render for SeedReport {
    fn render(&self) -> String {
        let mut table = table_with_header(&["File", "Result"]);
        for file in &self.files {
            let result = match &file.status {
                SeedStatus::Uploaded => outcome(true, None),
                SeedStatus::MissingSource(reason) | SeedStatus::Rejected(reason) => {
                    outcome(false, Some(reason.as_str()))
                }
            };
            table.add_row(vec![file.repo_path.clone(), result]);
        }
        format!(
            "  {} {}/{} on {}\n{table}",
            dim("Templates uploaded:"),
            self.uploaded(),
            self.files.len(),
            self.branch
        )
    }
}

impl Render for ProjectCreation {
    fn render(&self) -> String {
        let mut output = self.project.render();
        let _ = writeln!(
            output,
            "  {} {}\n  {} {}",
            dim("Protect v* tags:"),
            step(&self.protected_tag),
            dim("Tag v1.0.0:"),
            step(&self.initial_tag)
        );
        if let Some(report) = &self.templates {
            output.push_str(&report.render());
        }
        output
    }
}

impl Render for ProjectGroupSharing {
    fn render(&self) -> String {
        let mut output = format!(
            "  {} {}\n",
            dim("Project:"),
            cyan(self.project.display_name())
        );

        let mut shared = table_with_header(&["Shared with", "Access"]);
        for binding in &self.shared {
            shared.add_row(vec![
                binding.group_full_path.clone(),
                level_text(binding.level(), binding.group_access_level),
            ]);
        }
        let _ = writeln!(output, "{shared}");

        let mut available = table_with_header(&["ID", "Not shared with"]);
        for group in self.unshared_groups() {
            available.add_row(vec![group.id.to_string(), group.full_path.clone()]);
        }
        let _ = write!(output, "{available}");
        output
    }
}

/// Acknowledgement for operations without a result body.
#[derive(Debug, serde::Serialize)]
pub struct Done {
    pub message: String,
}

impl Render for Done {
    fn render(&self) -> String {
        format!("  {} {}", outcome(true, None), self.message)
    }
}
