//! Uploads starter files into a freshly created project.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::Serialize;

use super::client::Session;
use super::timer::ScopedTimer;
use super::types::RepositoryFile;
use crate::error::{LabError, Mutation, Result};

/// Repository path and template file name, in upload order.
pub const DEFAULT_TEMPLATES: [(&str, &str); 5] = [
    (".gitlab-ci.yml", "template.yml"),
    (".gitignore", "gitignore.txt"),
    ("cliff.toml", "cliff.toml"),
    ("public/index.html", "index.html"),
    ("scripts/notify-failure.sh", "notify-failure.sh"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFile {
    pub repo_path: String,
    pub source: PathBuf,
}

/// A fixed, ordered set of template files rooted in a local directory.
#[derive(Debug, Clone)]
pub struct TemplateSeeder {
    files: Vec<TemplateFile>,
}

#[derive(Serialize)]
struct NewFile<'a> {
    branch: &'a str,
    content: &'a str,
    commit_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum SeedStatus {
    Uploaded,
    /// The local template is missing or unreadable
    MissingSource(String),
    /// GitLab refused the file, e.g. because it already exists
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub repo_path: String,
    pub status: SeedStatus,
}

/// Per-file results of one seeding run, in upload order.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub project_id: u64,
    pub branch: String,
    pub files: Vec<FileOutcome>,
}

impl SeedReport {
    pub fn uploaded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == SeedStatus::Uploaded)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.uploaded() == self.files.len()
    }
}

impl TemplateSeeder {
    /// Seeder for the default template set found in `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let files = DEFAULT_TEMPLATES
            .iter()
            .map(|(repo_path, source)| TemplateFile {
                repo_path: (*repo_path).to_string(),
                source: dir.join(source),
            })
            .collect();

        Self { files }
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    /// Uploads every template as its own commit on `branch`.
    ///
    /// Never stops early: a missing source or a rejected upload is recorded
    /// for that file and the next file is still attempted. Nothing already
    /// committed is reverted. Re-running against a seeded project reports
    /// every file as rejected, since existing files are not checked first.
    pub async fn seed(&self, session: &Session, project_id: u64, branch: &str) -> SeedReport {
        let _timer = ScopedTimer::operation("seed_templates");

        let mut outcomes = Vec::with_capacity(self.files.len());

        for file in self.files() {
            let status = match read_template(&file.source).await {
                Err(e) => {
                    error!("{e}");
                    SeedStatus::MissingSource(e.to_string())
                }
                Ok(content) => {
                    match upload(session, project_id, branch, &file.repo_path, &content).await {
                        Ok(created) => {
                            info!(
                                "Uploaded {} to {} on {}",
                                file.source.display(),
                                created.file_path,
                                created.branch
                            );
                            SeedStatus::Uploaded
                        }
                        Err(e) => {
                            warn!("Could not upload {}: {e}", file.repo_path);
                            SeedStatus::Rejected(e.to_string())
                        }
                    }
                }
            };

            outcomes.push(FileOutcome {
                repo_path: file.repo_path.clone(),
                status,
            });
        }

        let report = SeedReport {
            project_id,
            branch: branch.to_string(),
            files: outcomes,
        };

        if report.is_complete() {
            info!("All {} template files added to project {project_id}", report.files.len());
        } else {
            warn!(
                "{} of {} template files added to project {project_id}",
                report.uploaded(),
                report.files.len()
            );
        }

        report
    }
}

async fn read_template(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LabError::MissingTemplate {
            path: path.to_path_buf(),
        },
        _ => LabError::Io(e),
    })
}

async fn upload(
    session: &Session,
    project_id: u64,
    branch: &str,
    repo_path: &str,
    content: &str,
) -> Result<RepositoryFile> {
    let body = NewFile {
        branch,
        content,
        commit_message: format!("Add default CI/CD file {repo_path}"),
    };

    session
        .post(
            &format!(
                "projects/{project_id}/repository/files/{}",
                urlencoding::encode(repo_path)
            ),
            &body,
        )
        .await
        .map_err(|e| e.rejected(Mutation::Create, format!("file {repo_path}")))
}
