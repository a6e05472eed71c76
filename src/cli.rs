use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::Term;
use log::{error, info, warn};

use crate::auth::Token;
use crate::config::Config;
use crate::error::LabError;
use crate::gitlab::{AccessLevel, MemberScope, Session, TemplateSeeder};
use crate::notifier::{self, CiContext};
use crate::output::{self, bright_green, dim, DetailProgress, Done, Format};

const TOKEN_VARIABLE: &str = "GITLAB_PRIVATE_TOKEN";

#[derive(Parser)]
#[command(name = "labdash")]
#[command(author, version, about = "GitLab Automation Client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Pretty-print JSON (implies --json)
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Configuration file (default: ./labdash.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitLab instance base URL
    #[arg(short, long, global = true, env = "GITLAB_URL")]
    url: Option<String>,

    /// GitLab personal access token
    #[arg(short, long, global = true, env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Group new subgroups and projects are created under
    #[arg(long, global = true, env = "PARENT_GROUP_ID")]
    parent_group: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify credentials interactively and save them
    Login,
    /// Show the authenticated user
    Whoami,
    Group {
        #[command(subcommand)]
        action: GroupCommand,
    },
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    Report {
        #[command(subcommand)]
        action: ReportCommand,
    },
    /// Store the private token as a masked CI/CD variable on a group
    SetupVariables {
        /// Target group (default: the parent group)
        #[arg(long)]
        group: Option<u64>,
    },
    /// Open an issue for the failed commit (run inside a CI job)
    NotifyFailure {
        #[command(flatten)]
        ctx: CiContext,
    },
}

#[derive(Subcommand)]
enum GroupCommand {
    /// Groups owned by the authenticated user
    List,
    /// Create a subgroup with a unique path
    Create {
        name: String,
        /// Parent group (default: the configured parent group)
        #[arg(long)]
        parent: Option<u64>,
    },
    /// Projects in a group
    Projects { group_id: u64 },
    #[command(flatten)]
    Member(MemberAction),
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Projects owned by the authenticated user
    List,
    Show { project_id: u64 },
    /// Create a project, protect release tags, tag v1.0.0 and upload templates
    Create {
        name: String,
        /// Namespace (group) ID (default: the configured parent group)
        #[arg(long)]
        namespace: Option<u64>,
        /// Template directory (default: from configuration)
        #[arg(long)]
        templates: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_templates: bool,
    },
    /// Failing pipelines, open issues and recent commits
    Summary { project_id: u64 },
    #[command(flatten)]
    Member(MemberAction),
    /// Grant a group access to a project
    Share {
        project_id: u64,
        group_id: u64,
        #[arg(long, default_value = "MAINTAINER")]
        level: AccessLevel,
    },
    /// Revoke a group's access to a project
    Unshare { project_id: u64, group_id: u64 },
    /// Groups the project is and is not shared with
    Sharing { project_id: u64 },
    /// Upload the template files into an existing project
    Seed {
        project_id: u64,
        /// Target branch (default: the project's default branch)
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        templates: Option<PathBuf>,
    },
}

/// Membership commands shared by groups and projects; `id` names the group
/// or project.
#[derive(Subcommand)]
enum MemberAction {
    /// Direct members
    Members { id: u64 },
    AddMember {
        id: u64,
        user_id: u64,
        /// GUEST, REPORTER, DEVELOPER, MAINTAINER or the numeric value
        level: AccessLevel,
    },
    RemoveMember { id: u64, user_id: u64 },
    /// Change an existing member's access level
    SetAccess {
        id: u64,
        user_id: u64,
        level: AccessLevel,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Share of pipelines that succeeded
    SuccessRate { project_id: u64 },
    /// Mean pipeline run time
    RunTime { project_id: u64 },
    /// Time from opening to closing issues
    Issues { project_id: u64 },
}

impl Cli {
    fn format(&self, config: &Config) -> Format {
        if self.json || self.pretty {
            Format::Json {
                pretty: self.pretty || config.output.pretty,
            }
        } else {
            Format::Table
        }
    }

    fn base_url(&self, config: &Config) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| config.gitlab.base_url.clone())
    }

    fn token(&self, config: &Config) -> Option<Token> {
        self.token
            .clone()
            .or_else(|| config.gitlab.token.clone())
            .map(Token::from)
            .filter(|t| !t.is_empty())
    }

    fn parent_group(&self, config: &Config, explicit: Option<u64>) -> Result<u64> {
        explicit
            .or(self.parent_group)
            .or(config.gitlab.parent_group_id)
            .context("No parent group configured; pass it explicitly, set PARENT_GROUP_ID or run `labdash login`")
    }

    fn seeder(&self, config: &Config, dir: Option<&PathBuf>) -> TemplateSeeder {
        TemplateSeeder::new(dir.unwrap_or(&config.templates.dir))
    }

    /// Connects with the resolved credentials, prompting for new ones when
    /// none are configured or they are refused and a terminal is attached.
    async fn connect(&self, config: &mut Config) -> Result<Session> {
        let interactive = std::io::stdin().is_terminal();
        match self.token(config) {
            Some(token) => match Session::connect(&self.base_url(config), token).await {
                Ok(session) => Ok(session),
                Err(e) if should_prompt(&e, interactive) => {
                    warn!("{e}; starting login");
                    self.login(config).await
                }
                Err(e) => Err(e.into()),
            },
            None if interactive => {
                info!("No private token configured, starting login");
                self.login(config).await
            }
            None => bail!("No private token configured; set GITLAB_PRIVATE_TOKEN or run `labdash login`"),
        }
    }

    async fn login(&self, config: &mut Config) -> Result<Session> {
        let term = Term::stderr();
        term.write_line(&format!("{}", bright_green("Connect labdash to GitLab")))?;

        let url = prompt(&term, "GitLab URL", Some(&self.base_url(config)))?;

        term.write_str(&format!("{} ", dim("Private token:")))?;
        let token = Token::from(term.read_secure_line()?);

        let current_parent = self
            .parent_group
            .or(config.gitlab.parent_group_id)
            .map(|id| id.to_string());
        let parent = prompt(&term, "Parent group ID", current_parent.as_deref())?;
        let parent_group_id = if parent.is_empty() {
            None
        } else {
            Some(
                parent
                    .parse::<u64>()
                    .with_context(|| format!("Invalid group ID: {parent}"))?,
            )
        };

        let session = Session::connect(&url, token.clone()).await?;

        config.gitlab.base_url = url;
        config.gitlab.token = Some(token.as_str().to_string());
        config.gitlab.parent_group_id = parent_group_id;

        let path = self
            .config
            .clone()
            .or_else(Config::default_path)
            .context("No configuration directory available; pass --config")?;
        config.save(&path)?;
        info!(
            "Credentials for {} saved to {}",
            session.instance_url(),
            path.display()
        );

        Ok(session)
    }

    pub async fn execute(&self) -> Result<()> {
        let result = self.run().await;
        if let Err(e) = &result {
            error!("{e:#}");
        }
        result
    }

    async fn run(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        let format = self.format(&config);

        match &self.command {
            Commands::Login => {
                let session = self.login(&mut config).await?;
                output::emit(session.user(), format)
            }
            Commands::Whoami => {
                let session = self.connect(&mut config).await?;
                output::emit(session.user(), format)
            }
            Commands::Group { action } => {
                let session = self.connect(&mut config).await?;
                self.execute_group(&session, &config, action, format).await
            }
            Commands::Project { action } => {
                let session = self.connect(&mut config).await?;
                self.execute_project(&session, &config, action, format)
                    .await
            }
            Commands::Report { action } => {
                let session = self.connect(&mut config).await?;
                execute_report(&session, action, format).await
            }
            Commands::SetupVariables { group } => {
                let session = self.connect(&mut config).await?;
                let group_id = self.parent_group(&config, *group)?;
                let token = self
                    .token(&config)
                    .context("No private token to store")?;
                let variable = session
                    .create_group_variable(group_id, TOKEN_VARIABLE, token.as_str(), true)
                    .await?;
                output::emit(&variable, format)
            }
            Commands::NotifyFailure { ctx } => {
                let session = self.connect(&mut config).await?;
                let issue = notifier::notify_failure(&session, ctx).await?;
                output::emit(&issue, format)
            }
        }
    }

    async fn execute_group(
        &self,
        session: &Session,
        config: &Config,
        action: &GroupCommand,
        format: Format,
    ) -> Result<()> {
        match action {
            GroupCommand::List => output::emit(&session.list_owned_groups().await?, format),
            GroupCommand::Create { name, parent } => {
                let parent_id = self.parent_group(config, *parent)?;
                let group = session.create_group(name, parent_id).await?;
                output::emit(&group, format)
            }
            GroupCommand::Projects { group_id } => {
                output::emit(&session.list_group_projects(*group_id).await?, format)
            }
            GroupCommand::Member(member) => {
                execute_member(session, MemberScope::Group, member, format).await
            }
        }
    }

    async fn execute_project(
        &self,
        session: &Session,
        config: &Config,
        action: &ProjectCommand,
        format: Format,
    ) -> Result<()> {
        match action {
            ProjectCommand::List => output::emit(&session.list_owned_projects().await?, format),
            ProjectCommand::Show { project_id } => {
                output::emit(&session.get_project(*project_id).await?, format)
            }
            ProjectCommand::Create {
                name,
                namespace,
                templates,
                no_templates,
            } => {
                let namespace_id = self.parent_group(config, *namespace)?;
                let seeder = (!*no_templates).then(|| self.seeder(config, templates.as_ref()));
                let created = session
                    .create_project(name, namespace_id, seeder.as_ref())
                    .await?;
                output::emit(&created, format)
            }
            ProjectCommand::Summary { project_id } => {
                output::emit(&session.project_summary(*project_id).await?, format)
            }
            ProjectCommand::Member(member) => {
                execute_member(session, MemberScope::Project, member, format).await
            }
            ProjectCommand::Share {
                project_id,
                group_id,
                level,
            } => {
                session.share_project(*project_id, *group_id, *level).await?;
                let done = Done {
                    message: format!("Project {project_id} shared with group {group_id} as {level}"),
                };
                output::emit(&done, format)
            }
            ProjectCommand::Unshare {
                project_id,
                group_id,
            } => {
                session.unshare_project(*project_id, *group_id).await?;
                let done = Done {
                    message: format!("Project {project_id} unshared from group {group_id}"),
                };
                output::emit(&done, format)
            }
            ProjectCommand::Sharing { project_id } => output::emit(
                &session.fetch_project_group_sharing(*project_id).await?,
                format,
            ),
            ProjectCommand::Seed {
                project_id,
                branch,
                templates,
            } => {
                let branch = match branch {
                    Some(branch) => branch.clone(),
                    None => session.default_branch(*project_id).await?,
                };
                let report = self
                    .seeder(config, templates.as_ref())
                    .seed(session, *project_id, &branch)
                    .await;
                output::emit(&report, format)?;
                if !report.is_complete() {
                    bail!(
                        "{} of {} template files could not be added",
                        report.files.len() - report.uploaded(),
                        report.files.len()
                    );
                }
                Ok(())
            }
        }
    }
}

async fn execute_member(
    session: &Session,
    scope: fn(u64) -> MemberScope,
    action: &MemberAction,
    format: Format,
) -> Result<()> {
    match action {
        MemberAction::Members { id } => {
            output::emit(&session.list_members(scope(*id)).await?, format)
        }
        MemberAction::AddMember { id, user_id, level } => {
            let member = session.add_member(scope(*id), *user_id, *level).await?;
            output::emit(&member, format)
        }
        MemberAction::RemoveMember { id, user_id } => {
            let scope = scope(*id);
            session.remove_member(scope, *user_id).await?;
            let done = Done {
                message: format!("User {user_id} removed from {scope}"),
            };
            output::emit(&done, format)
        }
        MemberAction::SetAccess { id, user_id, level } => {
            let member = session
                .change_member_access_level(scope(*id), *user_id, *level)
                .await?;
            output::emit(&member, format)
        }
    }
}

async fn execute_report(session: &Session, action: &ReportCommand, format: Format) -> Result<()> {
    match action {
        ReportCommand::SuccessRate { project_id } => output::emit(
            &session.pipeline_success_report(*project_id).await?,
            format,
        ),
        ReportCommand::RunTime { project_id } => {
            let mut progress = match format {
                Format::Table => DetailProgress::start(*project_id),
                Format::Json { .. } => DetailProgress::hidden(),
            };
            output::emit(
                &session
                    .pipeline_run_time_report(*project_id, &mut progress)
                    .await?,
                format,
            )
        }
        ReportCommand::Issues { project_id } => output::emit(
            &session.issue_completion_report(*project_id).await?,
            format,
        ),
    }
}

/// Whether a failed connection falls back to interactive login.
fn should_prompt(err: &LabError, interactive: bool) -> bool {
    interactive && matches!(err, LabError::Auth(_))
}

/// Reads one line, falling back to `default` when left empty.
fn prompt(term: &Term, label: &str, default: Option<&str>) -> Result<String> {
    let hint = default.map(|d| format!(" [{d}]")).unwrap_or_default();
    term.write_str(&format!("{} ", dim(format!("{label}{hint}:"))))?;
    let line = term.read_line()?;
    let value = line.trim();

    Ok(if value.is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        value.to_string()
    })
}
