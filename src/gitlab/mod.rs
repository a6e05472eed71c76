mod access_level;
pub mod analytics;
mod client;
mod reports;
pub mod seeder;
mod timer;
pub mod timestamp;
pub mod types;

pub use access_level::{describe_raw_level, AccessLevel};
pub use client::{MemberScope, NewIssue, ProjectCreation, ProjectGroupSharing, Session, StepOutcome};
pub use reports::{DetailObserver, ProjectSummary};
pub use seeder::TemplateSeeder;

#[cfg(test)]
pub(crate) use client::testing;
