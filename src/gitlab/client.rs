mod core;
mod groups;
mod issues;
mod members;
mod pipelines;
mod projects;
mod sharing;
mod variables;

pub use self::core::Session;
pub use issues::NewIssue;
pub use members::MemberScope;
pub use projects::{ProjectCreation, StepOutcome};
pub use sharing::ProjectGroupSharing;

#[cfg(test)]
pub(crate) use self::core::testing;
