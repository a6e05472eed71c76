use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {resource} ({message})")]
    NotFound { resource: String, message: String },

    #[error("Failed to create {resource}: {message}")]
    Create { resource: String, message: String },

    #[error("Failed to update {resource}: {message}")]
    Update { resource: String, message: String },

    #[error("Failed to delete {resource}: {message}")]
    Delete { resource: String, message: String },

    #[error("Incomplete data: {0}")]
    PartialFailure(String),

    #[error("Template file not found: {}", path.display())]
    MissingTemplate { path: PathBuf },

    #[error("Invalid access level '{0}' (expected GUEST, REPORTER, DEVELOPER or MAINTAINER)")]
    InvalidAccessLevel(String),

    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kind of remote mutation a rejected request belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

impl LabError {
    /// Re-labels a remote rejection as a failed mutation of `resource`.
    ///
    /// Only HTTP-level rejections are converted; transport and decoding
    /// errors pass through untouched.
    pub fn rejected(self, mutation: Mutation, resource: impl Into<String>) -> Self {
        let message = match self {
            Self::Api { status, message } => format!("{message} (status {status})"),
            Self::NotFound { message, .. } => format!("{message} (status 404)"),
            other => return other,
        };
        let resource = resource.into();

        match mutation {
            Mutation::Create => Self::Create { resource, message },
            Mutation::Update => Self::Update { resource, message },
            Mutation::Delete => Self::Delete { resource, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
