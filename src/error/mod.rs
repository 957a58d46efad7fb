//! Error types for Nexus.

use thiserror::Error;

/// Primary error type for all Nexus operations.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid trigger pattern for skill '{skill_id}': {source}")]
    Pattern {
        skill_id: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("Unknown skill: {0}")]
    SkillNotFound(String),

    #[error("Duplicate skill id: {0}")]
    DuplicateSkill(String),

    #[error("Session '{0}' is no longer running")]
    SessionClosed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl NexusError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a pattern error for a skill.
    pub fn pattern(skill_id: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            skill_id: skill_id.into(),
            source: Box::new(source),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NexusError>;
