//! Error types for agent workspace operations
//!
//! One error enum for the whole library; `main` maps it to a non-zero
//! exit. Nothing is retried — this is an offline, single-shot tool.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agent workspace operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur while managing the `.agent/` workspace
#[derive(Error, Debug)]
pub enum AgentError {
    /// The `.agent/` layout has not been bootstrapped yet
    #[error(".agent not found at {path}; run `ctx init <template>` first")]
    ConfigurationMissing { path: PathBuf },

    /// Bootstrap guard: refusing to overwrite an existing layout
    #[error(".agent at {path} already initialized, refusing to overwrite")]
    AlreadyInitialized { path: PathBuf },

    /// The `.agent` path exists but is not a directory
    #[error("{path} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    /// Work item file absent from the workitems directory
    #[error("work item {id} not found")]
    WorkItemNotFound { id: String },

    /// Named prompt profile absent from prompt_profiles.yaml
    #[error("prompt profile \"{name}\" not found")]
    ProfileNotFound { name: String },

    /// Named built-in template absent from the registry
    #[error("built-in template \"{name}\" not found")]
    TemplateNotFound { name: String },

    /// Template install target already present
    #[error("template \"{name}\" already exists at {path} (use --force to overwrite)")]
    TemplateExists { name: String, path: PathBuf },

    /// The built-in registry is missing its `default` entry
    #[error("default template not available")]
    DefaultTemplateMissing,

    /// Source file passed to `evidence add` does not exist
    #[error("source evidence {path} not found")]
    EvidenceSourceMissing { path: PathBuf },

    /// Operation requires an active work item in state.yaml
    #[error("no active work item; start one with `ctx work start <WI-XXX>`")]
    NoActiveWorkItem,

    /// A persisted document failed to parse
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Create a configuration missing error
    pub fn configuration_missing(path: impl Into<PathBuf>) -> Self {
        Self::ConfigurationMissing { path: path.into() }
    }

    /// Create an already initialized error
    pub fn already_initialized(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyInitialized { path: path.into() }
    }

    /// Create a work item not found error
    pub fn work_item_not_found(id: impl Into<String>) -> Self {
        Self::WorkItemNotFound { id: id.into() }
    }

    /// Create a profile not found error
    pub fn profile_not_found(name: impl Into<String>) -> Self {
        Self::ProfileNotFound { name: name.into() }
    }

    /// Create a template not found error
    pub fn template_not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    /// Create a parse error with path context
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
