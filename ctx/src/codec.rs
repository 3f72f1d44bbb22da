//! Serialization of persisted entities
//!
//! Context, State, and the prompt profile set are plain YAML mappings.
//! Work items use a hybrid document: a YAML front matter block between
//! `---` delimiters, then free-form body text. Only the first two
//! delimiter occurrences are structural; a body may itself contain the
//! delimiter sequence and round-trips verbatim.

use crate::error::{AgentError, AgentResult};
use crate::layout::AgentLayout;
use crate::types::{Context, PromptProfileSet, State, WorkItem, WorkItemDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Delimiter framing the work item metadata block
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Work item document parse failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("work item missing front matter")]
    MissingFrontMatter,
    #[error("invalid work item format")]
    InvalidFormat,
    #[error("invalid work item metadata: {0}")]
    Metadata(String),
}

impl WorkItemDocument {
    /// Parse a hybrid front-matter/body document.
    ///
    /// The document must begin with the delimiter and split into at
    /// least three segments: the (discarded) prefix, the metadata
    /// block, and the body. Leading newlines are stripped from the
    /// body; no other body normalization occurs.
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        if !raw.starts_with(FRONT_MATTER_DELIMITER) {
            return Err(DocumentError::MissingFrontMatter);
        }

        let mut segments = raw.splitn(3, FRONT_MATTER_DELIMITER);
        segments.next(); // empty prefix before the leading delimiter
        let front = segments.next().ok_or(DocumentError::InvalidFormat)?;
        let rest = segments.next().ok_or(DocumentError::InvalidFormat)?;

        let meta: WorkItem = serde_yaml::from_str(front.trim())
            .map_err(|e| DocumentError::Metadata(e.to_string()))?;

        Ok(Self {
            meta,
            body: rest.trim_start_matches('\n').to_string(),
        })
    }

    /// Serialize metadata and body back into one document.
    ///
    /// Metadata is always re-serialized fresh, so fields unknown to the
    /// current schema drop on the next save. A blank body is replaced
    /// with a templated default; exactly one newline separates the
    /// closing delimiter from the body.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let meta = serde_yaml::to_string(&self.meta)?;
        let body = if self.body.trim().is_empty() {
            default_body(&self.meta)
        } else {
            self.body.clone()
        };

        let mut out = String::new();
        out.push_str(FRONT_MATTER_DELIMITER);
        out.push('\n');
        out.push_str(&meta);
        out.push_str(FRONT_MATTER_DELIMITER);
        out.push('\n');
        if !body.starts_with('\n') {
            out.push('\n');
        }
        out.push_str(&body);
        Ok(out)
    }
}

/// Starter body substituted when a work item is saved with a blank body
fn default_body(meta: &WorkItem) -> String {
    format!(
        "# Work Item {}\n\n\
         ## Summary\n{}\n\n\
         ## Acceptance Criteria\n- Add criteria as you work.\n\n\
         ## Notes\n- Capture decisions, scope, and dependencies here.\n",
        meta.id, meta.title
    )
}

/// Read a YAML mapping into a typed record
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> AgentResult<T> {
    let raw = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&raw).map_err(|e| AgentError::parse(path, e.to_string()))
}

/// Write a typed record as a YAML mapping
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> AgentResult<()> {
    let raw = serde_yaml::to_string(value).map_err(std::io::Error::other)?;
    std::fs::write(path, raw)?;
    Ok(())
}

pub fn load_context(layout: &AgentLayout) -> AgentResult<Context> {
    read_yaml(&layout.context_file())
}

pub fn save_context(layout: &AgentLayout, context: &Context) -> AgentResult<()> {
    write_yaml(&layout.context_file(), context)
}

pub fn load_state(layout: &AgentLayout) -> AgentResult<State> {
    let mut state: State = read_yaml(&layout.state_file())?;
    state.normalize();
    Ok(state)
}

pub fn save_state(layout: &AgentLayout, mut state: State) -> AgentResult<()> {
    state.normalize();
    write_yaml(&layout.state_file(), &state)
}

pub fn load_profiles(layout: &AgentLayout) -> AgentResult<PromptProfileSet> {
    read_yaml(&layout.profiles_file())
}

pub fn save_profiles(layout: &AgentLayout, profiles: &PromptProfileSet) -> AgentResult<()> {
    write_yaml(&layout.profiles_file(), profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_item() -> WorkItem {
        WorkItem {
            id: "WI-003".to_string(),
            title: "Fix login timeout".to_string(),
            intent: vec!["bugfix".to_string(), "backend".to_string()],
            status: "active".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            evidence: vec!["evidence/trace.log".to_string()],
            last_summary: String::new(),
            acceptance_criteria: vec!["Login succeeds within 2s.".to_string()],
            branch_suggestion: String::new(),
        }
    }

    #[test]
    fn test_round_trip_preserves_body() {
        let doc = WorkItemDocument {
            meta: sample_item(),
            body: "# Notes\n\nTimeout reproduces under load.\n".to_string(),
        };

        let raw = doc.render().unwrap();
        let restored = WorkItemDocument::parse(&raw).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_body_containing_delimiter_round_trips() {
        let doc = WorkItemDocument {
            meta: sample_item(),
            body: "Before\n---\nAfter the horizontal rule\n---\n".to_string(),
        };

        let raw = doc.render().unwrap();
        let restored = WorkItemDocument::parse(&raw).unwrap();
        assert_eq!(restored.body, doc.body);
    }

    #[test]
    fn test_blank_body_gets_default() {
        let doc = WorkItemDocument {
            meta: sample_item(),
            body: "   \n".to_string(),
        };

        let raw = doc.render().unwrap();
        let restored = WorkItemDocument::parse(&raw).unwrap();
        assert!(restored.body.contains("# Work Item WI-003"));
        assert!(restored.body.contains("Fix login timeout"));
        assert!(restored.body.contains("## Acceptance Criteria"));
    }

    #[test]
    fn test_missing_front_matter() {
        let err = WorkItemDocument::parse("# Just a heading\n").unwrap_err();
        assert_eq!(err, DocumentError::MissingFrontMatter);
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = WorkItemDocument::parse("---\nid: WI-001\n").unwrap_err();
        assert_eq!(err, DocumentError::InvalidFormat);
    }

    #[test]
    fn test_leading_newlines_stripped_from_body() {
        let doc = WorkItemDocument {
            meta: sample_item(),
            body: "Narrative.".to_string(),
        };

        let raw = doc.render().unwrap();
        // One blank line sits between the closing delimiter and the body.
        assert!(raw.contains("---\n\nNarrative."));

        let restored = WorkItemDocument::parse(&raw).unwrap();
        assert_eq!(restored.body, "Narrative.");
    }

    #[test]
    fn test_metadata_reserialized_fresh() {
        // A field no longer in the schema disappears on the next render.
        let raw = "---\nid: WI-009\ntitle: Legacy\nstatus: paused\n\
                   created_at: 2025-06-01T12:00:00Z\nobsolete_field: junk\n---\n\nBody.\n";
        let doc = WorkItemDocument::parse(raw).unwrap();
        let rendered = doc.render().unwrap();
        assert!(!rendered.contains("obsolete_field"));
        assert_eq!(doc.body, "Body.\n");
    }
}
