//! Work item store
//!
//! Allocates sequential `WI-NNN` identifiers, loads and saves the
//! hybrid work item documents, and lists what exists. The filename is
//! the identity key; every mutation is a full load-modify-save round
//! trip that leaves the body untouched.

use crate::error::{AgentError, AgentResult};
use crate::layout::AgentLayout;
use crate::types::{WorkItem, WorkItemDocument};
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

static WORK_ITEM_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WI-(\d{3,})\.md$").unwrap());

/// Format a numeric identifier as `WI-NNN`, zero-padded to 3 digits
pub fn format_id(number: u64) -> String {
    format!("WI-{number:03}")
}

/// Store for work item documents under `.agent/workitems/`
pub struct WorkItemStore<'a> {
    layout: &'a AgentLayout,
}

impl<'a> WorkItemStore<'a> {
    pub fn new(layout: &'a AgentLayout) -> Self {
        Self { layout }
    }

    /// Allocate the next sequential identifier.
    ///
    /// Scans existing filenames matching the work item pattern, takes
    /// the maximum numeric suffix (wider-than-three-digit suffixes are
    /// accepted and compared numerically), and returns max+1.
    pub fn next_id(&self) -> AgentResult<String> {
        let mut max = 0u64;
        for entry in std::fs::read_dir(self.layout.workitems_dir())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(caps) = WORK_ITEM_FILE_PATTERN.captures(&name) {
                if let Ok(number) = caps[1].parse::<u64>() {
                    max = max.max(number);
                }
            }
        }
        Ok(format_id(max + 1))
    }

    /// Existing work item IDs in lexicographic order.
    ///
    /// Zero-padded fixed-width IDs make this equal to numeric order up
    /// to WI-999; beyond that the padding widens and lexicographic
    /// order diverges from numeric.
    pub fn list(&self) -> AgentResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(self.layout.workitems_dir())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if WORK_ITEM_FILE_PATTERN.is_match(&name) {
                ids.push(name.trim_end_matches(".md").to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Load a work item document by ID
    pub fn load(&self, id: &str) -> AgentResult<WorkItemDocument> {
        let path = self.layout.work_item_file(id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AgentError::work_item_not_found(id))
            }
            Err(e) => return Err(e.into()),
        };
        WorkItemDocument::parse(&raw).map_err(|e| AgentError::parse(&path, e.to_string()))
    }

    /// Write a work item document back to disk
    pub fn save(&self, doc: &WorkItemDocument) -> AgentResult<()> {
        let raw = doc.render().map_err(std::io::Error::other)?;
        std::fs::write(self.layout.work_item_file(&doc.meta.id), raw)?;
        tracing::debug!(id = %doc.meta.id, "saved work item");
        Ok(())
    }

    /// Update the status field, preserving everything else
    pub fn set_status(&self, id: &str, status: &str) -> AgentResult<()> {
        let mut doc = self.load(id)?;
        doc.meta.status = status.to_string();
        self.save(&doc)
    }
}

/// Construct a fresh work item with creation defaults
pub fn new_work_item(id: &str, title: &str, intents: Vec<String>) -> WorkItemDocument {
    let intent = if intents.is_empty() {
        vec!["general".to_string()]
    } else {
        intents
    };
    WorkItemDocument {
        meta: WorkItem {
            id: id.to_string(),
            title: title.to_string(),
            intent,
            status: "active".to_string(),
            created_at: Utc::now(),
            evidence: Vec::new(),
            last_summary: String::new(),
            acceptance_criteria: Vec::new(),
            branch_suggestion: String::new(),
        },
        body: String::new(),
    }
}
