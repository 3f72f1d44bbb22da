//! Persisted entity types
//!
//! Three kinds of records live under `.agent/`: slow-changing project
//! context, fast-changing session state, and per-task work items with a
//! free-text body. Optional fields are omitted from the serialized form
//! when empty rather than written as null/empty markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Project identity block inside [`Context`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectIdentity {
    /// Project name; reflects user intent, not template provenance
    pub name: String,
    /// Human summary of the project
    pub summary: String,
    /// Name of the template that supplied this context
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,
}

/// Architecture descriptor for the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Architecture {
    pub style: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// Slow-changing project context shared across work items.
///
/// Standards categories are keyed by a `BTreeMap` so display iteration
/// is lexicographic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub project: ProjectIdentity,
    pub architecture: Architecture,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub standards: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quality_gates: Vec<String>,
}

/// Lightweight operational health carried in [`State`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSnapshot {
    /// Never persisted as the empty string; blank normalizes to "unknown"
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// Fast-changing session state; exactly one record per project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    /// ID of the active work item, or empty when none is active
    pub active_work_item: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch_suggestion: String,
    pub health: HealthSnapshot,
}

impl State {
    /// Starter state written at bootstrap
    pub fn starter() -> Self {
        let mut state = Self::default();
        state.health.status = "unknown".to_string();
        state
    }

    /// Enforce the health-status invariant; applied at load and save
    pub fn normalize(&mut self) {
        if self.health.status.trim().is_empty() {
            self.health.status = "unknown".to_string();
        }
    }
}

/// Work item metadata; stored as front matter ahead of the free-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Identifier (`WI-NNN`), immutable after creation; keys the filename
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intent: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Evidence file paths, relative to the `.agent/` directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch_suggestion: String,
}

/// A work item plus its user-authored body, always serialized together
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemDocument {
    pub meta: WorkItem,
    /// Free-form narrative; preserved verbatim across metadata rewrites
    pub body: String,
}

/// Controls how much context a prompt render expands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptProfile {
    pub description: String,
    pub include_architecture: bool,
    pub include_standards: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// Named prompt profiles persisted in prompt_profiles.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptProfileSet {
    pub profiles: BTreeMap<String, PromptProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_normalize_blank_status() {
        let mut state = State::default();
        state.normalize();
        assert_eq!(state.health.status, "unknown");

        let mut state = State::default();
        state.health.status = "   ".to_string();
        state.health.issues = vec!["flaky CI".to_string()];
        state.normalize();
        assert_eq!(state.health.status, "unknown");
    }

    #[test]
    fn test_state_normalize_keeps_existing_status() {
        let mut state = State::starter();
        state.health.status = "degraded".to_string();
        state.normalize();
        assert_eq!(state.health.status, "degraded");
    }

    #[test]
    fn test_context_yaml_omits_empty_collections() {
        let mut ctx = Context::default();
        ctx.project.name = "demo".to_string();
        ctx.project.summary = "A demo.".to_string();
        ctx.architecture.style = "layered".to_string();

        let yaml = serde_yaml::to_string(&ctx).unwrap();
        assert!(!yaml.contains("standards"));
        assert!(!yaml.contains("constraints"));
        assert!(!yaml.contains("quality_gates"));
        assert!(!yaml.contains("template"));
        assert!(!yaml.contains("notes"));
    }

    #[test]
    fn test_context_standards_iterate_sorted() {
        let mut ctx = Context::default();
        ctx.standards
            .insert("process".to_string(), vec!["rule".to_string()]);
        ctx.standards
            .insert("backend".to_string(), vec!["rule".to_string()]);
        ctx.standards
            .insert("frontend".to_string(), vec!["rule".to_string()]);

        let keys: Vec<&String> = ctx.standards.keys().collect();
        assert_eq!(keys, ["backend", "frontend", "process"]);
    }

    #[test]
    fn test_state_round_trip() {
        let mut state = State::starter();
        state.active_work_item = "WI-002".to_string();
        state.branch_suggestion = "wi-002-fix-timeout".to_string();

        let yaml = serde_yaml::to_string(&state).unwrap();
        let restored: State = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, state);
    }
}
