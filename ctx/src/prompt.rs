//! Prompt assembly pipeline
//!
//! Merges the persisted context, state, and active work item under a
//! named profile into one rendered document, then writes it to the
//! single-slot export path. Everything is re-read from disk at call
//! time; no entity is cached between invocations.

use crate::codec;
use crate::error::{AgentError, AgentResult};
use crate::layout::AgentLayout;
use crate::types::{Architecture, Context, PromptProfile, PromptProfileSet, State, WorkItem};
use crate::workitems::WorkItemStore;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Baseline constraints appended to whatever the context declares
const BASELINE_CONSTRAINTS: &[&str] = &[
    "No network access; offline-only CLI.",
    "Do not embed logs; reference evidence paths.",
    "Keep prompts token-cheap; expand only by profile.",
];

const DEFAULT_TASK_ACCEPTANCE: &str = "Work item completes without expanding scope.";

const DEFAULT_QUALITY_GATES: &[&str] = &["All tests pass.", "No breaking API changes."];

const MISSING_SUMMARY: &str = "Not provided.";

/// Keyword sets and the path prefixes each contributes to Likely Files
const UI_KEYWORDS: &[&str] = &["ui", "react", "component", "css", "html", "frontend"];
const UI_PATHS: &[&str] = &["src/ui/", "web/", "frontend/", "components/"];
const BACKEND_KEYWORDS: &[&str] = &["api", "server", "backend", "service", "timeout", "latency"];
const BACKEND_PATHS: &[&str] = &["cmd/", "internal/", "api/", "server/"];
const TEST_KEYWORDS: &[&str] = &["test", "bug", "fix", "regression"];
const TEST_PATHS: &[&str] = &["tests/", "internal/", "cmd/"];
const FALLBACK_PATHS: &[&str] = &["cmd/", "internal/", "pkg/"];

/// The three profiles guaranteed to exist after bootstrap
pub fn default_profiles() -> PromptProfileSet {
    PromptProfileSet {
        profiles: BTreeMap::from([
            (
                "cheap".to_string(),
                PromptProfile {
                    description: "Summaries only; minimal context and references.".to_string(),
                    include_architecture: false,
                    include_standards: false,
                    detail: "summary".to_string(),
                },
            ),
            (
                "standard".to_string(),
                PromptProfile {
                    description: "Include architecture and standards for balanced prompts."
                        .to_string(),
                    include_architecture: true,
                    include_standards: true,
                    detail: "balanced".to_string(),
                },
            ),
            (
                "deep".to_string(),
                PromptProfile {
                    description:
                        "Full context disclosure; include architecture, standards, and constraints."
                            .to_string(),
                    include_architecture: true,
                    include_standards: true,
                    detail: "full".to_string(),
                },
            ),
        ]),
    }
}

/// Assemble and write the prompt, returning the export path
pub fn build_prompt(layout: &AgentLayout, profile_name: &str) -> AgentResult<PathBuf> {
    let rendered = assemble(layout, profile_name)?;

    std::fs::create_dir_all(layout.exports_dir())?;
    let dest = layout.prompt_file();
    std::fs::write(&dest, rendered)?;
    tracing::info!(path = %dest.display(), "prompt written");
    Ok(dest)
}

/// Assemble the prompt document for the active work item.
///
/// Preconditions, checked in order: the profile must exist, and state
/// must name an active work item. A failed precondition writes nothing.
pub fn assemble(layout: &AgentLayout, profile_name: &str) -> AgentResult<String> {
    let profile_name = if profile_name.is_empty() {
        "cheap"
    } else {
        profile_name
    };

    let profiles = codec::load_profiles(layout)?;
    let profile = profiles
        .profiles
        .get(profile_name)
        .ok_or_else(|| AgentError::profile_not_found(profile_name))?;

    let state = codec::load_state(layout)?;
    if state.active_work_item.is_empty() {
        return Err(AgentError::NoActiveWorkItem);
    }

    let doc = WorkItemStore::new(layout).load(&state.active_work_item)?;
    let context = codec::load_context(layout)?;

    Ok(render(profile, &context, &state, &doc.meta))
}

fn render(profile: &PromptProfile, context: &Context, state: &State, item: &WorkItem) -> String {
    let constraints = merge_unique(&context.constraints, BASELINE_CONSTRAINTS);
    let acceptance = if item.acceptance_criteria.is_empty() {
        vec![DEFAULT_TASK_ACCEPTANCE.to_string()]
    } else {
        item.acceptance_criteria.clone()
    };
    let gates = if context.quality_gates.is_empty() {
        DEFAULT_QUALITY_GATES.iter().map(|g| g.to_string()).collect()
    } else {
        context.quality_gates.clone()
    };

    let mut out = String::new();
    out.push_str(&format!("Task: {} ({})\n", item.title, item.id));
    out.push_str(&format!("Intent: {}\n", item.intent.join(", ")));
    out.push_str(&format!("Status: {}\n", item.status));
    out.push_str(&format!("Health: {}\n", health_line(&state.health.status)));
    out.push_str(&format!(
        "Last Summary: {}\n",
        summary_line(&[&state.last_summary, &item.last_summary])
    ));

    push_section(&mut out, "Constraints:", &bullet_list(&constraints));
    push_section(&mut out, "Quality Gates:", &bullet_list(&gates));
    push_section(
        &mut out,
        "Evidence (paths only):",
        &bullet_list(&evidence_paths(item)),
    );
    push_section(&mut out, "Likely Files:", &bullet_list(&likely_files(item)));
    push_section(&mut out, "Task Acceptance:", &bullet_list(&acceptance));

    if !context.project.summary.trim().is_empty() {
        push_section(
            &mut out,
            "Project Context:",
            &format!("- {}", context.project.summary),
        );
    }
    if profile.include_architecture {
        push_section(
            &mut out,
            "Architecture:",
            &format!("- {}", architecture_summary(&context.architecture)),
        );
    }
    if profile.include_standards {
        push_section(&mut out, "Standards:", &standards_list(&context.standards));
    }
    if !state.health.issues.is_empty() {
        push_section(&mut out, "Health Issues:", &bullet_list(&state.health.issues));
    }

    out
}

/// Append a section separated from the previous one by one blank line
fn push_section(out: &mut String, header: &str, body: &str) {
    out.push('\n');
    out.push_str(header);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
}

/// Render a bullet list: one `- item` line per non-blank entry in
/// source order, or exactly `- None` when nothing survives.
fn bullet_list(items: &[String]) -> String {
    let lines: Vec<String> = items
        .iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| format!("- {item}"))
        .collect();
    if lines.is_empty() {
        "- None".to_string()
    } else {
        lines.join("\n")
    }
}

/// First-occurrence-ordered union of trimmed, non-blank entries
fn merge_unique(primary: &[String], extras: &[&str]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for item in primary.iter().map(|s| s.as_str()).chain(extras.iter().copied()) {
        let item = item.trim();
        if item.is_empty() || !seen.insert(item.to_string()) {
            continue;
        }
        merged.push(item.to_string());
    }
    merged
}

fn summary_line<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|c| !c.trim().is_empty())
        .unwrap_or(MISSING_SUMMARY)
}

fn health_line(status: &str) -> &str {
    if status.trim().is_empty() {
        "unknown"
    } else {
        status
    }
}

/// Evidence paths with separators normalized and blanks dropped
fn evidence_paths(item: &WorkItem) -> Vec<String> {
    item.evidence
        .iter()
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.replace('\\', "/"))
        .collect()
}

/// Static heuristic mapping work item text onto likely path prefixes
fn likely_files(item: &WorkItem) -> Vec<String> {
    let text = format!("{} {}", item.title, item.intent.join(" ")).to_lowercase();

    let mut paths = Vec::new();
    if contains_any(&text, UI_KEYWORDS) {
        paths.extend_from_slice(UI_PATHS);
    }
    if contains_any(&text, BACKEND_KEYWORDS) {
        paths.extend_from_slice(BACKEND_PATHS);
    }
    if contains_any(&text, TEST_KEYWORDS) {
        paths.extend_from_slice(TEST_PATHS);
    }
    if paths.is_empty() {
        paths.extend_from_slice(FALLBACK_PATHS);
    }

    let mut seen = std::collections::HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(*p))
        .map(|p| p.to_string())
        .collect()
}

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// "style version — notes", with missing parts omitted
fn architecture_summary(arch: &Architecture) -> String {
    let mut parts = Vec::new();
    if !arch.style.trim().is_empty() {
        parts.push(arch.style.as_str());
    }
    if !arch.version.trim().is_empty() {
        parts.push(arch.version.as_str());
    }
    let mut summary = parts.join(" ");

    if !arch.notes.trim().is_empty() {
        if summary.is_empty() {
            summary = arch.notes.clone();
        } else {
            summary = format!("{summary} — {}", arch.notes);
        }
    }

    if summary.trim().is_empty() {
        "Not documented.".to_string()
    } else {
        summary
    }
}

/// One bullet per standards category, lexicographic, rules joined by "; "
fn standards_list(standards: &BTreeMap<String, Vec<String>>) -> String {
    if standards.is_empty() {
        return "- None".to_string();
    }
    standards
        .iter()
        .map(|(scope, rules)| {
            if rules.is_empty() {
                format!("- {scope}: None")
            } else {
                format!("- {scope}: {}", rules.join("; "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workitems::new_work_item;
    use tempfile::tempdir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bullet_list_empty_is_none() {
        assert_eq!(bullet_list(&[]), "- None");
        assert_eq!(bullet_list(&strings(&["", "  "])), "- None");
    }

    #[test]
    fn test_bullet_list_skips_blanks() {
        assert_eq!(bullet_list(&strings(&["a", "", "b"])), "- a\n- b");
    }

    #[test]
    fn test_merge_unique_order_and_dedup() {
        let primary = strings(&["keep order", "No network access; offline-only CLI.", " "]);
        let merged = merge_unique(&primary, BASELINE_CONSTRAINTS);
        assert_eq!(
            merged,
            strings(&[
                "keep order",
                "No network access; offline-only CLI.",
                "Do not embed logs; reference evidence paths.",
                "Keep prompts token-cheap; expand only by profile.",
            ])
        );
    }

    #[test]
    fn test_likely_files_by_keyword_set() {
        let item = new_work_item("WI-001", "Polish the UI component", vec![]).meta;
        assert_eq!(
            likely_files(&item),
            strings(&["src/ui/", "web/", "frontend/", "components/"])
        );

        let item = new_work_item("WI-001", "API latency spike", vec![]).meta;
        assert_eq!(
            likely_files(&item),
            strings(&["cmd/", "internal/", "api/", "server/"])
        );
    }

    #[test]
    fn test_likely_files_merges_and_dedups() {
        // "test" hits the backend set and the test set; overlapping
        // prefixes appear once, first-seen order preserved.
        let item = new_work_item("WI-001", "test server regression", vec![]).meta;
        assert_eq!(
            likely_files(&item),
            strings(&["cmd/", "internal/", "api/", "server/", "tests/"])
        );
    }

    #[test]
    fn test_likely_files_fallback() {
        let item = new_work_item("WI-001", "Write onboarding docs", vec![]).meta;
        assert_eq!(likely_files(&item), strings(&["cmd/", "internal/", "pkg/"]));
    }

    #[test]
    fn test_likely_files_scans_intent_tags_too() {
        let item = new_work_item("WI-001", "Mysterious slowness", strings(&["backend"])).meta;
        assert_eq!(
            likely_files(&item),
            strings(&["cmd/", "internal/", "api/", "server/"])
        );
    }

    #[test]
    fn test_architecture_summary_variants() {
        let full = Architecture {
            style: "layered".to_string(),
            version: "v2".to_string(),
            notes: "REST backend.".to_string(),
        };
        assert_eq!(architecture_summary(&full), "layered v2 — REST backend.");

        let style_only = Architecture {
            style: "hexagonal".to_string(),
            ..Default::default()
        };
        assert_eq!(architecture_summary(&style_only), "hexagonal");

        let notes_only = Architecture {
            notes: "Monolith.".to_string(),
            ..Default::default()
        };
        assert_eq!(architecture_summary(&notes_only), "Monolith.");

        assert_eq!(
            architecture_summary(&Architecture::default()),
            "Not documented."
        );
    }

    #[test]
    fn test_standards_list() {
        assert_eq!(standards_list(&BTreeMap::new()), "- None");

        let standards = BTreeMap::from([
            ("process".to_string(), strings(&["a", "b"])),
            ("code".to_string(), vec![]),
        ]);
        assert_eq!(standards_list(&standards), "- code: None\n- process: a; b");
    }

    #[test]
    fn test_summary_line_first_non_blank() {
        assert_eq!(summary_line(&["", "from item"]), "from item");
        assert_eq!(summary_line(&["from state", "from item"]), "from state");
        assert_eq!(summary_line(&["", "  "]), MISSING_SUMMARY);
    }

    // Pipeline tests over a bootstrapped layout.

    fn assembled_fixture() -> (tempfile::TempDir, AgentLayout) {
        let dir = tempdir().unwrap();
        let layout = AgentLayout::new(dir.path());
        layout.bootstrap("default").unwrap();

        let store = WorkItemStore::new(&layout);
        let doc = new_work_item("WI-001", "Fix API timeout", strings(&["bugfix", "backend"]));
        store.save(&doc).unwrap();

        let mut state = codec::load_state(&layout).unwrap();
        state.active_work_item = "WI-001".to_string();
        codec::save_state(&layout, state).unwrap();

        (dir, layout)
    }

    #[test]
    fn test_assemble_cheap_omits_gated_sections() {
        let (_dir, layout) = assembled_fixture();

        // The default template has non-blank architecture and standards.
        let rendered = assemble(&layout, "cheap").unwrap();
        assert!(!rendered.contains("Architecture:"));
        assert!(!rendered.contains("Standards:"));
        assert!(rendered.contains("Project Context:"));
    }

    #[test]
    fn test_assemble_deep_includes_gated_sections() {
        let (_dir, layout) = assembled_fixture();

        let rendered = assemble(&layout, "deep").unwrap();
        assert!(rendered.contains("Architecture:\n- general v1 — Update this section"));
        assert!(rendered.contains("Standards:\n- code: "));
    }

    #[test]
    fn test_assemble_empty_profile_defaults_to_cheap() {
        let (_dir, layout) = assembled_fixture();
        assert_eq!(assemble(&layout, "").unwrap(), assemble(&layout, "cheap").unwrap());
    }

    #[test]
    fn test_assemble_unknown_profile() {
        let (_dir, layout) = assembled_fixture();
        let result = assemble(&layout, "verbose");
        assert!(matches!(result, Err(AgentError::ProfileNotFound { .. })));
    }

    #[test]
    fn test_assemble_section_order() {
        let (_dir, layout) = assembled_fixture();
        let rendered = assemble(&layout, "deep").unwrap();

        let sections = [
            "Task: Fix API timeout (WI-001)",
            "Intent: bugfix, backend",
            "Status: active",
            "Health: unknown",
            "Last Summary: Not provided.",
            "Constraints:",
            "Quality Gates:",
            "Evidence (paths only):",
            "Likely Files:",
            "Task Acceptance:",
            "Project Context:",
            "Architecture:",
            "Standards:",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = rendered[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing or out of order: {section}"));
            cursor += found + section.len();
        }
    }

    #[test]
    fn test_assemble_baseline_constraints_merged() {
        let (_dir, layout) = assembled_fixture();
        let rendered = assemble(&layout, "cheap").unwrap();

        // Template constraints come first, then the non-duplicate baselines.
        assert!(rendered.contains("- Keep prompts token-cheap; expand context only when profile requests."));
        assert!(rendered.contains("- No network access; offline-only CLI."));
    }

    #[test]
    fn test_build_prompt_without_active_item_writes_nothing() {
        let (_dir, layout) = assembled_fixture();

        let mut state = codec::load_state(&layout).unwrap();
        state.active_work_item.clear();
        codec::save_state(&layout, state).unwrap();

        let result = build_prompt(&layout, "cheap");
        assert!(matches!(result, Err(AgentError::NoActiveWorkItem)));
        assert!(!layout.prompt_file().exists());
    }

    #[test]
    fn test_build_prompt_overwrites_single_slot() {
        let (_dir, layout) = assembled_fixture();

        let dest = build_prompt(&layout, "cheap").unwrap();
        let first = std::fs::read_to_string(&dest).unwrap();

        let dest = build_prompt(&layout, "deep").unwrap();
        let second = std::fs::read_to_string(&dest).unwrap();

        assert_ne!(first, second);
        assert!(second.contains("Architecture:"));
    }

    #[test]
    fn test_assemble_health_issues_section() {
        let (_dir, layout) = assembled_fixture();

        let mut state = codec::load_state(&layout).unwrap();
        state.health.status = "degraded".to_string();
        state.health.issues = strings(&["flaky integration suite"]);
        codec::save_state(&layout, state).unwrap();

        let rendered = assemble(&layout, "cheap").unwrap();
        assert!(rendered.contains("Health: degraded"));
        assert!(rendered.contains("Health Issues:\n- flaky integration suite"));
    }

    #[test]
    fn test_default_profiles_complete() {
        let profiles = default_profiles().profiles;
        assert_eq!(profiles.len(), 3);
        assert!(!profiles["cheap"].include_architecture);
        assert!(!profiles["cheap"].include_standards);
        assert!(profiles["standard"].include_architecture);
        assert!(profiles["deep"].include_standards);
        assert_eq!(profiles["deep"].detail, "full");
    }
}
