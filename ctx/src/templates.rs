//! Template registry and resolution
//!
//! A template is a named starter [`Context`]. Resolution walks a fixed
//! precedence chain: repo-local file under `.agent/templates/`, then the
//! built-in registry, then the built-in `default`. The registry is
//! immutable constant data; every read hands out an independent clone so
//! repeated resolutions are isolated from caller mutation.

use crate::codec;
use crate::error::{AgentError, AgentResult};
use crate::layout::AgentLayout;
use crate::types::{Architecture, Context, ProjectIdentity};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static BUILTIN_TEMPLATES: LazyLock<BTreeMap<&'static str, Context>> = LazyLock::new(|| {
    let mut registry = BTreeMap::new();
    registry.insert("default", default_template());
    registry.insert("react-spring", react_spring_template());
    registry
});

fn default_template() -> Context {
    Context {
        project: ProjectIdentity {
            name: "default".to_string(),
            summary: "Project context placeholder. Capture architecture, standards, and risks here."
                .to_string(),
            template: "default".to_string(),
        },
        architecture: Architecture {
            style: "general".to_string(),
            version: "v1".to_string(),
            notes: "Update this section with your system's architecture overview.".to_string(),
        },
        standards: BTreeMap::from([
            (
                "process".to_string(),
                vec![
                    "Keep prompts token-cheap; prefer summaries over full dumps.".to_string(),
                    "Reference evidence paths; do not inline logs.".to_string(),
                ],
            ),
            (
                "code".to_string(),
                vec!["Maintain compatibility across supported platforms.".to_string()],
            ),
        ]),
        constraints: baseline_constraints(),
        quality_gates: baseline_quality_gates(),
    }
}

fn react_spring_template() -> Context {
    Context {
        project: ProjectIdentity {
            name: "react-spring".to_string(),
            summary: "Full-stack React + Spring Boot application.".to_string(),
            template: "react-spring".to_string(),
        },
        architecture: Architecture {
            style: "layered".to_string(),
            version: "v1".to_string(),
            notes: "React + TypeScript frontend talking to Spring Boot REST APIs; separate \
                    client/server modules with shared contracts."
                .to_string(),
        },
        standards: BTreeMap::from([
            (
                "frontend".to_string(),
                vec![
                    "React + TypeScript with functional components and hooks.".to_string(),
                    "Feature-oriented folder structure with co-located tests and styles."
                        .to_string(),
                    "Use lint/format defaults; keep API clients typed and surface errors to users."
                        .to_string(),
                ],
            ),
            (
                "backend".to_string(),
                vec![
                    "Spring Boot REST controllers -> services -> repositories with constructor \
                     injection."
                        .to_string(),
                    "DTOs decoupled from persistence models; validate inputs at boundaries."
                        .to_string(),
                    "JUnit/Mockito tests for services/controllers; consistent API error responses."
                        .to_string(),
                ],
            ),
            (
                "shared".to_string(),
                vec!["Document API contracts and align client/server versions.".to_string()],
            ),
        ]),
        constraints: baseline_constraints(),
        quality_gates: baseline_quality_gates(),
    }
}

fn baseline_constraints() -> Vec<String> {
    vec![
        "Keep prompts token-cheap; expand context only when profile requests.".to_string(),
        "Maintain portable state inside the repo for agent switching and parallel work."
            .to_string(),
    ]
}

fn baseline_quality_gates() -> Vec<String> {
    vec![
        "All tests pass and lint is clean.".to_string(),
        "No breaking API changes.".to_string(),
        "Prompt written to .agent/exports/current.prompt.md.".to_string(),
    ]
}

/// Names of the registered built-in templates, sorted
pub fn builtin_template_names() -> Vec<String> {
    BUILTIN_TEMPLATES.keys().map(|n| n.to_string()).collect()
}

/// Independent clone of a built-in template
fn builtin_template(name: &str) -> Option<Context> {
    BUILTIN_TEMPLATES.get(name).cloned()
}

/// Resolve a template by name, returning the context and the name of
/// the source that actually supplied it.
///
/// Precedence: repo-local template file, built-in with the exact name,
/// then the built-in `default`. A missing requested name falls through
/// silently; only an unreadable or unparsable repo template is an
/// error. The registry lacking `default` is a fatal configuration
/// error.
pub fn resolve_template(layout: &AgentLayout, name: &str) -> AgentResult<(Context, String)> {
    let requested = if name.is_empty() { "default" } else { name };

    if let Some(context) = load_repo_template(layout, requested)? {
        return Ok((
            finalize_metadata(context, requested, requested),
            requested.to_string(),
        ));
    }

    if let Some(context) = builtin_template(requested) {
        return Ok((
            finalize_metadata(context, requested, requested),
            requested.to_string(),
        ));
    }

    let fallback = builtin_template("default").ok_or(AgentError::DefaultTemplateMissing)?;
    Ok((
        finalize_metadata(fallback, "default", requested),
        "default".to_string(),
    ))
}

/// YAML template files under `.agent/templates`, sorted by name
pub fn list_repo_templates(layout: &AgentLayout) -> AgentResult<Vec<String>> {
    let entries = match std::fs::read_dir(layout.templates_dir()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_string_lossy().strip_suffix(".yaml") {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Write a built-in template into `.agent/templates/<name>.yaml`
pub fn install_template(layout: &AgentLayout, name: &str, force: bool) -> AgentResult<PathBuf> {
    let context = builtin_template(name).ok_or_else(|| AgentError::template_not_found(name))?;

    std::fs::create_dir_all(layout.templates_dir())?;
    let dest = layout.template_file(name);
    if !force && dest.exists() {
        return Err(AgentError::TemplateExists {
            name: name.to_string(),
            path: dest,
        });
    }

    let context = finalize_metadata(context, name, name);
    codec::write_yaml(&dest, &context)?;
    tracing::info!(template = name, path = %dest.display(), "installed template");
    Ok(dest)
}

/// Resolve a template and overwrite `context.yaml` with it wholesale
pub fn apply_template(layout: &AgentLayout, name: &str) -> AgentResult<String> {
    let (context, resolved) = resolve_template(layout, name)?;
    codec::save_context(layout, &context)?;
    tracing::info!(template = %resolved, "applied template to context.yaml");
    Ok(resolved)
}

fn load_repo_template(layout: &AgentLayout, name: &str) -> AgentResult<Option<Context>> {
    let path = layout.template_file(name);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let context =
        serde_yaml::from_str(&raw).map_err(|e| AgentError::parse(&path, e.to_string()))?;
    Ok(Some(context))
}

/// Reconcile identity metadata after resolution.
///
/// The project name reflects what the user asked for: it is overwritten
/// with the requested name whenever the supplying source differs from
/// the request or the name was empty. The template field records the
/// source that actually matched, if not already set.
fn finalize_metadata(mut context: Context, resolved: &str, requested: &str) -> Context {
    if !requested.is_empty() && (context.project.name.is_empty() || resolved != requested) {
        context.project.name = requested.to_string();
    }
    if context.project.template.is_empty() {
        context.project.template = resolved.to_string();
    }
    context
}
