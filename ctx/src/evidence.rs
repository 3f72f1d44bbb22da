//! Evidence file copying
//!
//! Copies raw files into `.agent/evidence/` and hands back the
//! `.agent`-relative path for linking into a work item. Colliding
//! basenames get the smallest unused `-N` suffix before the extension.

use crate::error::{AgentError, AgentResult};
use crate::layout::{AgentLayout, EVIDENCE_DIR};
use std::path::Path;

/// Copy a file into the evidence directory, returning the relative path
/// (always `/`-separated) recorded on work items.
pub fn copy_evidence(layout: &AgentLayout, source: &Path) -> AgentResult<String> {
    let base = source
        .file_name()
        .filter(|_| source.is_file())
        .ok_or_else(|| AgentError::EvidenceSourceMissing {
            path: source.to_path_buf(),
        })?
        .to_string_lossy()
        .to_string();

    std::fs::create_dir_all(layout.evidence_dir())?;

    let mut file_name = base.clone();
    let mut dest = layout.evidence_dir().join(&file_name);
    if dest.exists() {
        file_name = unique_file_name(layout, &base);
        dest = layout.evidence_dir().join(&file_name);
    }

    std::fs::copy(source, &dest)?;
    tracing::debug!(source = %source.display(), dest = %dest.display(), "copied evidence");
    Ok(format!("{EVIDENCE_DIR}/{file_name}"))
}

/// Smallest `-N` suffixed name not yet present in the evidence directory
fn unique_file_name(layout: &AgentLayout, base: &str) -> String {
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    for n in 1u32.. {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if !layout.evidence_dir().join(&candidate).exists() {
            return candidate;
        }
    }
    unreachable!("suffix space exhausted")
}
