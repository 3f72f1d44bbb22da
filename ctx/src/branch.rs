//! Branch name suggestion
//!
//! Pure string scrubbing: lowercase the title, swap `&` for `and`,
//! collapse every non-alphanumeric run into a single dash, trim, cap at
//! 32 characters, and prefix with the lowercased work item ID.

use crate::types::WorkItem;
use regex::Regex;
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const MAX_SLUG_LEN: usize = 32;

/// Propose a branch name for a work item, e.g. `wi-004-fix-login-timeout`
pub fn suggest_branch_name(item: &WorkItem) -> String {
    let slug = sanitize(&item.title.to_lowercase());
    format!("{}-{}", item.id.to_lowercase(), slug)
}

fn sanitize(input: &str) -> String {
    let replaced = input.replace('&', "and");
    let collapsed = NON_ALPHANUMERIC.replace_all(&replaced, "-");
    let trimmed = collapsed.trim_matches('-');

    let mut slug = if trimmed.is_empty() {
        "work".to_string()
    } else {
        trimmed.to_string()
    };
    slug.truncate(MAX_SLUG_LEN);
    slug
}
