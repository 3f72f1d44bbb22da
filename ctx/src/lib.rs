//! Repository-local context and intent manager for coding agents
//!
//! `ctx` persists three kinds of records as plain files under a
//! `.agent/` directory inside a project and assembles a bounded
//! natural-language prompt from them on demand:
//!
//! - **Context** — slow-changing project metadata (architecture,
//!   standards, constraints, quality gates), seeded from a template
//! - **State** — fast-changing session state (active work item, last
//!   handoff summary, health snapshot)
//! - **Work items** — per-task records with structured front matter and
//!   a free-text body that survives metadata rewrites
//!
//! Everything is offline and synchronous: each command re-reads the
//! persisted entities from disk, mutates, saves, and exits. No cache is
//! held between invocations, so external edits between runs are always
//! honored.

pub mod branch;
pub mod codec;
pub mod error;
pub mod evidence;
pub mod intent;
pub mod layout;
pub mod prompt;
pub mod templates;
pub mod types;
pub mod workitems;

pub use error::{AgentError, AgentResult};
pub use layout::AgentLayout;
pub use types::{
    Architecture, Context, HealthSnapshot, PromptProfile, PromptProfileSet, State, WorkItem,
    WorkItemDocument,
};
pub use workitems::WorkItemStore;
