//! On-disk layout of the `.agent/` workspace
//!
//! All persisted records live under a single `.agent/` directory at the
//! project root:
//!
//! ```text
//! .agent/
//!   context.yaml           slow-changing project context
//!   state.yaml             fast-changing session state
//!   prompt_profiles.yaml   named prompt rendering modes
//!   templates/             repo-local context templates
//!   workitems/             WI-NNN.md hybrid documents
//!   evidence/              raw copied evidence files
//!   exports/               current.prompt.md (single slot)
//! ```

use crate::codec;
use crate::error::{AgentError, AgentResult};
use crate::prompt;
use crate::templates;
use crate::types::State;
use std::path::{Path, PathBuf};

pub const AGENT_DIR: &str = ".agent";

pub(crate) const CONTEXT_FILE: &str = "context.yaml";
pub(crate) const STATE_FILE: &str = "state.yaml";
pub(crate) const PROMPT_PROFILES_FILE: &str = "prompt_profiles.yaml";
pub(crate) const TEMPLATES_DIR: &str = "templates";
pub(crate) const WORKITEMS_DIR: &str = "workitems";
pub(crate) const EVIDENCE_DIR: &str = "evidence";
pub(crate) const EXPORTS_DIR: &str = "exports";
pub(crate) const CURRENT_PROMPT_FILE: &str = "current.prompt.md";

/// Path builder for a project's `.agent/` workspace.
///
/// Holds no entity data; every operation re-reads from disk so external
/// edits between invocations are always picked up.
#[derive(Debug, Clone)]
pub struct AgentLayout {
    agent_dir: PathBuf,
}

impl AgentLayout {
    /// Layout rooted at the given project directory
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            agent_dir: project_root.as_ref().join(AGENT_DIR),
        }
    }

    /// The `.agent/` directory itself
    pub fn agent_dir(&self) -> &Path {
        &self.agent_dir
    }

    pub fn context_file(&self) -> PathBuf {
        self.agent_dir.join(CONTEXT_FILE)
    }

    pub fn state_file(&self) -> PathBuf {
        self.agent_dir.join(STATE_FILE)
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.agent_dir.join(PROMPT_PROFILES_FILE)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.agent_dir.join(TEMPLATES_DIR)
    }

    pub fn workitems_dir(&self) -> PathBuf {
        self.agent_dir.join(WORKITEMS_DIR)
    }

    pub fn evidence_dir(&self) -> PathBuf {
        self.agent_dir.join(EVIDENCE_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.agent_dir.join(EXPORTS_DIR)
    }

    /// The single-slot rendered prompt artifact
    pub fn prompt_file(&self) -> PathBuf {
        self.exports_dir().join(CURRENT_PROMPT_FILE)
    }

    /// Path of a work item document; the filename is the identity key
    pub fn work_item_file(&self, id: &str) -> PathBuf {
        self.workitems_dir().join(format!("{id}.md"))
    }

    /// Path of a repo-local template
    pub fn template_file(&self, name: &str) -> PathBuf {
        self.templates_dir().join(format!("{name}.yaml"))
    }

    /// Verify the layout has been bootstrapped
    pub fn ensure_exists(&self) -> AgentResult<()> {
        if !self.agent_dir.exists() {
            return Err(AgentError::configuration_missing(&self.agent_dir));
        }
        Ok(())
    }

    /// Create the directory structure and starter files.
    ///
    /// Non-destructive: refuses to proceed if any of the three top-level
    /// config files already exists, leaving the layout untouched.
    pub fn bootstrap(&self, template_name: &str) -> AgentResult<()> {
        self.ensure_fresh()?;

        let (context, source) = templates::resolve_template(self, template_name)?;
        tracing::debug!(template = %source, "bootstrapping .agent layout");

        for dir in [
            self.agent_dir.clone(),
            self.workitems_dir(),
            self.evidence_dir(),
            self.exports_dir(),
            self.templates_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }

        codec::save_context(self, &context)?;
        codec::save_state(self, State::starter())?;
        codec::save_profiles(self, &prompt::default_profiles())?;

        tracing::info!(path = %self.agent_dir.display(), "initialized .agent layout");
        Ok(())
    }

    /// Bootstrap guard: the three config files must not exist yet
    fn ensure_fresh(&self) -> AgentResult<()> {
        match std::fs::metadata(&self.agent_dir) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
            Ok(meta) if !meta.is_dir() => {
                return Err(AgentError::NotADirectory {
                    path: self.agent_dir.clone(),
                })
            }
            Ok(_) => {}
        }

        for protected in [self.context_file(), self.state_file(), self.profiles_file()] {
            if protected.exists() {
                return Err(AgentError::already_initialized(&self.agent_dir));
            }
        }
        Ok(())
    }
}
