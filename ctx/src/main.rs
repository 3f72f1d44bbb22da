//! `ctx` command-line interface
//!
//! Thin dispatch over the library contracts: every subcommand loads
//! what it needs from `.agent/`, applies one mutation or render, and
//! prints a single confirmation line to stdout. Diagnostics go to
//! stderr via tracing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctx::branch::suggest_branch_name;
use ctx::codec;
use ctx::evidence::copy_evidence;
use ctx::intent::classify_intent;
use ctx::prompt::build_prompt;
use ctx::templates;
use ctx::workitems::{new_work_item, WorkItemStore};
use ctx::{AgentError, AgentLayout};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "ctx",
    version,
    about = "Repository-local context and intent manager for coding agents",
    long_about = "ctx manages project context, state, work items, evidence, and prompt \
                  assembly offline inside the repo."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize .agent/ with starter files
    Init {
        /// Template to seed context.yaml from
        template: String,
    },

    /// Create a new work item from natural language
    Issue {
        /// Work item description
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Manage active work items
    Work {
        #[command(subcommand)]
        command: WorkCommands,
    },

    /// Manage evidence for the active work item
    Evidence {
        #[command(subcommand)]
        command: EvidenceCommands,
    },

    /// Generate the agent prompt for the active work item
    Prompt {
        /// Prompt profile to use (cheap|standard|deep)
        #[arg(short, long, default_value = "cheap")]
        profile: String,
    },

    /// Manage project context
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },

    /// Manage ctx templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum WorkCommands {
    /// Mark a work item as active and suggest a branch name
    Start {
        /// Work item ID (WI-XXX)
        id: String,
    },
    /// Stop active work and capture a one-line handoff summary
    Stop,
}

#[derive(Subcommand, Debug)]
enum EvidenceCommands {
    /// Copy evidence into .agent/evidence/ and link it to the active work item
    Add {
        /// Source file to copy
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ContextCommands {
    /// Apply a template to .agent/context.yaml
    Apply {
        /// Template name
        template: String,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// Install a built-in template into .agent/templates
    Install {
        /// Built-in template name
        name: String,
        /// Overwrite an existing template file
        #[arg(long)]
        force: bool,
    },
    /// List available templates
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ctx=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let layout = AgentLayout::new(std::env::current_dir()?);
    run(&layout, cli.command)
}

fn run(layout: &AgentLayout, command: Commands) -> Result<()> {
    match command {
        Commands::Init { template } => {
            layout.bootstrap(&template)?;
            println!("Initialized .agent/ with starter context.");
        }
        Commands::Issue { text } => cmd_issue(layout, &text)?,
        Commands::Work { command } => match command {
            WorkCommands::Start { id } => cmd_work_start(layout, &id)?,
            WorkCommands::Stop => cmd_work_stop(layout)?,
        },
        Commands::Evidence { command } => match command {
            EvidenceCommands::Add { file } => cmd_evidence_add(layout, &file)?,
        },
        Commands::Prompt { profile } => {
            layout.ensure_exists()?;
            let dest = build_prompt(layout, &profile)?;
            println!("Prompt written to {}", dest.display());
        }
        Commands::Context { command } => match command {
            ContextCommands::Apply { template } => {
                layout.ensure_exists()?;
                let resolved = templates::apply_template(layout, &template)?;
                println!("Applied template \"{resolved}\" to .agent/context.yaml");
            }
        },
        Commands::Template { command } => match command {
            TemplateCommands::Install { name, force } => {
                let dest = templates::install_template(layout, &name, force)?;
                println!("Installed template \"{name}\" to {}", dest.display());
            }
            TemplateCommands::List => cmd_template_list(layout)?,
        },
    }
    Ok(())
}

fn cmd_issue(layout: &AgentLayout, words: &[String]) -> Result<()> {
    layout.ensure_exists()?;

    let title = words.join(" ").trim().to_string();
    if title.is_empty() {
        anyhow::bail!("work item text cannot be empty");
    }

    let store = WorkItemStore::new(layout);
    let id = store.next_id()?;
    let intents = classify_intent(&title);
    let doc = new_work_item(&id, &title, intents);
    store.save(&doc)?;

    let mut state = codec::load_state(layout)?;
    state.active_work_item = id.clone();
    state.branch_suggestion.clear();
    state.last_summary.clear();
    codec::save_state(layout, state)?;

    println!("Created {id} ({title}) and set as active.");
    Ok(())
}

fn cmd_work_start(layout: &AgentLayout, id: &str) -> Result<()> {
    layout.ensure_exists()?;

    let store = WorkItemStore::new(layout);
    let mut doc = store.load(id)?;
    let branch = suggest_branch_name(&doc.meta);

    let mut state = codec::load_state(layout)?;
    state.active_work_item = id.to_string();
    state.branch_suggestion = branch.clone();
    codec::save_state(layout, state)?;

    doc.meta.status = "active".to_string();
    doc.meta.branch_suggestion = branch.clone();
    store.save(&doc)?;

    println!("Set {id} as active. Suggested branch: {branch}");
    Ok(())
}

fn cmd_work_stop(layout: &AgentLayout) -> Result<()> {
    layout.ensure_exists()?;

    let mut state = codec::load_state(layout)?;
    if state.active_work_item.is_empty() {
        anyhow::bail!("no active work item to stop");
    }

    print!("One-line summary: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let summary = line.trim().to_string();

    let store = WorkItemStore::new(layout);
    let mut doc = store.load(&state.active_work_item)?;
    doc.meta.last_summary = summary.clone();
    doc.meta.status = "paused".to_string();
    store.save(&doc)?;

    state.last_summary = summary;
    state.active_work_item.clear();
    state.branch_suggestion.clear();
    codec::save_state(layout, state)?;

    println!("Work stopped and summary captured.");
    Ok(())
}

fn cmd_evidence_add(layout: &AgentLayout, file: &Path) -> Result<()> {
    layout.ensure_exists()?;

    let state = codec::load_state(layout)?;
    if state.active_work_item.is_empty() {
        return Err(AgentError::NoActiveWorkItem.into());
    }

    let rel = copy_evidence(layout, file)?;

    let store = WorkItemStore::new(layout);
    let mut doc = store.load(&state.active_work_item)?;
    doc.meta.evidence.push(rel.clone());
    store.save(&doc)?;

    println!("Added evidence {rel} to {}.", doc.meta.id);
    Ok(())
}

fn cmd_template_list(layout: &AgentLayout) -> Result<()> {
    let builtins = templates::builtin_template_names();
    let repo_templates = templates::list_repo_templates(layout)?;

    println!("Built-in templates:");
    if builtins.is_empty() {
        println!("- none");
    } else {
        for name in builtins {
            println!("- {name}");
        }
    }

    println!("Repo templates (.agent/templates):");
    if repo_templates.is_empty() {
        println!("- none");
    } else {
        for name in repo_templates {
            println!("- {name}");
        }
    }
    Ok(())
}
