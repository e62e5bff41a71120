//! CLI argument definitions for Trellis.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trellis - track project feature trees through their lifecycle.
///
/// Start with `tl project create` (or `tl project analyze` to let the AI
/// draft the tree from a design document), then manage features with
/// `tl feature`.
#[derive(Parser, Debug)]
#[command(name = "tl")]
#[command(author, version, about = "A CLI tool for tracking project feature trees", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Project management commands
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Feature management commands (tree nodes within a project)
    Feature {
        #[command(subcommand)]
        command: FeatureCommands,
    },

    /// Show aggregate statistics for a project's whole feature tree
    Stats {
        /// Project ID
        project: String,
    },

    /// Generate an AI status report for a project
    Report {
        /// Project ID
        project: String,
    },

    /// Export all projects to a JSON document
    Export {
        /// Output file (stdout when omitted)
        file: Option<PathBuf>,
    },

    /// Import a JSON document, replacing all current state
    Import {
        /// Input file (must contain a top-level array of projects)
        file: PathBuf,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project manually
    Create {
        /// Project title
        title: String,

        /// Repository URL (informational)
        #[arg(long, default_value = "")]
        repo: String,

        /// Scope statement (e.g. "MVP", "Phase 1")
        #[arg(long, default_value = "")]
        scope: String,

        /// Short description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a project from a design document via the AI service
    Analyze {
        /// File with free-form notes / requirements
        notes: PathBuf,

        /// Preferred title (the AI invents one when omitted)
        #[arg(long, default_value = "")]
        title: String,

        /// Repository URL (informational)
        #[arg(long, default_value = "")]
        repo: String,
    },

    /// List all projects
    List,

    /// Show one project with its full feature tree
    Show {
        /// Project ID
        id: String,
    },

    /// Update project metadata
    Set {
        /// Project ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New repository URL
        #[arg(long)]
        repo: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New scope statement
        #[arg(long)]
        scope: Option<String>,

        /// New goal statement
        #[arg(long)]
        goal: Option<String>,
    },

    /// Delete a project and its whole feature tree
    Delete {
        /// Project ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Feature subcommands
#[derive(Subcommand, Debug)]
pub enum FeatureCommands {
    /// Add a feature (top-level, or under --parent)
    Add {
        /// Project ID
        project: String,

        /// Feature name
        name: String,

        /// Parent feature ID (top-level when omitted)
        #[arg(long)]
        parent: Option<String>,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show a feature and its subtree
    Show {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,
    },

    /// Update feature fields
    Set {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,

        /// New lifecycle state (backlog, creating, fix, expanding, stable)
        #[arg(long)]
        state: Option<String>,
    },

    /// Transition a feature's lifecycle state.
    ///
    /// Top-level features moving to BACKLOG sink to the end of the list.
    State {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,

        /// Target state (backlog, creating, fix, expanding, stable)
        state: String,
    },

    /// Delete a feature and all of its subfeatures
    Delete {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Move a top-level feature to a new position
    Move {
        /// Project ID
        project: String,

        /// Current index (0-based)
        from: usize,

        /// Target index (0-based)
        to: usize,
    },

    /// Toggle a feature's expand/collapse display flag
    Toggle {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,
    },

    /// Attach a text file as AI-enrichment context
    Attach {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,

        /// File to attach
        file: PathBuf,

        /// Type tag for the file (e.g. a MIME type)
        #[arg(long = "type", default_value = "")]
        file_type: String,
    },

    /// Detach a context file
    Detach {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,

        /// Context file ID
        file_id: String,
    },

    /// Break a feature into subtasks via the AI service
    Expand {
        /// Project ID
        project: String,

        /// Feature ID
        id: String,
    },
}
