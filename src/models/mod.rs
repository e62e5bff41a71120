//! Data models for Trellis entities.
//!
//! This module defines the core data structures:
//! - `Project` - Top-level container with descriptive metadata and a feature forest
//! - `Feature` - A trackable unit of work with a lifecycle state and nested subfeatures
//! - `ContextFile` - Text blob attached to a feature as AI-enrichment context
//! - `LifecycleState` - The fixed five-state feature lifecycle
//!
//! Wire field names are camelCase (`repoUrl`, `isExpanded`, ...) so persisted
//! documents from earlier releases keep loading unchanged.

pub mod migrate;
pub mod tree;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default scope text for projects created without one.
pub const DEFAULT_SCOPE: &str = "No specific scope defined.";

/// Default goal text for projects created without one.
pub const DEFAULT_GOAL: &str = "No specific goal defined.";

/// Generate a short prefixed identifier (e.g., "tlf-a1b2c3d4").
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..8])
}

/// Lifecycle state of a feature.
///
/// Serialized as the uppercase wire strings (`BACKLOG`, `FIX/POLISH`, ...)
/// used by the persisted document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    #[serde(rename = "BACKLOG")]
    Backlog,
    #[serde(rename = "CREATING")]
    Creating,
    #[serde(rename = "FIX/POLISH")]
    FixPolish,
    #[serde(rename = "EXPANDING")]
    Expanding,
    #[serde(rename = "STABLE")]
    Stable,
}

impl LifecycleState {
    /// Get the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Backlog => "BACKLOG",
            LifecycleState::Creating => "CREATING",
            LifecycleState::FixPolish => "FIX/POLISH",
            LifecycleState::Expanding => "EXPANDING",
            LifecycleState::Stable => "STABLE",
        }
    }

    /// Get all lifecycle states in display order.
    pub fn all() -> &'static [LifecycleState] {
        &[
            LifecycleState::Backlog,
            LifecycleState::Creating,
            LifecycleState::FixPolish,
            LifecycleState::Expanding,
            LifecycleState::Stable,
        ]
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BACKLOG" => Ok(LifecycleState::Backlog),
            "CREATING" | "CREATE" => Ok(LifecycleState::Creating),
            "FIX/POLISH" | "FIX" | "POLISH" => Ok(LifecycleState::FixPolish),
            "EXPANDING" | "EXPAND" => Ok(LifecycleState::Expanding),
            "STABLE" | "DONE" => Ok(LifecycleState::Stable),
            _ => Err(format!("Unknown lifecycle state: {}", s)),
        }
    }
}

/// A text blob attached to a feature, sent along with AI expansion requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFile {
    /// Unique identifier (e.g., "tlc-a1b2c3d4")
    pub id: String,

    /// Original file name
    pub name: String,

    /// Full text content
    pub content: String,

    /// MIME type or other informal type tag
    #[serde(rename = "type", default)]
    pub file_type: String,
}

impl ContextFile {
    /// Create a new context file from a name and its content.
    pub fn new(name: String, content: String, file_type: String) -> Self {
        Self {
            id: new_id("tlc"),
            name,
            content,
            file_type,
        }
    }
}

/// A trackable unit of work within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Unique identifier within the owning project (e.g., "tlf-a1b2c3d4")
    pub id: String,

    /// Short display name
    pub name: String,

    /// Current lifecycle state
    #[serde(default)]
    pub state: LifecycleState,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,

    /// Ordered child features; order is display and reorder order
    #[serde(default)]
    pub subfeatures: Vec<Feature>,

    /// UI collapse flag; no effect on data integrity
    #[serde(default)]
    pub is_expanded: bool,

    /// Attached context blobs used only for AI enrichment
    #[serde(default)]
    pub context_files: Vec<ContextFile>,
}

impl Feature {
    /// Create a new feature with the given name.
    ///
    /// New features start in `CREATING`, matching the manual-add flow.
    pub fn new(name: String, notes: String) -> Self {
        Self {
            id: new_id("tlf"),
            name,
            state: LifecycleState::Creating,
            notes,
            subfeatures: Vec::new(),
            is_expanded: false,
            context_files: Vec::new(),
        }
    }
}

/// A top-level container of a feature forest plus descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier among stored projects (e.g., "tlp-a1b2c3d4")
    pub id: String,

    /// Project title
    pub title: String,

    /// Repository URL, informational only
    #[serde(default)]
    pub repo_url: String,

    /// Short technical description
    #[serde(default)]
    pub description: String,

    /// Scope statement
    #[serde(default)]
    pub scope: String,

    /// Goal statement (what "done" looks like)
    #[serde(default)]
    pub goal: String,

    /// Top-level feature forest
    #[serde(default)]
    pub features: Vec<Feature>,

    /// Advisory last-modified timestamp
    pub last_updated: DateTime<Utc>,
}

impl Project {
    /// Create a new project with the given title.
    pub fn new(title: String) -> Self {
        Self {
            id: new_id("tlp"),
            title,
            repo_url: String::new(),
            description: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
            goal: DEFAULT_GOAL.to_string(),
            features: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}
