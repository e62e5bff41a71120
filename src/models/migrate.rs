//! Schema migration for persisted documents.
//!
//! The persisted blob carries no version field; any record written by an
//! earlier release (or hand-edited) is upgraded here by tolerant decoding.
//! Every absent field gets a documented default and the result is always a
//! fully-populated, current-schema record:
//!
//! | field                  | default when absent                |
//! |------------------------|------------------------------------|
//! | feature `contextFiles` | empty list                         |
//! | feature `subfeatures`  | empty list (present ones recurse)  |
//! | feature `notes`        | empty string                       |
//! | feature `isExpanded`   | false                              |
//! | feature `state`        | `BACKLOG` (also for unknown values)|
//! | project `scope`        | `"No specific scope defined."`     |
//! | project `goal`         | `"No specific goal defined."`      |
//! | project `lastUpdated`  | now (also for unparseable values)  |
//!
//! Migration is idempotent: running it over an already-current record yields
//! an equivalent record. Duplicate feature ids within a project are re-keyed
//! (first pre-order occurrence keeps its id) so the id-based tree operations
//! stay unambiguous.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

use super::{ContextFile, Feature, LifecycleState, Project, new_id, DEFAULT_GOAL, DEFAULT_SCOPE};

/// Migrate a whole persisted document (a JSON array of projects).
///
/// Non-object elements are dropped; duplicate project ids are re-keyed.
pub fn migrate_store(value: &Value) -> Vec<Project> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut projects: Vec<Project> = items.iter().filter_map(migrate_project).collect();
    for project in &mut projects {
        if !seen.insert(project.id.clone()) {
            project.id = new_id("tlp");
            seen.insert(project.id.clone());
        }
    }
    projects
}

/// Migrate a single loosely-shaped project record.
///
/// Returns `None` if the value is not a JSON object at all.
pub fn migrate_project(value: &Value) -> Option<Project> {
    let obj = value.as_object()?;

    let mut features: Vec<Feature> = obj
        .get("features")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(migrate_feature).collect())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    rekey_duplicates(&mut features, &mut seen);

    Some(Project {
        id: string_or(obj.get("id"), || new_id("tlp")),
        title: string_or(obj.get("title"), || "Untitled Project".to_string()),
        repo_url: string_or(obj.get("repoUrl"), String::new),
        description: string_or(obj.get("description"), String::new),
        scope: string_or(obj.get("scope"), || DEFAULT_SCOPE.to_string()),
        goal: string_or(obj.get("goal"), || DEFAULT_GOAL.to_string()),
        features,
        last_updated: obj
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
    })
}

/// Migrate a single loosely-shaped feature record, recursing into children.
fn migrate_feature(value: &Value) -> Option<Feature> {
    let obj = value.as_object()?;

    let state = obj
        .get("state")
        .and_then(|v| serde_json::from_value::<LifecycleState>(v.clone()).ok())
        .unwrap_or(LifecycleState::Backlog);

    let subfeatures = obj
        .get("subfeatures")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(migrate_feature).collect())
        .unwrap_or_default();

    let context_files = obj
        .get("contextFiles")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(migrate_context_file).collect())
        .unwrap_or_default();

    Some(Feature {
        id: string_or(obj.get("id"), || new_id("tlf")),
        name: string_or(obj.get("name"), || "Untitled Feature".to_string()),
        state,
        notes: string_or(obj.get("notes"), String::new),
        subfeatures,
        is_expanded: obj
            .get("isExpanded")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        context_files,
    })
}

fn migrate_context_file(value: &Value) -> Option<ContextFile> {
    let obj = value.as_object()?;
    Some(ContextFile {
        id: string_or(obj.get("id"), || new_id("tlc")),
        name: string_or(obj.get("name"), String::new),
        content: string_or(obj.get("content"), String::new),
        file_type: string_or(obj.get("type"), String::new),
    })
}

fn string_or(value: Option<&Value>, default: impl FnOnce() -> String) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(default)
}

/// Assign fresh ids to second and later pre-order occurrences of an id.
fn rekey_duplicates(features: &mut [Feature], seen: &mut HashSet<String>) {
    for feature in features {
        if !seen.insert(feature.id.clone()) {
            feature.id = new_id("tlf");
            seen.insert(feature.id.clone());
        }
        rekey_duplicates(&mut feature.subfeatures, seen);
    }
}
