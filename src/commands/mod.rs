//! Command implementations for the Trellis CLI.
//!
//! Each command computes its effect through the store and returns an
//! [`Output`] carrying both a JSON value and a human-readable rendering;
//! `main` decides which one to print. Destructive commands go through a
//! confirmation gate unless `--force` is given.

use std::io::{BufRead, Write};
use std::path::Path;

use serde_json::json;

use crate::ai::SuggestionClient;
use crate::models::tree::TreeStats;
use crate::models::{ContextFile, Feature, LifecycleState, Project};
use crate::store::{FeatureUpdate, ProjectStore, ProjectUpdate};
use crate::{Error, Result};

/// Command result in both output formats.
#[derive(Debug)]
pub struct Output {
    json: serde_json::Value,
    human: String,
}

impl Output {
    fn new(json: serde_json::Value, human: impl Into<String>) -> Self {
        Self {
            json,
            human: human.into(),
        }
    }

    /// Print to stdout in the requested format.
    pub fn print(&self, human: bool) {
        if human {
            println!("{}", self.human);
        } else {
            println!("{}", self.json);
        }
    }
}

/// Ask for confirmation on stdin. Anything but an explicit yes declines.
fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes" | "YES")
}

// === Project commands ===

pub fn project_create(
    store: &mut ProjectStore,
    title: String,
    repo: String,
    scope: String,
    description: String,
) -> Result<Output> {
    // Same fallbacks the manual-create form applies.
    let title = if title.trim().is_empty() {
        "Untitled Project".to_string()
    } else {
        title
    };
    let description = if description.trim().is_empty() {
        "Manually created project.".to_string()
    } else {
        description
    };
    let scope = if scope.trim().is_empty() {
        crate::models::DEFAULT_SCOPE.to_string()
    } else {
        scope
    };

    let id = store.create_project(title, repo, description, scope);
    let project = store.project(&id)?;
    Ok(Output::new(
        json!({ "id": id, "title": project.title }),
        format!("Created project {} ({})", project.title, id),
    ))
}

pub fn project_analyze(
    store: &mut ProjectStore,
    client: &dyn SuggestionClient,
    notes_path: &Path,
    title_hint: String,
    repo: String,
) -> Result<Output> {
    let notes = std::fs::read_to_string(notes_path)?;
    let analysis = client.analyze_requirements(&notes, &title_hint)?;
    let id = store.create_project_from_analysis(&analysis, repo);
    let project = store.project(&id)?;
    Ok(Output::new(
        json!({
            "id": id,
            "title": project.title,
            "features": project.features.len(),
        }),
        format!(
            "Created project {} ({}) with {} suggested features",
            project.title,
            id,
            project.features.len()
        ),
    ))
}

pub fn project_list(store: &ProjectStore) -> Result<Output> {
    let entries: Vec<serde_json::Value> = store
        .projects()
        .iter()
        .map(|p| {
            let stats = crate::models::tree::aggregate(&p.features);
            json!({
                "id": p.id,
                "title": p.title,
                "features": stats.total,
                "progress": stats.percent_complete(),
            })
        })
        .collect();

    let mut human = String::new();
    for p in store.projects() {
        let stats = crate::models::tree::aggregate(&p.features);
        human.push_str(&format!(
            "{}  {}  ({} features, {}% complete)\n",
            p.id,
            p.title,
            stats.total,
            stats.percent_complete()
        ));
    }
    if human.is_empty() {
        human.push_str("No projects. Create one with `tl project create`.");
    }

    Ok(Output::new(json!(entries), human.trim_end().to_string()))
}

pub fn project_show(store: &ProjectStore, id: &str) -> Result<Output> {
    let project = store.project(id)?;
    Ok(Output::new(
        serde_json::to_value(project)?,
        render_project(project),
    ))
}

pub fn project_set(store: &mut ProjectStore, id: &str, update: ProjectUpdate) -> Result<Output> {
    store.update_project(id, update)?;
    let project = store.project(id)?;
    Ok(Output::new(
        json!({ "id": id, "title": project.title, "updated": true }),
        format!("Updated project {}", id),
    ))
}

pub fn project_delete(store: &mut ProjectStore, id: &str, force: bool) -> Result<Output> {
    let title = store.project(id)?.title.clone();
    if !force && !confirm(&format!("Delete project \"{}\" and its whole feature tree?", title)) {
        return Err(Error::Aborted);
    }
    store.delete_project(id)?;
    Ok(Output::new(
        json!({ "id": id, "deleted": true }),
        format!("Deleted project {} ({})", title, id),
    ))
}

// === Feature commands ===

pub fn feature_add(
    store: &mut ProjectStore,
    project: &str,
    name: String,
    parent: Option<String>,
    notes: String,
) -> Result<Output> {
    let id = store.add_feature(project, parent.as_deref(), name, notes)?;
    let feature = store.feature(project, &id)?;
    Ok(Output::new(
        json!({ "id": id, "name": feature.name, "state": feature.state }),
        format!("Added feature {} ({})", feature.name, id),
    ))
}

pub fn feature_show(store: &ProjectStore, project: &str, id: &str) -> Result<Output> {
    let feature = store.feature(project, id)?;
    let mut human = String::new();
    render_tree(std::slice::from_ref(feature), 0, &mut human);
    if !feature.notes.is_empty() {
        human.push_str(&format!("notes: {}\n", feature.notes));
    }
    for file in &feature.context_files {
        human.push_str(&format!("context: {} ({})\n", file.name, file.id));
    }
    Ok(Output::new(
        serde_json::to_value(feature)?,
        human.trim_end().to_string(),
    ))
}

pub fn feature_set(
    store: &mut ProjectStore,
    project: &str,
    id: &str,
    name: Option<String>,
    notes: Option<String>,
    state: Option<String>,
) -> Result<Output> {
    let state = state
        .map(|s| s.parse::<LifecycleState>().map_err(Error::InvalidInput))
        .transpose()?;
    store.update_feature(project, id, FeatureUpdate { name, notes, state })?;
    Ok(Output::new(
        json!({ "id": id, "updated": true }),
        format!("Updated feature {}", id),
    ))
}

pub fn feature_state(
    store: &mut ProjectStore,
    project: &str,
    id: &str,
    state: &str,
) -> Result<Output> {
    let state = state.parse::<LifecycleState>().map_err(Error::InvalidInput)?;
    store.set_feature_state(project, id, state)?;
    Ok(Output::new(
        json!({ "id": id, "state": state }),
        format!("Feature {} is now {}", id, state),
    ))
}

pub fn feature_delete(
    store: &mut ProjectStore,
    project: &str,
    id: &str,
    force: bool,
) -> Result<Output> {
    let name = store.feature(project, id)?.name.clone();
    if !force && !confirm(&format!("Delete feature \"{}\" and all of its subfeatures?", name)) {
        return Err(Error::Aborted);
    }
    store.delete_feature(project, id)?;
    Ok(Output::new(
        json!({ "id": id, "deleted": true }),
        format!("Deleted feature {} ({})", name, id),
    ))
}

pub fn feature_move(
    store: &mut ProjectStore,
    project: &str,
    from: usize,
    to: usize,
) -> Result<Output> {
    store.reorder_features(project, from, to)?;
    Ok(Output::new(
        json!({ "from": from, "to": to, "moved": true }),
        format!("Moved feature from index {} to {}", from, to),
    ))
}

pub fn feature_toggle(store: &mut ProjectStore, project: &str, id: &str) -> Result<Output> {
    let expanded = store.toggle_expanded(project, id)?;
    Ok(Output::new(
        json!({ "id": id, "expanded": expanded }),
        format!(
            "Feature {} is now {}",
            id,
            if expanded { "expanded" } else { "collapsed" }
        ),
    ))
}

pub fn feature_attach(
    store: &mut ProjectStore,
    project: &str,
    id: &str,
    path: &Path,
    file_type: String,
) -> Result<Output> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let file = ContextFile::new(name.clone(), content, file_type);
    let file_id = store.attach_context_file(project, id, file)?;
    Ok(Output::new(
        json!({ "fileId": file_id, "name": name }),
        format!("Attached {} ({})", name, file_id),
    ))
}

pub fn feature_detach(
    store: &mut ProjectStore,
    project: &str,
    id: &str,
    file_id: &str,
) -> Result<Output> {
    store.detach_context_file(project, id, file_id)?;
    Ok(Output::new(
        json!({ "fileId": file_id, "detached": true }),
        format!("Detached context file {}", file_id),
    ))
}

pub fn feature_expand(
    store: &mut ProjectStore,
    client: &dyn SuggestionClient,
    project: &str,
    id: &str,
) -> Result<Output> {
    let feature = store.feature(project, id)?.clone();
    let description = store.project(project)?.description.clone();
    let expansion = client.expand_feature(&feature, &description)?;
    let added = store.apply_expansion(project, id, &expansion)?;
    Ok(Output::new(
        json!({ "id": id, "subtasks": added }),
        format!("Added {} subtasks under {}", added, feature.name),
    ))
}

// === Whole-store commands ===

pub fn stats(store: &ProjectStore, project: &str) -> Result<Output> {
    let stats = store.stats(project)?;
    let mut json = serde_json::to_value(stats)?;
    json["percentComplete"] = json!(stats.percent_complete());
    Ok(Output::new(json, render_stats(&stats)))
}

pub fn report(store: &ProjectStore, client: &dyn SuggestionClient, project: &str) -> Result<Output> {
    let project = store.project(project)?;
    let text = client.generate_status_report(project)?;
    Ok(Output::new(json!({ "report": text }), text.clone()))
}

pub fn export(store: &ProjectStore, file: Option<&Path>) -> Result<Output> {
    let document = store.export_json()?;
    match file {
        Some(path) => {
            std::fs::write(path, &document)?;
            Ok(Output::new(
                json!({ "exported": store.projects().len(), "file": path.display().to_string() }),
                format!("Exported {} projects to {}", store.projects().len(), path.display()),
            ))
        }
        None => Ok(Output::new(
            serde_json::from_str(&document)?,
            document,
        )),
    }
}

pub fn import(store: &mut ProjectStore, file: &Path) -> Result<Output> {
    let content = std::fs::read_to_string(file)?;
    let count = store.import_json(&content)?;
    Ok(Output::new(
        json!({ "imported": count }),
        format!("Imported {} projects", count),
    ))
}

// === Rendering helpers ===

fn render_project(project: &Project) -> String {
    let stats = crate::models::tree::aggregate(&project.features);
    let mut out = format!(
        "{} ({})\n  {}\n  scope: {}\n  goal: {}\n",
        project.title, project.id, project.description, project.scope, project.goal
    );
    if !project.repo_url.is_empty() {
        out.push_str(&format!("  repo: {}\n", project.repo_url));
    }
    out.push_str(&format!(
        "  progress: {}% of {} features stable\n",
        stats.percent_complete(),
        stats.total
    ));
    if !project.features.is_empty() {
        out.push('\n');
        render_tree(&project.features, 0, &mut out);
    }
    out.trim_end().to_string()
}

fn render_tree(features: &[Feature], depth: usize, out: &mut String) {
    for feature in features {
        out.push_str(&format!(
            "{}{} [{}] ({})\n",
            "  ".repeat(depth),
            feature.name,
            feature.state,
            feature.id
        ));
        render_tree(&feature.subfeatures, depth + 1, out);
    }
}

fn render_stats(stats: &TreeStats) -> String {
    format!(
        "total: {}\nbacklog: {}\ncreating: {}\npolishing: {}\nexpanding: {}\nstable: {}\nprogress: {}%",
        stats.total,
        stats.backlog,
        stats.creating,
        stats.polishing,
        stats.expanding,
        stats.stable,
        stats.percent_complete()
    )
}
