//! Project store orchestration.
//!
//! `ProjectStore` owns the in-memory project list and an injected storage
//! backend. Every mutating command follows the same shape: compute a new
//! forest with the pure tree operations, replace the owning project's
//! `features`, refresh `lastUpdated`, and persist the entire list. There is
//! no partial or incremental persistence; each mutation writes the whole
//! dataset, which keeps the single blob trivially consistent.

use chrono::Utc;

use crate::ai::{FeatureExpansion, ProjectAnalysis};
use crate::models::tree::{self, TreeStats};
use crate::models::{migrate, ContextFile, Feature, LifecycleState, Project};
use crate::storage::{self, StorageBackend};
use crate::{Error, Result};

/// Partial update of project metadata; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub repo_url: Option<String>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub goal: Option<String>,
}

/// Partial update of feature fields; `None` fields are left alone.
///
/// State changes through here do not trigger the backlog sink; only
/// [`ProjectStore::set_feature_state`] applies that policy.
#[derive(Debug, Clone, Default)]
pub struct FeatureUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub state: Option<LifecycleState>,
}

/// The orchestrator: in-memory project list plus injected persistence.
pub struct ProjectStore {
    projects: Vec<Project>,
    backend: Box<dyn StorageBackend>,
}

impl ProjectStore {
    /// Open the store, loading and migrating whatever the backend holds.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let projects = storage::load_projects(backend.as_ref());
        Self { projects, backend }
    }

    /// All projects, in insertion order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Look up a project by id.
    pub fn project(&self, id: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    /// Look up a feature anywhere in a project's tree.
    pub fn feature(&self, project_id: &str, feature_id: &str) -> Result<&Feature> {
        let project = self.project(project_id)?;
        tree::find(&project.features, feature_id)
            .ok_or_else(|| Error::FeatureNotFound(feature_id.to_string()))
    }

    /// Aggregate statistics over a project's whole tree.
    pub fn stats(&self, project_id: &str) -> Result<TreeStats> {
        Ok(tree::aggregate(&self.project(project_id)?.features))
    }

    /// Create a project manually. Returns the new project's id.
    pub fn create_project(
        &mut self,
        title: String,
        repo_url: String,
        description: String,
        scope: String,
    ) -> String {
        let mut project = Project::new(title);
        project.repo_url = repo_url;
        project.description = description;
        project.scope = scope;
        let id = project.id.clone();
        self.projects.push(project);
        self.persist();
        id
    }

    /// Create a project from an AI requirements analysis. Returns the id.
    pub fn create_project_from_analysis(
        &mut self,
        analysis: &ProjectAnalysis,
        repo_url: String,
    ) -> String {
        let mut project = Project::new(analysis.title.clone());
        project.repo_url = repo_url;
        project.description = analysis.description.clone();
        if !analysis.scope.is_empty() {
            project.scope = analysis.scope.clone();
        }
        if !analysis.goal.is_empty() {
            project.goal = analysis.goal.clone();
        }
        project.features = analysis
            .features
            .iter()
            .map(|s| Feature::new(s.name.clone(), s.notes.clone()))
            .collect();
        let id = project.id.clone();
        self.projects.push(project);
        self.persist();
        id
    }

    /// Update project metadata fields.
    pub fn update_project(&mut self, id: &str, update: ProjectUpdate) -> Result<()> {
        let project = self.project_mut(id)?;
        if let Some(title) = update.title {
            project.title = title;
        }
        if let Some(repo_url) = update.repo_url {
            project.repo_url = repo_url;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(scope) = update.scope {
            project.scope = scope;
        }
        if let Some(goal) = update.goal {
            project.goal = goal;
        }
        self.touch_and_persist(id);
        Ok(())
    }

    /// Delete a project and its whole feature tree.
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(Error::ProjectNotFound(id.to_string()));
        }
        self.persist();
        Ok(())
    }

    /// Add a feature, top-level or under `parent`. Returns the new id.
    pub fn add_feature(
        &mut self,
        project_id: &str,
        parent: Option<&str>,
        name: String,
        notes: String,
    ) -> Result<String> {
        let feature = Feature::new(name, notes);
        let feature_id = feature.id.clone();

        let project = self.project_mut(project_id)?;
        match parent {
            None => project.features.push(feature),
            Some(parent_id) => {
                if tree::find(&project.features, parent_id).is_none() {
                    return Err(Error::FeatureNotFound(parent_id.to_string()));
                }
                project.features = tree::update(&project.features, parent_id, move |mut p| {
                    p.subfeatures.push(feature.clone());
                    p
                });
            }
        }
        self.touch_and_persist(project_id);
        Ok(feature_id)
    }

    /// Update feature fields (name, notes, state) without relocation.
    pub fn update_feature(
        &mut self,
        project_id: &str,
        feature_id: &str,
        update: FeatureUpdate,
    ) -> Result<()> {
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        project.features = tree::update(&project.features, feature_id, move |mut f| {
            if let Some(name) = update.name.clone() {
                f.name = name;
            }
            if let Some(notes) = update.notes.clone() {
                f.notes = notes;
            }
            if let Some(state) = update.state {
                f.state = state;
            }
            f
        });
        self.touch_and_persist(project_id);
        Ok(())
    }

    /// Transition a feature's lifecycle state.
    ///
    /// When a top-level feature moves to `BACKLOG` it additionally sinks to
    /// the end of the top-level list (backlog items sit at the bottom).
    /// Nested features are never relocated.
    pub fn set_feature_state(
        &mut self,
        project_id: &str,
        feature_id: &str,
        state: LifecycleState,
    ) -> Result<()> {
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        let mut features = tree::update(&project.features, feature_id, move |mut f| {
            f.state = state;
            f
        });

        if state == LifecycleState::Backlog {
            if let Some(pos) = features.iter().position(|f| f.id == feature_id) {
                let sunk = features.remove(pos);
                features.push(sunk);
            }
        }

        project.features = features;
        self.touch_and_persist(project_id);
        Ok(())
    }

    /// Delete a feature; its entire subtree goes with it.
    pub fn delete_feature(&mut self, project_id: &str, feature_id: &str) -> Result<()> {
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        project.features = tree::delete(&project.features, feature_id);
        self.touch_and_persist(project_id);
        Ok(())
    }

    /// Move a top-level feature from one index to another.
    pub fn reorder_features(&mut self, project_id: &str, from: usize, to: usize) -> Result<()> {
        let project = self.project_mut(project_id)?;
        let len = project.features.len();
        if from >= len || to >= len {
            return Err(Error::InvalidInput(format!(
                "Index out of range: {} -> {} in a list of {}",
                from, to, len
            )));
        }
        project.features = tree::reorder(&project.features, from, to);
        self.touch_and_persist(project_id);
        Ok(())
    }

    /// Flip a feature's UI collapse flag.
    pub fn toggle_expanded(&mut self, project_id: &str, feature_id: &str) -> Result<bool> {
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        project.features = tree::update(&project.features, feature_id, |mut f| {
            f.is_expanded = !f.is_expanded;
            f
        });
        let expanded = tree::find(&project.features, feature_id)
            .map(|f| f.is_expanded)
            .unwrap_or(false);
        self.touch_and_persist(project_id);
        Ok(expanded)
    }

    /// Attach a context file to a feature. Returns the file's id.
    pub fn attach_context_file(
        &mut self,
        project_id: &str,
        feature_id: &str,
        file: ContextFile,
    ) -> Result<String> {
        let file_id = file.id.clone();
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        project.features = tree::update(&project.features, feature_id, move |mut f| {
            f.context_files.push(file.clone());
            f
        });
        self.touch_and_persist(project_id);
        Ok(file_id)
    }

    /// Detach a context file from a feature.
    pub fn detach_context_file(
        &mut self,
        project_id: &str,
        feature_id: &str,
        file_id: &str,
    ) -> Result<()> {
        let found = self
            .feature(project_id, feature_id)?
            .context_files
            .iter()
            .any(|f| f.id == file_id);
        if !found {
            return Err(Error::InvalidInput(format!(
                "No context file {} on feature {}",
                file_id, feature_id
            )));
        }
        let project = self.project_mut(project_id)?;
        let file_id = file_id.to_string();
        project.features = tree::update(&project.features, feature_id, move |mut f| {
            f.context_files.retain(|c| c.id != file_id);
            f
        });
        self.touch_and_persist(project_id);
        Ok(())
    }

    /// Append AI-suggested subtasks under a feature. Returns how many.
    pub fn apply_expansion(
        &mut self,
        project_id: &str,
        feature_id: &str,
        expansion: &FeatureExpansion,
    ) -> Result<usize> {
        let project = self.project_mut(project_id)?;
        if tree::find(&project.features, feature_id).is_none() {
            return Err(Error::FeatureNotFound(feature_id.to_string()));
        }
        let subtasks: Vec<Feature> = expansion
            .subtasks
            .iter()
            .map(|s| Feature::new(s.name.clone(), s.notes.clone()))
            .collect();
        let count = subtasks.len();
        project.features = tree::update(&project.features, feature_id, move |mut f| {
            f.subfeatures.extend(subtasks.clone());
            f
        });
        self.touch_and_persist(project_id);
        Ok(count)
    }

    /// Serialize the in-memory list verbatim as a pretty export document.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.projects)?)
    }

    /// Replace all state with an imported document.
    ///
    /// The document must parse as a JSON array; each element then goes
    /// through the same migration as a loaded blob, so old-schema or
    /// partial records import cleanly. On validation failure the store is
    /// left untouched. Returns the number of imported projects.
    pub fn import_json(&mut self, content: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| Error::InvalidImport(format!("not valid JSON: {}", e)))?;
        if !value.is_array() {
            return Err(Error::InvalidImport(
                "expected a top-level array of projects".to_string(),
            ));
        }
        self.projects = migrate::migrate_store(&value);
        self.persist();
        Ok(self.projects.len())
    }

    fn project_mut(&mut self, id: &str) -> Result<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    fn touch_and_persist(&mut self, project_id: &str) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) {
            project.last_updated = Utc::now();
        }
        self.persist();
    }

    fn persist(&mut self) {
        storage::save_projects(self.backend.as_mut(), &self.projects);
    }
}
