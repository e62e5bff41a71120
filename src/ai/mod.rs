//! AI suggestion adapter.
//!
//! External collaborator that turns free-form notes into structured feature
//! suggestions. The core depends only on the [`SuggestionClient`] trait;
//! [`gemini::GeminiClient`] is the real implementation. Each call is a single
//! request/response exchange; failures are surfaced to the user once and
//! never retried, and local state is left unchanged on failure.

pub mod gemini;

pub use gemini::GeminiClient;

use serde::Deserialize;

use crate::models::{Feature, Project};

/// Errors from the suggestion service boundary.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    /// No credentials available; checked before any request is made
    #[error("API key is missing: set GEMINI_API_KEY or add api-key to config.toml")]
    MissingApiKey,

    /// Network or non-success HTTP status
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body did not match the expected shape
    #[error("Failed to parse suggestion response: {0}")]
    Parse(String),

    /// The service answered with no usable text
    #[error("Empty response from suggestion service")]
    EmptyResponse,
}

/// A suggested feature or subtask: just a name and working notes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestedFeature {
    pub name: String,
    #[serde(default)]
    pub notes: String,
}

/// Structured result of analyzing a free-form design document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectAnalysis {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub features: Vec<SuggestedFeature>,
}

/// Structured result of breaking a feature into subtasks.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureExpansion {
    #[serde(default)]
    pub subtasks: Vec<SuggestedFeature>,
}

/// Boundary trait for the text-generation collaborator.
pub trait SuggestionClient {
    /// Analyze unstructured requirements into a project skeleton.
    fn analyze_requirements(
        &self,
        design_doc: &str,
        title_hint: &str,
    ) -> Result<ProjectAnalysis, SuggestionError>;

    /// Break a feature into 3-5 smaller subtasks, using any attached
    /// context files as additional input.
    fn expand_feature(
        &self,
        feature: &Feature,
        project_context: &str,
    ) -> Result<FeatureExpansion, SuggestionError>;

    /// Produce a clipboard-ready status report for a project.
    fn generate_status_report(&self, project: &Project) -> Result<String, SuggestionError>;
}

/// Strip markdown code fences the model sometimes wraps JSON in.
pub(crate) fn clean_json(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Build the user-context block for a feature expansion request, inlining
/// attached context files the way the service expects them.
pub(crate) fn expansion_context(feature: &Feature, project_context: &str) -> String {
    let mut context = format!(
        "Project Context: {}. \n Feature to Expand: {} ({})",
        project_context, feature.name, feature.notes
    );

    if !feature.context_files.is_empty() {
        context.push_str("\n\n--- ATTACHED CONTEXT FILES (Code/Docs) ---\n");
        for file in &feature.context_files {
            context.push_str(&format!(
                "\n[FILE: {}]\n{}\n--- END FILE ---\n",
                file.name, file.content
            ));
        }
    }

    context
}

/// Build the compact project summary sent with a status report request.
///
/// Only names and states go over the wire; notes and context files stay local.
pub(crate) fn report_payload(project: &Project) -> String {
    let features: Vec<serde_json::Value> = project
        .features
        .iter()
        .map(|f| serde_json::json!({ "name": f.name, "state": f.state }))
        .collect();
    serde_json::json!({
        "title": project.title,
        "desc": project.description,
        "features": features,
    })
    .to_string()
}
