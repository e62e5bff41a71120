//! Gemini REST client for the suggestion adapter.
//!
//! Blocking `ureq` calls against the `generateContent` endpoint, one request
//! per suggestion. Structured responses are requested as JSON but may still
//! arrive fenced in markdown, so everything passes through the fence
//! stripper before parsing.

use serde::Deserialize;

use crate::models::{Feature, Project};

use super::{
    clean_json, expansion_context, report_payload, FeatureExpansion, ProjectAnalysis,
    SuggestionClient, SuggestionError,
};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when the config does not name one.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a Technical Project Manager.
Analyze the user's unstructured design document text.
Extract:
1. Project title (if not provided, create a catchy one)
2. Short technical description
3. Scope: one line naming what is in and out of this phase.
4. Goal: a concise statement of what "Done" looks like.
5. List of features.

Return ONLY JSON in this format:
{
  "title": "string",
  "description": "string",
  "scope": "string",
  "goal": "string",
  "features": [ { "name": "string", "notes": "string" } ]
}"#;

const EXPANSION_SYSTEM_PROMPT: &str = r#"You are a Senior Developer.
Given a feature name and current project context, break this feature down into 3-5 specific, smaller sub-tasks.
If context files are provided, analyze their code/content to suggest specific implementation steps or refactors.
Return ONLY JSON: { "subtasks": [ { "name": "string", "notes": "string" } ] }"#;

/// Client for the Gemini text-generation endpoint.
pub struct GeminiClient {
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client with an explicit key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }

    /// Issue one generateContent exchange and return the response text.
    fn generate(
        &self,
        system_prompt: &str,
        user_content: &str,
        json_response: bool,
    ) -> Result<String, SuggestionError> {
        let url = format!(
            "{}/models/{}:generateContent",
            GEMINI_API_BASE, self.model
        );

        let mut generation_config = serde_json::Map::new();
        if json_response {
            generation_config.insert(
                "responseMimeType".to_string(),
                serde_json::Value::String("application/json".to_string()),
            );
        }

        let body = serde_json::json!({
            "systemInstruction": { "parts": [ { "text": system_prompt } ] },
            "contents": [ { "parts": [ { "text": user_content } ] } ],
            "generationConfig": generation_config,
        });

        let response = ureq::post(&url)
            .set("x-goog-api-key", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(body);

        match response {
            Ok(resp) => {
                let parsed: GenerateContentResponse = resp
                    .into_json()
                    .map_err(|e| SuggestionError::Parse(e.to_string()))?;
                parsed.text().ok_or(SuggestionError::EmptyResponse)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(SuggestionError::Http(format!("HTTP {}: {}", code, body)))
            }
            Err(e) => Err(SuggestionError::Http(e.to_string())),
        }
    }
}

impl SuggestionClient for GeminiClient {
    fn analyze_requirements(
        &self,
        design_doc: &str,
        title_hint: &str,
    ) -> Result<ProjectAnalysis, SuggestionError> {
        let hint = if title_hint.is_empty() { "None" } else { title_hint };
        let user_context = format!(
            "User Title Preference: {}. \n\n Design Document: {}",
            hint, design_doc
        );

        let text = self.generate(ANALYSIS_SYSTEM_PROMPT, &user_context, true)?;
        serde_json::from_str(&clean_json(&text)).map_err(|e| SuggestionError::Parse(e.to_string()))
    }

    fn expand_feature(
        &self,
        feature: &Feature,
        project_context: &str,
    ) -> Result<FeatureExpansion, SuggestionError> {
        let context = expansion_context(feature, project_context);
        let text = self.generate(EXPANSION_SYSTEM_PROMPT, &context, true)?;
        serde_json::from_str(&clean_json(&text)).map_err(|e| SuggestionError::Parse(e.to_string()))
    }

    fn generate_status_report(&self, project: &Project) -> Result<String, SuggestionError> {
        let system_prompt = format!(
            "You are a Project Manager. Generate a concise status report for this project.\n\
             Compare current status against the Project Goal: \"{}\".\n\
             Summarize progress based on the state of features (CREATING, FIX/POLISH, STABLE).\n\
             Format output as a clean string suitable for a clipboard copy.",
            project.goal
        );
        let user_content = format!("Generate report for: {}", report_payload(project));
        let text = self.generate(&system_prompt, &user_content, false)?;
        Ok(clean_json(&text))
    }
}

/// Response from the generateContent endpoint (only the fields we use).
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` if there is none.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
