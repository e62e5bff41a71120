//! Trellis CLI - track project feature trees through their lifecycle.

use clap::Parser;
use serde_json::json;
use std::process;
use std::time::Instant;

use trellis::ai::{GeminiClient, SuggestionError};
use trellis::cli::{Cli, Commands, FeatureCommands, ProjectCommands};
use trellis::commands::{self, Output};
use trellis::config::Config;
use trellis::store::{ProjectStore, ProjectUpdate};
use trellis::{action_log, storage, Error, Result};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli.command);
    let duration = start.elapsed().as_millis() as u64;

    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (best-effort; never affects the command result)
    if let Ok(data_dir) = storage::data_dir() {
        action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);
    }

    match result {
        Ok(output) => output.print(human),
        Err(e) => {
            if human {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

fn open_store() -> Result<ProjectStore> {
    let backend = storage::default_backend()?;
    Ok(ProjectStore::open(Box::new(backend)))
}

/// Build the suggestion client from config; fails fast without a key.
fn suggestion_client() -> Result<GeminiClient> {
    let config = Config::load(&storage::data_dir()?);
    let api_key = config
        .resolve_api_key()
        .ok_or(Error::Suggestion(SuggestionError::MissingApiKey))?;
    Ok(GeminiClient::new(api_key, config.resolve_model()))
}

fn run_command(command: Commands) -> Result<Output> {
    let mut store = open_store()?;

    match command {
        Commands::Project { command } => match command {
            ProjectCommands::Create {
                title,
                repo,
                scope,
                description,
            } => commands::project_create(&mut store, title, repo, scope, description),
            ProjectCommands::Analyze { notes, title, repo } => {
                let client = suggestion_client()?;
                commands::project_analyze(&mut store, &client, &notes, title, repo)
            }
            ProjectCommands::List => commands::project_list(&store),
            ProjectCommands::Show { id } => commands::project_show(&store, &id),
            ProjectCommands::Set {
                id,
                title,
                repo,
                description,
                scope,
                goal,
            } => commands::project_set(
                &mut store,
                &id,
                ProjectUpdate {
                    title,
                    repo_url: repo,
                    description,
                    scope,
                    goal,
                },
            ),
            ProjectCommands::Delete { id, force } => {
                commands::project_delete(&mut store, &id, force)
            }
        },
        Commands::Feature { command } => match command {
            FeatureCommands::Add {
                project,
                name,
                parent,
                notes,
            } => commands::feature_add(&mut store, &project, name, parent, notes),
            FeatureCommands::Show { project, id } => commands::feature_show(&store, &project, &id),
            FeatureCommands::Set {
                project,
                id,
                name,
                notes,
                state,
            } => commands::feature_set(&mut store, &project, &id, name, notes, state),
            FeatureCommands::State { project, id, state } => {
                commands::feature_state(&mut store, &project, &id, &state)
            }
            FeatureCommands::Delete { project, id, force } => {
                commands::feature_delete(&mut store, &project, &id, force)
            }
            FeatureCommands::Move { project, from, to } => {
                commands::feature_move(&mut store, &project, from, to)
            }
            FeatureCommands::Toggle { project, id } => {
                commands::feature_toggle(&mut store, &project, &id)
            }
            FeatureCommands::Attach {
                project,
                id,
                file,
                file_type,
            } => commands::feature_attach(&mut store, &project, &id, &file, file_type),
            FeatureCommands::Detach {
                project,
                id,
                file_id,
            } => commands::feature_detach(&mut store, &project, &id, &file_id),
            FeatureCommands::Expand { project, id } => {
                let client = suggestion_client()?;
                commands::feature_expand(&mut store, &client, &project, &id)
            }
        },
        Commands::Stats { project } => commands::stats(&store, &project),
        Commands::Report { project } => {
            let client = suggestion_client()?;
            commands::report(&store, &client, &project)
        }
        Commands::Export { file } => commands::export(&store, file.as_deref()),
        Commands::Import { file } => commands::import(&mut store, &file),
    }
}

/// Name and loggable arguments for a command (file contents stay out).
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Project { command } => match command {
            ProjectCommands::Create { title, .. } => {
                ("project create".to_string(), json!({ "title": title }))
            }
            ProjectCommands::Analyze { notes, .. } => (
                "project analyze".to_string(),
                json!({ "notes": notes.display().to_string() }),
            ),
            ProjectCommands::List => ("project list".to_string(), json!({})),
            ProjectCommands::Show { id } => ("project show".to_string(), json!({ "id": id })),
            ProjectCommands::Set { id, .. } => ("project set".to_string(), json!({ "id": id })),
            ProjectCommands::Delete { id, force } => (
                "project delete".to_string(),
                json!({ "id": id, "force": force }),
            ),
        },
        Commands::Feature { command } => match command {
            FeatureCommands::Add { project, name, parent, .. } => (
                "feature add".to_string(),
                json!({ "project": project, "name": name, "parent": parent }),
            ),
            FeatureCommands::Show { project, id } => (
                "feature show".to_string(),
                json!({ "project": project, "id": id }),
            ),
            FeatureCommands::Set { project, id, .. } => (
                "feature set".to_string(),
                json!({ "project": project, "id": id }),
            ),
            FeatureCommands::State { project, id, state } => (
                "feature state".to_string(),
                json!({ "project": project, "id": id, "state": state }),
            ),
            FeatureCommands::Delete { project, id, force } => (
                "feature delete".to_string(),
                json!({ "project": project, "id": id, "force": force }),
            ),
            FeatureCommands::Move { project, from, to } => (
                "feature move".to_string(),
                json!({ "project": project, "from": from, "to": to }),
            ),
            FeatureCommands::Toggle { project, id } => (
                "feature toggle".to_string(),
                json!({ "project": project, "id": id }),
            ),
            FeatureCommands::Attach { project, id, file, .. } => (
                "feature attach".to_string(),
                json!({ "project": project, "id": id, "file": file.display().to_string() }),
            ),
            FeatureCommands::Detach { project, id, file_id } => (
                "feature detach".to_string(),
                json!({ "project": project, "id": id, "fileId": file_id }),
            ),
            FeatureCommands::Expand { project, id } => (
                "feature expand".to_string(),
                json!({ "project": project, "id": id }),
            ),
        },
        Commands::Stats { project } => ("stats".to_string(), json!({ "project": project })),
        Commands::Report { project } => ("report".to_string(), json!({ "project": project })),
        Commands::Export { file } => (
            "export".to_string(),
            json!({ "file": file.as_ref().map(|f| f.display().to_string()) }),
        ),
        Commands::Import { file } => (
            "import".to_string(),
            json!({ "file": file.display().to_string() }),
        ),
    }
}
