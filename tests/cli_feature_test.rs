//! Integration tests for feature tree operations via CLI.
//!
//! Covers add/show/set/state/delete/move/toggle/attach/detach plus the
//! backlog-sink policy and cascade-delete counting.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tl_in(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tl"));
    cmd.env("TL_DATA_DIR", dir.path());
    cmd
}

fn json_stdout(output: std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn create_project(dir: &TempDir) -> String {
    let output = tl_in(dir)
        .args(["project", "create", "Fixture"])
        .output()
        .unwrap();
    json_stdout(output)["id"].as_str().unwrap().to_string()
}

fn add_feature(dir: &TempDir, project: &str, name: &str) -> String {
    let output = tl_in(dir)
        .args(["feature", "add", project, name])
        .output()
        .unwrap();
    json_stdout(output)["id"].as_str().unwrap().to_string()
}

fn top_level_names(dir: &TempDir, project: &str) -> Vec<String> {
    let output = tl_in(dir)
        .args(["project", "show", project])
        .output()
        .unwrap();
    json_stdout(output)["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}

// === Add Tests ===

#[test]
fn test_feature_add_starts_creating() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);

    tl_in(&temp)
        .args(["feature", "add", &project, "Login", "--notes", "OAuth first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"tlf-"))
        .stdout(predicate::str::contains("\"state\":\"CREATING\""));
}

#[test]
fn test_feature_add_under_parent() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let parent = add_feature(&temp, &project, "Parent");

    tl_in(&temp)
        .args(["feature", "add", &project, "Child", "--parent", &parent])
        .assert()
        .success();

    let output = tl_in(&temp)
        .args(["feature", "show", &project, &parent])
        .output()
        .unwrap();
    let json = json_stdout(output);
    assert_eq!(json["subfeatures"][0]["name"], "Child");
}

#[test]
fn test_feature_add_unknown_parent_fails() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);

    tl_in(&temp)
        .args(["feature", "add", &project, "X", "--parent", "tlf-ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feature not found"));
}

// === State Tests ===

#[test]
fn test_feature_state_transition() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "Login");

    tl_in(&temp)
        .args(["feature", "state", &project, &id, "stable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"state\":\"STABLE\""));
}

#[test]
fn test_feature_state_rejects_unknown() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "Login");

    tl_in(&temp)
        .args(["feature", "state", &project, &id, "shipped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown lifecycle state"));
}

#[test]
fn test_backlog_transition_sinks_to_bottom() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let first = add_feature(&temp, &project, "One");
    add_feature(&temp, &project, "Two");
    add_feature(&temp, &project, "Three");

    tl_in(&temp)
        .args(["feature", "state", &project, &first, "backlog"])
        .assert()
        .success();

    assert_eq!(top_level_names(&temp, &project), vec!["Two", "Three", "One"]);
}

#[test]
fn test_nested_backlog_transition_stays_put() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let parent = add_feature(&temp, &project, "Parent");

    let output = tl_in(&temp)
        .args(["feature", "add", &project, "Child", "--parent", &parent])
        .output()
        .unwrap();
    let child = json_stdout(output)["id"].as_str().unwrap().to_string();

    tl_in(&temp)
        .args(["feature", "state", &project, &child, "backlog"])
        .assert()
        .success();

    let output = tl_in(&temp)
        .args(["feature", "show", &project, &parent])
        .output()
        .unwrap();
    let json = json_stdout(output);
    assert_eq!(json["subfeatures"][0]["state"], "BACKLOG");
}

// === Set Tests ===

#[test]
fn test_feature_set_fields() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "Old name");

    tl_in(&temp)
        .args([
            "feature", "set", &project, &id,
            "--name", "New name",
            "--notes", "edited",
            "--state", "fix",
        ])
        .assert()
        .success();

    let output = tl_in(&temp)
        .args(["feature", "show", &project, &id])
        .output()
        .unwrap();
    let json = json_stdout(output);
    assert_eq!(json["name"], "New name");
    assert_eq!(json["notes"], "edited");
    assert_eq!(json["state"], "FIX/POLISH");
}

// === Move Tests ===

#[test]
fn test_feature_move_array_semantics() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    for name in ["A", "B", "C", "D"] {
        add_feature(&temp, &project, name);
    }

    tl_in(&temp)
        .args(["feature", "move", &project, "0", "2"])
        .assert()
        .success();

    assert_eq!(top_level_names(&temp, &project), vec!["B", "C", "A", "D"]);
}

#[test]
fn test_feature_move_out_of_range_fails() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    add_feature(&temp, &project, "Only");

    tl_in(&temp)
        .args(["feature", "move", &project, "0", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

// === Toggle Tests ===

#[test]
fn test_feature_toggle_flips_flag() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "Collapsible");

    tl_in(&temp)
        .args(["feature", "toggle", &project, &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"expanded\":true"));

    tl_in(&temp)
        .args(["feature", "toggle", &project, &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"expanded\":false"));
}

// === Delete Tests ===

#[test]
fn test_feature_delete_cascades() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let parent = add_feature(&temp, &project, "Parent");
    for name in ["C1", "C2"] {
        tl_in(&temp)
            .args(["feature", "add", &project, name, "--parent", &parent])
            .assert()
            .success();
    }
    add_feature(&temp, &project, "Keeper");

    let output = tl_in(&temp).args(["stats", &project]).output().unwrap();
    assert_eq!(json_stdout(output)["total"], 4);

    tl_in(&temp)
        .args(["feature", "delete", &project, &parent, "--force"])
        .assert()
        .success();

    // Parent plus two subfeatures gone: three nodes removed.
    let output = tl_in(&temp).args(["stats", &project]).output().unwrap();
    assert_eq!(json_stdout(output)["total"], 1);
}

#[test]
fn test_feature_delete_declined_leaves_state() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "Survivor");

    tl_in(&temp)
        .args(["feature", "delete", &project, &id])
        .write_stdin("\n")
        .assert()
        .failure();

    tl_in(&temp)
        .args(["feature", "show", &project, &id])
        .assert()
        .success();
}

// === Context File Tests ===

#[test]
fn test_feature_attach_and_detach() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let id = add_feature(&temp, &project, "With context");

    let file_path = temp.path().join("notes.md");
    std::fs::write(&file_path, "# Implementation notes").unwrap();

    let output = tl_in(&temp)
        .args([
            "feature", "attach", &project, &id,
            file_path.to_str().unwrap(),
            "--type", "text/markdown",
        ])
        .output()
        .unwrap();
    let file_id = json_stdout(output)["fileId"].as_str().unwrap().to_string();

    let output = tl_in(&temp)
        .args(["feature", "show", &project, &id])
        .output()
        .unwrap();
    let json = json_stdout(output);
    assert_eq!(json["contextFiles"][0]["name"], "notes.md");
    assert_eq!(json["contextFiles"][0]["content"], "# Implementation notes");
    assert_eq!(json["contextFiles"][0]["type"], "text/markdown");

    tl_in(&temp)
        .args(["feature", "detach", &project, &id, &file_id])
        .assert()
        .success();

    let output = tl_in(&temp)
        .args(["feature", "show", &project, &id])
        .output()
        .unwrap();
    assert!(json_stdout(output)["contextFiles"].as_array().unwrap().is_empty());
}

// === Stats Tests ===

#[test]
fn test_stats_counts_all_depths() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);
    let f1 = add_feature(&temp, &project, "One");
    let f2 = add_feature(&temp, &project, "Two");
    tl_in(&temp)
        .args(["feature", "add", &project, "Nested", "--parent", &f1])
        .assert()
        .success();
    tl_in(&temp)
        .args(["feature", "state", &project, &f2, "stable"])
        .assert()
        .success();

    let output = tl_in(&temp).args(["stats", &project]).output().unwrap();
    let json = json_stdout(output);
    assert_eq!(json["total"], 3);
    assert_eq!(json["creating"], 2);
    assert_eq!(json["stable"], 1);
    assert_eq!(json["percentComplete"], 33);
}

#[test]
fn test_stats_human_output() {
    let temp = TempDir::new().unwrap();
    let project = create_project(&temp);

    tl_in(&temp)
        .args(["stats", &project, "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 0"))
        .stdout(predicate::str::contains("progress: 0%"));
}
