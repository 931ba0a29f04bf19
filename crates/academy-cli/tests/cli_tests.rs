//! CLI integration tests using assert_cmd.
//!
//! Network-touching commands run against an unreachable server on purpose:
//! local actions must succeed offline and sync later.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn academy() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("academy").unwrap()
}

const OFFLINE_CONFIG: &str = r#"
data_dir = "./academy-data"
curriculum = "curriculum.toml"

[server]
base_url = "http://127.0.0.1:9"
token = "test-token"
timeout_secs = 1

[session]
user_id = "u1"
email = "u1@example.com"
"#;

/// `academy init` workspace with the server pointed at a closed port.
fn init_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    academy().current_dir(dir.path()).arg("init").assert().success();
    std::fs::write(dir.path().join("academy.toml"), OFFLINE_CONFIG).unwrap();
    dir
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    academy()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created academy.toml"))
        .stdout(predicate::str::contains("Created academy-data/curriculum.toml"));

    assert!(dir.path().join("academy.toml").exists());
    assert!(dir.path().join("academy-data/curriculum.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    academy().current_dir(dir.path()).arg("init").assert().success();
    academy()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("academy.toml already exists"));
}

#[test]
fn validate_reference_curriculum() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Niveau 1 (8 chapters, 30 subjects)"))
        .stdout(predicate::str::contains("Curriculum valid (30 subjects)."));
}

#[test]
fn validate_missing_file() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--curriculum")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn status_is_fully_local() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Niveau 1 — 0%"))
        .stdout(predicate::str::contains("locked"));
}

#[test]
fn watch_and_pass_a_subject_offline() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .args(["watch", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked as watched"));

    academy()
        .current_dir(dir.path())
        .args([
            "quiz", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine",
            "--score", "95",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Passed"));

    academy()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1/5"));
}

#[test]
fn quiz_requires_watching_the_lesson_first() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .args([
            "quiz", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine",
            "--score", "95",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be watched"));
}

#[test]
fn quiz_attempts_exhaust_after_two_failures() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .args(["watch", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine"])
        .assert()
        .success();

    for score in ["60", "70"] {
        academy()
            .current_dir(dir.path())
            .args([
                "quiz", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine",
                "--score", score,
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Not passed"));
    }

    academy()
        .current_dir(dir.path())
        .args([
            "quiz", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine",
            "--score", "99",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("attempt limit reached"));
}

#[test]
fn quiz_rejects_out_of_range_scores() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .args([
            "quiz", "--level", "Niveau 1", "--chapter", "1", "--subject", "vitamine",
            "--score", "150",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn locked_chapter_rejects_actions() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .args(["watch", "--level", "Niveau 1", "--chapter", "3", "--subject", "bcaa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn sync_degrades_gracefully_offline() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 merged from server, 0 backfilled"));
}

#[test]
fn certificates_degrade_gracefully_offline() {
    let dir = init_workspace();

    academy()
        .current_dir(dir.path())
        .arg("certificates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Certificates unavailable"));
}
