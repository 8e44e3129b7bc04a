//! E2E reader sessions: scripted `bb read` runs over stdin against both the
//! working file and a published snapshot.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn bb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bb"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd.env("BRANCHBOOK_LOG", "error");
    cmd
}

fn bb_json(dir: &Path, args: &[&str]) -> Value {
    let output = bb_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("bb should not crash");
    assert!(
        output.status.success(),
        "bb {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn id_of(json: &Value, field: &str) -> String {
    json[field].as_str().expect("id field").to_string()
}

struct Fork {
    start: String,
    woods: String,
    home: String,
}

/// Crossroads -> (1: Woods | 2: Home for 5 sats); Woods -> (1: Home).
fn fork_book(dir: &Path) -> Fork {
    let start = id_of(
        &bb_json(dir, &["init", "--title", "Fork"]),
        "start_chapter_id",
    );
    bb_json(dir, &["chapter", "update", &start, "--name", "Crossroads"]);
    let woods = id_of(&bb_json(dir, &["chapter", "add", "--name", "Woods"]), "id");
    let home = id_of(
        &bb_json(dir, &["chapter", "add", "--name", "Home", "--end"]),
        "id",
    );
    bb_json(
        dir,
        &["choice", "add", &start, "--label", "Go left", "--to", &woods],
    );
    bb_json(
        dir,
        &["choice", "add", &start, "--label", "Go right", "--to", &home, "--price", "5"],
    );
    bb_json(
        dir,
        &["choice", "add", &woods, "--label", "Keep walking", "--to", &home],
    );
    Fork { start, woods, home }
}

fn read_json(dir: &Path, extra: &[&str], script: &str) -> Value {
    let output = bb_cmd(dir)
        .arg("read")
        .args(extra)
        .arg("--json")
        .write_stdin(script)
        .output()
        .expect("read should not crash");
    assert!(
        output.status.success(),
        "read failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("read --json should produce valid JSON")
}

fn history(json: &Value) -> Vec<String> {
    json["history"]
        .as_array()
        .expect("history array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}

#[test]
fn scripted_read_reaches_an_ending() {
    let dir = TempDir::new().expect("tempdir");
    let fork = fork_book(dir.path());

    let json = read_json(dir.path(), &[], "1\n1\n");
    assert_eq!(json["title"], "Fork");
    assert_eq!(history(&json), [fork.start.as_str(), fork.woods.as_str(), fork.home.as_str()]);
    assert_eq!(json["current_chapter_id"], fork.home.as_str());
    assert_eq!(json["reached_end"], true);
}

#[test]
fn back_and_labels_drive_the_session() {
    let dir = TempDir::new().expect("tempdir");
    let fork = fork_book(dir.path());

    let json = read_json(dir.path(), &[], "Go left\nback\nGo right\n");
    assert_eq!(
        history(&json),
        [fork.start.as_str(), fork.woods.as_str(), fork.start.as_str(), fork.home.as_str()]
    );
    assert_eq!(json["reached_end"], true);
}

#[test]
fn quit_stops_before_the_ending() {
    let dir = TempDir::new().expect("tempdir");
    let fork = fork_book(dir.path());

    let json = read_json(dir.path(), &[], "1\nquit\n1\n");
    assert_eq!(history(&json), [fork.start.as_str(), fork.woods.as_str()]);
    assert_eq!(json["reached_end"], false);
}

#[test]
fn from_flag_begins_mid_story() {
    let dir = TempDir::new().expect("tempdir");
    let fork = fork_book(dir.path());

    let json = read_json(dir.path(), &["--from", &fork.woods], "1\n");
    assert_eq!(history(&json), [fork.woods.as_str(), fork.home.as_str()]);
}

#[test]
fn from_unknown_chapter_reports_e2001() {
    let dir = TempDir::new().expect("tempdir");
    fork_book(dir.path());

    bb_cmd(dir.path())
        .args(["read", "--from", "ch-nope", "--json"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn text_transcript_shows_chapters_and_prices() {
    let dir = TempDir::new().expect("tempdir");
    fork_book(dir.path());

    bb_cmd(dir.path())
        .args(["read", "--format", "text"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("== Crossroads =="))
        .stdout(predicate::str::contains("2. Go right [5 sats]"))
        .stdout(predicate::str::contains("== Home =="))
        .stdout(predicate::str::contains("The End"));
}

#[test]
fn reader_config_hides_prices() {
    let dir = TempDir::new().expect("tempdir");
    fork_book(dir.path());
    std::fs::write(
        dir.path().join(".branchbook/config.toml"),
        "[reader]\nshow_prices = false\n",
    )
    .expect("write config");

    bb_cmd(dir.path())
        .args(["read", "--format", "text"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2. Go right\n"))
        .stdout(predicate::str::contains("sats").not());
}

#[test]
fn published_snapshot_is_readable_after_edits() {
    let dir = TempDir::new().expect("tempdir");
    let fork = fork_book(dir.path());
    bb_json(dir.path(), &["meta", "--payment-address", "fork@example.org"]);
    bb_json(dir.path(), &["publish"]);

    // Later edits to the working file do not touch the snapshot.
    bb_json(dir.path(), &["chapter", "delete", &fork.woods]);

    let json = read_json(
        dir.path(),
        &["--snapshot", "book.published.json"],
        "1\n1\n",
    );
    assert_eq!(history(&json), [fork.start.as_str(), fork.woods.as_str(), fork.home.as_str()]);
    assert_eq!(json["reached_end"], true);
}

#[test]
fn edited_snapshot_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    fork_book(dir.path());
    bb_json(dir.path(), &["meta", "--payment-address", "fork@example.org"]);
    bb_json(dir.path(), &["publish"]);

    // Make the paid shortcut free by hand, keeping the old fingerprint.
    let path = dir.path().join("book.published.json");
    let raw = std::fs::read_to_string(&path).expect("snapshot written");
    let mut snapshot: Value = serde_json::from_str(&raw).expect("snapshot is JSON");
    for chapter in snapshot["book"]["chapters"]
        .as_object_mut()
        .expect("chapters map")
        .values_mut()
    {
        for choice in chapter["choices"].as_array_mut().expect("choices") {
            if let Some(obj) = choice.as_object_mut() {
                obj.remove("price");
            }
        }
    }
    std::fs::write(&path, snapshot.to_string()).expect("rewrite snapshot");

    bb_cmd(dir.path())
        .args(["read", "--snapshot", "book.published.json", "--json"])
        .write_stdin("1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3003"));
}

#[test]
fn hand_written_snapshot_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("forged.json"),
        r#"{"fingerprint":"blake3:deadbeef","book":{"title":"","chapters":{"x":{"id":"x","name":"Lone","price":500}}}}"#,
    )
    .expect("write forged snapshot");

    bb_cmd(dir.path())
        .args(["read", "--snapshot", "forged.json"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Published snapshot failed verification"));
}
