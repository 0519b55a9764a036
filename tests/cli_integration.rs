//! Integration tests for the `tstream` CLI.
//!
//! Each test works in a temp directory with its own config file, runs
//! `tstream` as a subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the path to the built `tstream` binary.
fn tstream_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tstream");
    path
}

/// Run `tstream` against the temp dir's config and return the raw output.
fn run_tstream(tmp: &Path, args: &[&str]) -> Output {
    let config = tmp.join("config.toml");
    Command::new(tstream_bin())
        .arg("--config")
        .arg(&config)
        .args(args)
        .current_dir(tmp)
        .output()
        .expect("failed to run tstream")
}

/// Run `tstream` and return stdout, panicking on failure.
fn run_tstream_ok(tmp: &Path, args: &[&str]) -> String {
    let output = run_tstream(tmp, args);
    if !output.status.success() {
        panic!(
            "tstream {:?} failed:\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8(output.stdout).unwrap()
}

fn journal(tmp: &TempDir) -> PathBuf {
    tmp.path().join("journal.md")
}

fn write_journal(tmp: &TempDir, text: &str) {
    fs::write(journal(tmp), text).unwrap();
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_tagged_document_with_prompt() {
    let tmp = TempDir::new().unwrap();
    let out = run_tstream_ok(tmp.path(), &["init", "journal.md"]);
    assert!(out.starts_with("Initialized thought stream: journal.md (#stream)"));

    let text = fs::read_to_string(journal(&tmp)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "#stream");
    assert_eq!(lines[1], "");
    // `YYYY-MM-DD HH:MM:SS` plus the three-space separator
    assert_eq!(lines[2].len(), 22);
    assert!(lines[2].ends_with("   "));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "keep me\n");

    let output = run_tstream(tmp.path(), &["init", "journal.md"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"));
    assert_eq!(fs::read_to_string(journal(&tmp)).unwrap(), "keep me\n");

    run_tstream_ok(tmp.path(), &["init", "journal.md", "--force", "--tag", "daily"]);
    let text = fs::read_to_string(journal(&tmp)).unwrap();
    assert!(text.starts_with("#daily\n"));
}

#[test]
fn init_rejects_bad_tag() {
    let tmp = TempDir::new().unwrap();
    let output = run_tstream(tmp.path(), &["init", "journal.md", "--tag", "two words"]);
    assert!(!output.status.success());
    assert!(!journal(&tmp).exists());
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[test]
fn add_commits_into_open_prompt() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "#stream\n\n2024-06-01 09:00:00   \n");

    let out = run_tstream_ok(tmp.path(), &["add", "journal.md", "first thought"]);
    assert!(out.starts_with("committed line 3 at "), "got {:?}", out);

    let text = fs::read_to_string(journal(&tmp)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].ends_with("   first thought"));
    assert_eq!(lines[3].len(), 22);
    // Trailing newline survives the round trip
    assert!(text.ends_with('\n'));
}

#[test]
fn add_keeps_older_entries_untouched() {
    let tmp = TempDir::new().unwrap();
    write_journal(
        &tmp,
        "#stream\n2023-01-01 10:00:00   old\n2023-01-01 10:05:00   \n",
    );

    run_tstream_ok(tmp.path(), &["add", "journal.md", "one"]);
    run_tstream_ok(tmp.path(), &["add", "journal.md", "two"]);

    let text = fs::read_to_string(journal(&tmp)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "2023-01-01 10:00:00   old");
    assert!(lines[2].ends_with("   one"));
    assert!(lines[3].ends_with("   two"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn add_requires_the_tag() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "just notes\n");

    let output = run_tstream(tmp.path(), &["add", "journal.md", "hi"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a thought stream"), "got {:?}", stderr);
    assert_eq!(fs::read_to_string(journal(&tmp)).unwrap(), "just notes\n");
}

#[test]
fn add_missing_document_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_tstream(tmp.path(), &["add", "nope.md", "hi"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such document"));
}

#[test]
fn add_json_reports_commit() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "#stream\n2024-06-01 09:00:00   \n");

    let out = run_tstream_ok(tmp.path(), &["add", "journal.md", "idea", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["committed_line"], 1);
    assert_eq!(value["timestamp"].as_str().unwrap().len(), 19);
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

const HISTORY: &str = concat!(
    "#stream\n",
    "\n",
    "2024-05-30 08:00:00   older\n",
    "not a thought\n",
    "2024-06-01 09:00:00   newer\n",
    "2024-06-01 09:05:00   \n",
);

#[test]
fn list_prints_committed_thoughts() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, HISTORY);

    let out = run_tstream_ok(tmp.path(), &["list", "journal.md"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("2024-05-30 08:00:00  older"));
    assert!(lines[1].contains("2024-06-01 09:00:00  newer"));
}

#[test]
fn list_since_filters_by_date() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, HISTORY);

    let out = run_tstream_ok(tmp.path(), &["list", "journal.md", "--since", "2024-06-01"]);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("newer"));

    let output = run_tstream(tmp.path(), &["list", "journal.md", "--since", "June"]);
    assert!(!output.status.success());
}

#[test]
fn list_json_uses_one_based_lines() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, HISTORY);

    let out = run_tstream_ok(tmp.path(), &["list", "journal.md", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["line"], 3);
    assert_eq!(items[0]["content"], "older");
    assert_eq!(items[1]["valid"], true);
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_stream() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, HISTORY);

    let out = run_tstream_ok(tmp.path(), &["check", "journal.md"]);
    assert!(out.trim_end().ends_with("✓ stream is valid (3 entries)"), "got {:?}", out);
}

#[test]
fn check_reports_malformed_timestamp_and_fails() {
    let tmp = TempDir::new().unwrap();
    write_journal(
        &tmp,
        "#stream\n2024-06-01 09:00:00   fine\nyesterday   broken\n2024-06-01 09:05:00   \n",
    );

    let output = run_tstream(tmp.path(), &["check", "journal.md"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("line 3: timestamp 'yesterday' does not parse"));
    assert!(stdout.contains("✗ stream has errors"));

    // The finding also lands in the diagnostics log
    let log = fs::read_to_string(tmp.path().join("diagnostics.log")).unwrap();
    assert!(log.contains("timestamp did not parse"));
}

#[test]
fn check_json_output() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "untagged\n2024-06-01 09:00:00   \n");

    let out = run_tstream_ok(tmp.path(), &["check", "journal.md", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["entries"], 1);
    assert_eq!(value["warnings"][0]["type"], "missing_tag");
}

// ---------------------------------------------------------------------------
// argument handling
// ---------------------------------------------------------------------------

#[test]
fn config_before_subcommand_is_honored() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[stream]\ntag = \"daily\"\n").unwrap();

    // `run_tstream` puts `--config` ahead of the subcommand
    run_tstream_ok(tmp.path(), &["init", "journal.md"]);
    let text = fs::read_to_string(journal(&tmp)).unwrap();
    assert!(text.starts_with("#daily\n"));

    let out = run_tstream_ok(tmp.path(), &["add", "journal.md", "again"]);
    assert!(out.starts_with("committed line 3 at "), "got {:?}", out);
}

#[test]
fn file_with_subcommand_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, HISTORY);

    let output = run_tstream(tmp.path(), &["journal.md", "list", "journal.md"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tstream open FILE"), "got {:?}", stderr);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_path_points_at_override() {
    let tmp = TempDir::new().unwrap();
    let out = run_tstream_ok(tmp.path(), &["config", "path"]);
    assert_eq!(out.trim(), tmp.path().join("config.toml").display().to_string());
}

#[test]
fn config_set_persists_and_takes_effect() {
    let tmp = TempDir::new().unwrap();
    let out = run_tstream_ok(tmp.path(), &["config", "set", "stream.tag", "daily"]);
    assert_eq!(out.trim(), "stream.tag = daily");

    let config = fs::read_to_string(tmp.path().join("config.toml")).unwrap();
    assert!(config.contains("[stream]"));
    assert!(config.contains("daily"));

    run_tstream_ok(tmp.path(), &["init", "journal.md"]);
    let text = fs::read_to_string(journal(&tmp)).unwrap();
    assert!(text.starts_with("#daily\n"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let tmp = TempDir::new().unwrap();
    let output = run_tstream(tmp.path(), &["config", "set", "nope.key", "1"]);
    assert!(!output.status.success());
    assert!(!tmp.path().join("config.toml").exists());
}

// ---------------------------------------------------------------------------
// diagnostics
// ---------------------------------------------------------------------------

#[test]
fn diagnostics_path_sits_next_to_config() {
    let tmp = TempDir::new().unwrap();
    let out = run_tstream_ok(tmp.path(), &["diagnostics", "path"]);
    assert_eq!(
        out.trim(),
        tmp.path().join("diagnostics.log").display().to_string()
    );
}

#[test]
fn diagnostics_empty_log() {
    let tmp = TempDir::new().unwrap();
    let out = run_tstream_ok(tmp.path(), &["diagnostics"]);
    assert_eq!(out.trim(), "no diagnostics");
}

#[test]
fn diagnostics_prune_all_clears_log() {
    let tmp = TempDir::new().unwrap();
    write_journal(&tmp, "#stream\nbad   stamp\n");
    // A malformed prefix during add is logged as a parse diagnostic
    run_tstream_ok(tmp.path(), &["add", "journal.md", "x"]);

    let out = run_tstream_ok(tmp.path(), &["diagnostics"]);
    assert!(out.contains("timestamp did not parse"), "got {:?}", out);

    run_tstream_ok(tmp.path(), &["diagnostics", "prune", "--all"]);
    let out = run_tstream_ok(tmp.path(), &["diagnostics"]);
    assert_eq!(out.trim(), "no diagnostics");
}
