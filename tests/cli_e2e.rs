//! End-to-end CLI tests for the tweetgrab binary.
//!
//! These never reach the network: every run either exits at argument
//! parsing or fails fast on a missing credentials file in an empty
//! temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;

fn tweetgrab() -> Command {
    Command::cargo_bin("tweetgrab").unwrap()
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    tweetgrab()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Collect tweets matching a search query"))
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--mode"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    tweetgrab()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tweetgrab"));
}

/// Test that a missing query argument causes non-zero exit.
#[test]
fn test_binary_missing_query_returns_error() {
    tweetgrab()
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUERY"));
}

/// Test that an invalid mode value causes non-zero exit.
#[test]
fn test_binary_invalid_mode_returns_error() {
    tweetgrab()
        .args(["rustlang", "--mode", "newest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("newest"));
}

/// Test that a zero count is rejected at parse time.
#[test]
fn test_binary_zero_count_returns_error() {
    tweetgrab()
        .args(["rustlang", "-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    tweetgrab()
        .args(["rustlang", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that an inverted delay range fails before any network activity.
#[test]
fn test_binary_inverted_delay_range_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    tweetgrab()
        .current_dir(dir.path())
        .args(["rustlang", "--min-delay", "10", "--max-delay", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delay"));
}

/// Test that a run with neither cookies nor a config file fails fast
/// with a message naming the config path.
#[test]
fn test_binary_without_cookies_or_config_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    tweetgrab()
        .current_dir(dir.path())
        .arg("rustlang")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

/// Test that a malformed cookies file fails fast with the cookies path.
#[test]
fn test_binary_malformed_cookies_file_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cookies.json"), "not json").unwrap();
    tweetgrab()
        .current_dir(dir.path())
        .arg("rustlang")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cookies.json"));
}
