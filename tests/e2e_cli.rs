//! CLI end-to-end tests
//!
//! Tests for the flvmend command-line interface.

mod common;

use assert_cmd::prelude::*;
use common::*;
use flvmend_media::amf::Value;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the flvmend binary
fn flvmend_cmd() -> Command {
    Command::cargo_bin("flvmend").unwrap()
}

fn fixture_tags() -> Vec<flvmend_media::flv::Tag> {
    vec![
        metadata_tag(vec![
            ("width".to_string(), Value::Number(320.0)),
            ("height".to_string(), Value::Number(240.0)),
        ]),
        video_tag(0, true, 64),
        audio_tag(12, 24),
        video_tag(33, false, 48),
        video_tag(1500, true, 64),
    ]
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = flvmend_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = flvmend_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flvmend"))
        .stdout(predicate::str::contains("update-keyframes"))
        .stdout(predicate::str::contains("split"));
}

#[test]
fn test_update_keyframes_requires_output() {
    let mut cmd = flvmend_cmd();
    cmd.args(["update-keyframes", "--input", "in.flv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_update_keyframes_missing_input_reports_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.flv");
    let output = dir.path().join("out.flv");

    let mut cmd = flvmend_cmd();
    cmd.arg("update-keyframes")
        .arg("--input")
        .arg(&missing)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.flv"));
}

#[test]
fn test_update_keyframes_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.flv");
    let output = dir.path().join("out.flv");
    write_flv(&input, &fixture_tags());

    let mut cmd = flvmend_cmd();
    cmd.arg("update-keyframes")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let tags = read_tags(&output);
    let document = decode_metadata(&tags[0]);
    assert_eq!(keyframe_times(&document), vec![0.0, 1.5]);
    assert_eq!(file_positions(&document).len(), 2);
}

#[test]
fn test_split_requires_a_destination() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.flv");
    write_flv(&input, &fixture_tags());

    let mut cmd = flvmend_cmd();
    cmd.arg("split")
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no output configured"));
}

#[test]
fn test_split_audio_only() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.flv");
    let audio_out = dir.path().join("audio.flv");
    write_flv(&input, &fixture_tags());

    let mut cmd = flvmend_cmd();
    cmd.arg("split")
        .arg("--input")
        .arg(&input)
        .arg("--out-audio")
        .arg(&audio_out)
        .assert()
        .success();

    let tags = read_tags(&audio_out);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].dts(), 12);
}

#[test]
fn test_update_and_split_are_separate_subcommands() {
    // The two modes cannot be combined in one invocation.
    let mut cmd = flvmend_cmd();
    cmd.args([
        "update-keyframes",
        "--input",
        "in.flv",
        "--output",
        "out.flv",
        "--out-audio",
        "a.flv",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--out-audio"));
}

#[test]
fn test_inspect_human_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.flv");
    write_flv(&input, &fixture_tags());

    let mut cmd = flvmend_cmd();
    cmd.arg("inspect")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Keyframes: 2"))
        .stdout(predicate::str::contains("320x240"));
}

#[test]
fn test_inspect_json_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.flv");
    write_flv(&input, &fixture_tags());

    let output = flvmend_cmd()
        .arg("inspect")
        .arg("--input")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["stats"]["has_video"], serde_json::json!(true));
    assert_eq!(doc["derived"]["duration_secs"], serde_json::json!(1.5));
    assert_eq!(doc["keyframes"].as_array().unwrap().len(), 2);
}
