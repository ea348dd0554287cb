//! CLI surface tests. Only paths that never reach the remote synthesizer are
//! exercised: argument validation, malformed input, and silence-only runs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn subvox() -> Command {
    Command::cargo_bin("subvox").unwrap()
}

#[test]
fn missing_input_file_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    subvox()
        .arg(dir.path().join("nope.srt"))
        .arg(dir.path().join("out.wav"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn malformed_subtitle_aborts_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.srt");
    fs::write(&input, "1\nthis line should be timestamps\nHello\n").unwrap();
    let output = dir.path().join("out.wav");

    subvox()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed cue"));

    assert!(!output.exists());
}

#[test]
fn end_before_start_is_reported_with_the_cue_index() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("backwards.srt");
    fs::write(
        &input,
        "7\n00:00:10,000 --> 00:00:05,000\nBackwards\n",
    )
    .unwrap();

    subvox()
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cue block 7"));
}

#[test]
fn silence_only_subtitles_convert_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quiet.srt");
    // Two blocks with no text lines: explicit silence requests.
    fs::write(
        &input,
        "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\n\n",
    )
    .unwrap();
    let output = dir.path().join("quiet.wav");

    subvox()
        .arg(&input)
        .arg(&output)
        .arg("--sample-rate")
        .arg("8000")
        .assert()
        .success();

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().sample_rate, 8_000);
    // gap(0..1) + silence(1..2) + gap(2..3) + silence(3..4)
    assert_eq!(reader.len(), 4 * 8_000);

    let history = fs::read_to_string(dir.path().join("quiet.csv")).unwrap();
    assert_eq!(history.lines().count(), 5);
    assert!(history.lines().skip(1).all(|l| l.ends_with("<silence>")));
}

#[test]
fn save_clips_on_silence_only_run_writes_no_clip_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quiet.srt");
    fs::write(&input, "1\n00:00:00,000 --> 00:00:01,000\n\n").unwrap();
    let output = dir.path().join("quiet.wav");

    subvox()
        .arg(&input)
        .arg(&output)
        .arg("--save-clips")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 0 individual clips"));

    let clip_files = fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .contains("_clip_")
        })
        .count();
    assert_eq!(clip_files, 0);
}

#[test]
fn empty_subtitle_file_produces_empty_track() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.srt");
    fs::write(&input, "").unwrap();
    let output = dir.path().join("empty.wav");

    subvox().arg(&input).arg(&output).assert().success();

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.len(), 0);
}

#[test]
fn unknown_format_tag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.srt");
    fs::write(&input, "").unwrap();

    subvox()
        .arg(&input)
        .arg(dir.path().join("out.mp3"))
        .arg("--format")
        .arg("mp3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn profile_sources_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.srt");
    fs::write(&input, "").unwrap();

    subvox()
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .arg("--profile-json")
        .arg("{}")
        .arg("--profile-file")
        .arg("profile.json")
        .assert()
        .failure();
}

#[test]
fn invalid_profile_json_is_a_clean_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.srt");
    fs::write(&input, "").unwrap();

    subvox()
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .arg("--profile-json")
        .arg("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile"));
}
