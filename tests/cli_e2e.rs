//! End-to-end CLI tests for chatlens.
//!
//! These tests verify the complete CLI workflow by running the actual binary
//! with various arguments and checking the output.
//!
//! # Test Categories
//!
//! - **Basic functionality**: bare transcripts and zip exports
//! - **Output formats**: CSV, JSON, JSONL generation
//! - **Flags**: output and logging flags work correctly
//! - **Error handling**: Proper error messages for bad input
//! - **Edge cases**: unicode, special characters, paths with spaces
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const IOS_CHAT: &str = "[15.01.2024, 10:30:00] Alice: Messages and calls are end-to-end encrypted.
[15.01.2024, 10:30:05] Alice: Hello!
[15.01.2024, 10:31:00] Bob: Hi Alice! see https://example.com/trip
[15.01.2024, 10:32:00] Bob: <attached: 00000001-PHOTO.jpg>
[15.01.2024, 10:33:00] Alice: Alice added Carol
[15.01.2024, 10:34:00] Carol: Привет; \"всем\" 🎉
";

/// Creates a temporary directory with test fixtures.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    fs::write(dir.path().join("_chat.txt"), IOS_CHAT).unwrap();

    let android = "1/15/24, 10:30 AM - Alice: Hello from Android\n\
                   1/15/24, 10:31 AM - Bob: IMG-20240115-WA0001.jpg (file attached)\n\
                   caption here\n";
    fs::write(dir.path().join("android.txt"), android).unwrap();

    fs::write(dir.path().join("notes.txt"), "no chat here\njust text\n").unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();
    fs::write(
        dir.path().join("bad_dates.txt"),
        "[45.13.2024, 10:30] Alice: when?\n[15.01.2024, 10:30:00] Bob: now\n",
    )
    .unwrap();

    write_zip(
        &dir.path().join("export.zip"),
        &[
            ("_chat.txt", IOS_CHAT.as_bytes()),
            ("00000001-PHOTO.jpg", &[0xFF, 0xD8, 0xFF]),
        ],
    );
    write_zip(&dir.path().join("no_chat.zip"), &[("photo.jpg", &[0xFF, 0xD8])]);

    dir
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    use zip::write::SimpleFileOptions;

    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

fn chatlens_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatlens"));
    let mut cmd = Command::from_std(cmd);
    cmd.env_remove("CHATLENS_LOG");
    cmd
}

fn output_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

mod basic_functionality {
    use super::*;

    #[test]
    fn test_ios_transcript() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"))
            .stdout(predicate::str::contains("5 messages from 3 participants"));

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("Alice"));
        assert!(content.contains("Hello!"));
        // encryption notice is discarded
        assert!(!content.contains("end-to-end encrypted"));
    }

    #[test]
    fn test_android_transcript() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("android.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("Hello from Android"));
        assert!(content.contains("IMG-20240115-WA0001.jpg;missing"));
        assert!(content.contains("caption here"));
    }

    #[test]
    fn test_zip_export_resolves_media() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("export.zip");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Attachments:  1 (0 missing"));

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("00000001-PHOTO.jpg;image"));
    }

    #[test]
    fn test_summary_counts() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("System:       1"))
            .stdout(predicate::str::contains("Links:        1"))
            .stdout(predicate::str::contains("1 missing from export"));
    }

    #[test]
    fn test_participants_flag() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--participants",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Participants:"))
            .stdout(predicate::str::contains("Bob (2 messages)"));
    }
}

// ============================================================================
// Output Format Tests
// ============================================================================

mod output_formats {
    use super::*;

    #[test]
    fn test_output_csv_default() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");

        chatlens_cmd()
            .current_dir(fixtures.path())
            .arg(input.to_str().unwrap())
            .assert()
            .success();

        let content = fs::read_to_string(fixtures.path().join("parsed_chat.csv")).unwrap();
        assert!(content.starts_with("Sender;Content;Attachment;Kind;System"));
    }

    #[test]
    fn test_output_json() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.json");

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-f",
                "json",
                "--segments",
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[1]["segments"][1]["url"], "https://example.com/trip");
        assert_eq!(items[2]["attachments"][0]["kind"], "missing");
    }

    #[test]
    fn test_output_jsonl() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.jsonl");

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-f",
                "jsonl",
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 5);
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn test_ndjson_alias() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.ndjson");

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--format",
                "ndjson",
            ])
            .assert()
            .success();

        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 5);
    }

    #[test]
    fn test_default_output_filename_changes_with_format() {
        let fixtures = setup_fixtures();

        chatlens_cmd()
            .current_dir(fixtures.path())
            .args(["_chat.txt", "-f", "jsonl"])
            .assert()
            .success();

        assert!(fixtures.path().join("parsed_chat.jsonl").exists());
    }
}

// ============================================================================
// Flag Tests
// ============================================================================

mod flags {
    use super::*;

    #[test]
    fn test_timestamps_flag() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap(), "-t"])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("Timestamp;"));
        assert!(content.contains("2024-01-15 10:30:05"));
    }

    #[test]
    fn test_no_system_flag() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--no-system",
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(!content.contains("Alice added Carol"));
        assert!(!content.contains("System"));
    }

    #[test]
    fn test_fallback_timestamp_is_reported() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("bad_dates.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 timestamps were not recognized and sort last"))
            .stderr(predicate::str::contains("unrecognized timestamp"));
    }

    #[test]
    fn test_epoch_fallback_sorts_first() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("bad_dates.txt");
        let output = output_path(&fixtures, "out.csv");
        let config = fixtures.path().join("epoch.json");
        fs::write(&config, r#"{"fallback_timestamp": "epoch"}"#).unwrap();

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 timestamps were not recognized and sort first"));

        let content = fs::read_to_string(&output).unwrap();
        let when = content.find("when?").unwrap();
        let now = content.find("now").unwrap();
        assert!(when < now);
    }

    #[test]
    fn test_quiet_hides_warnings() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("bad_dates.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap(), "-q"])
            .assert()
            .success()
            .stderr(predicate::str::contains("unrecognized timestamp").not());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        chatlens_cmd()
            .args(["_chat.txt", "-v", "-q"])
            .assert()
            .failure();
    }

    #[test]
    fn test_config_file() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");
        let config = fixtures.path().join("config.json");
        fs::write(&config, r#"{"discard_phrases": ["hello!"]}"#).unwrap();

        chatlens_cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(!content.contains("Hello!"));
        // replacing the discard phrases brings the encryption notice back
        assert!(content.contains("end-to-end encrypted"));
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_nonexistent_file() {
        chatlens_cmd()
            .arg("nonexistent_file.txt")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn test_no_participants() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("notes.txt");

        chatlens_cmd()
            .current_dir(fixtures.path())
            .arg(input.to_str().unwrap())
            .assert()
            .failure()
            .stderr(predicate::str::contains("No participants found"))
            .stderr(predicate::str::contains("2 lines of content"));
    }

    #[test]
    fn test_empty_transcript_file() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("empty.txt");

        chatlens_cmd()
            .current_dir(fixtures.path())
            .arg(input.to_str().unwrap())
            .assert()
            .failure()
            .stderr(predicate::str::contains("nothing recognizable"));
    }

    #[test]
    fn test_zip_without_transcript() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("no_chat.zip");

        chatlens_cmd()
            .current_dir(fixtures.path())
            .arg(input.to_str().unwrap())
            .assert()
            .failure()
            .stderr(predicate::str::contains("No chat transcript found"));
    }

    #[test]
    fn test_invalid_config_pattern() {
        let fixtures = setup_fixtures();
        let config = fixtures.path().join("config.json");
        fs::write(&config, r#"{"system_patterns": ["^(broken"]}"#).unwrap();

        chatlens_cmd()
            .current_dir(fixtures.path())
            .args(["_chat.txt", "--config", config.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid system message pattern"));
    }

    #[test]
    fn test_missing_input_argument() {
        chatlens_cmd().assert().failure();
    }

    #[test]
    fn test_invalid_format_option() {
        chatlens_cmd()
            .args(["_chat.txt", "-f", "xml"])
            .assert()
            .failure();
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

mod edge_cases {
    use super::*;

    #[test]
    fn test_unicode_and_csv_escaping() {
        let fixtures = setup_fixtures();
        let input = fixtures.path().join("_chat.txt");
        let output = output_path(&fixtures, "out.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(&output)
            .unwrap();
        let contents: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[1].to_string())
            .collect();
        assert!(contents.contains(&"Привет; \"всем\" 🎉".to_string()));
    }

    #[test]
    fn test_path_with_spaces() {
        let fixtures = setup_fixtures();
        let dir_with_space = fixtures.path().join("path with spaces");
        fs::create_dir_all(&dir_with_space).unwrap();

        let input = dir_with_space.join("WhatsApp Chat - Trip.zip");
        fs::copy(fixtures.path().join("export.zip"), &input).unwrap();

        let output = dir_with_space.join("output.csv");

        chatlens_cmd()
            .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .assert()
            .success();

        assert!(output.exists());
    }
}
