// ABOUTME: Integration tests for the fieldscope CLI binary.
// ABOUTME: Tests file and stdin input, custom mappings and options, text output, and failure exits.

use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::TempDir;

const MOVIE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Inception</title></head>
<body>
<h1 class="entry-title">Inception</h1>
<p>Director: Christopher Nolan</p>
<a href="/movies/tenet">Tenet</a>
</body>
</html>"#;

fn fieldscope_cmd() -> Command {
    Command::cargo_bin("fieldscope").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn extracts_fields_from_file_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_file(&temp_dir, "movie.html", MOVIE_HTML);

    let output = fieldscope_cmd()
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/movies/inception")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fields"]["title"], "Inception");
    assert_eq!(json["fields"]["director"], "Christopher Nolan");
    assert_eq!(json["links"][0], "https://example.com/movies/tenet");
}

#[test]
fn reads_html_from_stdin_in_text_format() {
    fieldscope_cmd()
        .arg("-")
        .arg("--url")
        .arg("https://example.com/movies/inception")
        .arg("--format")
        .arg("text")
        .write_stdin(MOVIE_HTML)
        .assert()
        .success()
        .stdout(predicate::str::contains("director  Christopher Nolan"))
        .stdout(predicate::str::contains("- https://example.com/movies/tenet"));
}

#[test]
fn custom_mapping_and_options_are_applied() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_file(
        &temp_dir,
        "song.html",
        "<html><body><div class='meta'>Singer: Nina Simone</div><p>Artist: Ignored</p></body></html>",
    );
    let mapping_path = write_file(
        &temp_dir,
        "mapping.json",
        r#"{"content_types": {"songs": {"artist": {"labels": ["Artist", "Singer"]}}}}"#,
    );
    let options_path = write_file(
        &temp_dir,
        "options.json",
        r#"{"paragraph_selector": "div.meta"}"#,
    );

    fieldscope_cmd()
        .arg(&html_path)
        .arg("--url")
        .arg("https://music.example.com/track/1")
        .arg("--mapping")
        .arg(&mapping_path)
        .arg("--content-type")
        .arg("songs")
        .arg("--options")
        .arg(&options_path)
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""artist":"Nina Simone""#));
}

#[test]
fn unknown_content_type_fails() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_file(&temp_dir, "movie.html", MOVIE_HTML);

    fieldscope_cmd()
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/")
        .arg("--content-type")
        .arg("podcasts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("initialization error"));
}

#[test]
fn multiple_files_report_each_document() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_file(&temp_dir, "good.html", MOVIE_HTML);
    let blank = write_file(&temp_dir, "blank.html", "   ");

    let output = fieldscope_cmd()
        .arg(&good)
        .arg(&blank)
        .arg("--url")
        .arg("https://example.com/movies/inception")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_documents"], 2);
    assert_eq!(json["extracted"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["documents"][0]["result"]["fields"]["title"], "Inception");
    assert_eq!(json["documents"][1]["ok"], false);
}

#[test]
fn missing_file_fails() {
    fieldscope_cmd()
        .arg("/nonexistent/page.html")
        .arg("--url")
        .arg("https://example.com/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no document could be extracted"));
}
