use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_project(root: &Path) {
    write_file(&root.join("main.rs"), "fn main() {}\n");
    write_file(&root.join("notes.md"), "# Notes\n");
    write_file(&root.join("logo.svg"), "<svg></svg>\n");
    write_file(&root.join(".alloyignore"), ".svg\n");
}

#[test]
fn cli_consolidate_writes_document_to_stdout() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args(["consolidate", dir.path().to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("#### main\\.rs\n"));
    assert!(stdout.contains("#### notes\\.md\n"));
    assert!(!stdout.contains("logo"));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("2 files"));
}

#[test]
fn cli_consolidate_json_with_extensions_and_output_file() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    let out_dir = tempdir().unwrap();
    let out_file = out_dir.path().join("codebase.md");

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args([
            "consolidate",
            dir.path().to_str().unwrap(),
            "--extensions",
            "svg,md",
            "--output",
            out_file.to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["file_count"], 2);
    assert!(v["token_count"].as_u64().unwrap() > 0);
    assert!(v.get("document").is_none());

    let written = fs::read_to_string(&out_file).unwrap();
    assert!(written.contains("#### logo\\.svg\n"));
    assert!(written.contains("#### notes\\.md\n"));
    assert!(!written.contains("main"));
}

#[test]
fn cli_files_reports_decisions() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args(["files", dir.path().to_str().unwrap(), "-x", "*.md", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let files = v["files"].as_array().unwrap();

    let included: Vec<&str> = files
        .iter()
        .filter(|f| f["included"].as_bool().unwrap())
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(included, vec!["main.rs"]);
    assert_eq!(files.len(), 3);
}

#[test]
fn cli_missing_root_fails_with_json_error() {
    let dir = tempdir().unwrap();
    let bad_path = dir.path().join("does-not-exist-\"quoted\"");

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args(["consolidate", bad_path.to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(3));

    let stderr = String::from_utf8(output.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert!(v["error"].as_str().unwrap().contains("root path not found"));
}

#[cfg(unix)]
#[test]
fn cli_json_skipped_lists_walk_errors() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    std::os::unix::fs::symlink(dir.path().join("gone.rs"), dir.path().join("dangling.rs")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args([
            "consolidate",
            dir.path().to_str().unwrap(),
            "--follow-symlinks",
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["file_count"], 2);
    let skipped = v["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0]["path"].as_str().unwrap().ends_with("dangling.rs"));
}

#[test]
fn cli_file_as_root_is_not_a_directory() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_alloy"))
        .args(["consolidate", dir.path().join("main.rs").to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("not a directory"));
}
