//! Integration tests for the build and test commands

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use gz_cli::commands::{build_command, test_command, BuildArgs};
use gz_cli::{CliError, GzConfig};
use gz_golang::LoadError;
use pretty_assertions::assert_eq;

fn snapshots() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../gz-golang/tests/snapshots")
}

/// Copies the recorded dumps so a test can edit them.
fn copy_snapshots(temp_dir: &TempDir) -> PathBuf {
    let dir = temp_dir.path().join("snapshots");
    fs::create_dir_all(&dir).unwrap();
    for entry in fs::read_dir(snapshots()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.join(entry.file_name())).unwrap();
    }
    dir
}

fn snapshot_args(temp_dir: &TempDir) -> BuildArgs {
    BuildArgs {
        output: Some(temp_dir.path().join("out")),
        snapshot: Some(snapshots()),
        ..BuildArgs::new(temp_dir.path())
    }
}

#[tokio::test]
async fn test_build_writes_packages_and_runtime() {
    let temp_dir = TempDir::new().unwrap();
    let args = snapshot_args(&temp_dir);
    let out = temp_dir.path().join("out");

    let summary = build_command(args, &GzConfig::default()).await.unwrap();

    assert_eq!(summary.packages, vec!["example.com/hello/util", "example.com/hello"]);
    assert_eq!(summary.output, out);
    for name in ["util.zig", "main.zig", "go.zig", "build.zig", "build.zig.zon"] {
        assert!(out.join(name).is_file(), "{name} should be written");
    }

    let main = fs::read_to_string(out.join("main.zig")).unwrap();
    assert!(main.contains("const go = @import(\"go.zig\");"));
    assert!(main.contains("const util = @import(\"util.zig\");"));
    assert!(main.contains("pub fn main() void {"));
    assert!(main.contains("util.Add(task, "), "{main}");
    assert!(!main.contains("@import(\"os.zig\")"), "runtime packages are not imported as files");

    let util = fs::read_to_string(out.join("util.zig")).unwrap();
    assert!(util.contains("pub fn Add(inherited: ?*go.routine, a: isize, b: isize) isize {"), "{util}");

    assert_eq!(fs::read_to_string(out.join("go.zig")).unwrap(), gz_zig::runtime::GO_ZIG);
}

#[tokio::test]
async fn test_output_defaults_into_source_directory() {
    let temp_dir = TempDir::new().unwrap();
    let args = BuildArgs {
        snapshot: Some(snapshots()),
        ..BuildArgs::new(temp_dir.path())
    };

    let summary = build_command(args, &GzConfig::default()).await.unwrap();
    assert_eq!(summary.output, temp_dir.path().join(".zig"));
    assert!(summary.output.join("main.zig").is_file());
}

#[tokio::test]
async fn test_config_renames_runtime_and_skips_build_files() {
    let temp_dir = TempDir::new().unwrap();
    let args = snapshot_args(&temp_dir);
    let out = temp_dir.path().join("out");
    let mut config = GzConfig::default();
    config.output.runtime_file = "gort.zig".to_string();
    config.output.build_files = false;

    build_command(args, &config).await.unwrap();

    assert!(out.join("gort.zig").is_file());
    assert!(!out.join("go.zig").exists());
    assert!(!out.join("build.zig").exists());
    let main = fs::read_to_string(out.join("main.zig")).unwrap();
    assert!(main.contains("const go = @import(\"gort.zig\");"));
}

#[tokio::test]
async fn test_test_mode_emits_zig_tests() {
    let temp_dir = TempDir::new().unwrap();
    let args = snapshot_args(&temp_dir);
    let out = temp_dir.path().join("out");

    let summary = test_command(args, &GzConfig::default()).await.unwrap();

    assert_eq!(summary.packages, vec!["example.com/hello/util", "example.com/hello"]);
    let main = fs::read_to_string(out.join("main.zig")).unwrap();
    assert!(main.contains("test \"TestAdd\" {"), "{main}");
    assert!(main.contains("try t.verdict();"));
}

#[tokio::test]
async fn test_renamed_import_uses_declared_package_name() {
    let temp_dir = TempDir::new().unwrap();
    let dir = copy_snapshots(&temp_dir);
    let root = dir.join("root.json");
    let renamed = fs::read_to_string(&root)
        .unwrap()
        .replace(
            r#"{ "pos": { "line": 3, "column": 8 }, "path": "example.com/hello/util" }"#,
            r#"{ "pos": { "line": 3, "column": 8 }, "name": "u", "path": "example.com/hello/util" }"#,
        )
        .replace(
            r#""name": "util", "obj": { "id": 22"#,
            r#""name": "u", "obj": { "id": 22"#,
        );
    assert!(renamed.contains(r#""name": "u""#));
    fs::write(&root, renamed).unwrap();
    let args = BuildArgs {
        output: Some(temp_dir.path().join("out")),
        snapshot: Some(dir),
        ..BuildArgs::new(temp_dir.path())
    };

    build_command(args, &GzConfig::default()).await.unwrap();

    let main = fs::read_to_string(temp_dir.path().join("out").join("main.zig")).unwrap();
    assert!(main.contains("const util = @import(\"util.zig\");"));
    assert!(main.contains("util.Add(task, 1, 2)"), "{main}");
    assert!(!main.contains("u.Add("), "{main}");
}

#[tokio::test]
async fn test_missing_snapshot_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let args = BuildArgs {
        snapshot: Some(temp_dir.path().join("nowhere")),
        ..BuildArgs::new(temp_dir.path())
    };

    let err = build_command(args, &GzConfig::default()).await.unwrap_err();
    assert!(matches!(err, CliError::Load(LoadError::Snapshot { .. })), "{err}");
    assert!(!temp_dir.path().join(".zig").exists(), "nothing is written when loading fails");
}
