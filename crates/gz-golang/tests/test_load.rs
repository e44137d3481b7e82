use std::path::PathBuf;

use gz_core::ir::{Definition, ExprKind, SelectionKind, StmtKind};
use gz_golang::{GoFrontend, LoadError, SnapshotToolchain};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn snapshots() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/snapshots")
}

#[test]
fn loads_root_and_dependencies_from_snapshots() {
    let frontend = GoFrontend::new(SnapshotToolchain::new(snapshots()));
    let program = frontend.load(".", false).expect("load snapshots");

    assert_eq!(program.order, vec!["example.com/hello/util", "example.com/hello"]);

    let util = &program.packages["example.com/hello/util"];
    assert_eq!(util.name, "util");
    let Some(Definition::Function(add)) = util.definitions().next() else {
        panic!("util should define Add");
    };
    assert_eq!(add.name.name, "Add");
    assert_eq!(add.doc.as_deref(), Some("Add returns the sum."));
    assert_eq!(add.func.signature.params[0].names.len(), 2);

    let main = &program.packages["example.com/hello"];
    assert!(!main.test);
    assert_eq!(main.imports.len(), 2);
    let Some(Definition::Function(entry)) = main.definitions().next() else {
        panic!("main should define main");
    };
    let body = entry.func.body.as_ref().expect("main body");
    let StmtKind::Assign(define) = &body.stmts[0].kind else {
        panic!("expected define");
    };
    let ExprKind::Call(call) = &define.rhs[0].kind else {
        panic!("expected call");
    };
    let ExprKind::Selector(selector) = &call.callee.kind else {
        panic!("expected qualified callee");
    };
    assert_eq!(selector.kind, SelectionKind::Qualified);
    assert_eq!(selector.field.package.as_deref(), Some("util"));
    assert!(matches!(selector.target.kind, ExprKind::Package(_)));
}

#[test]
fn test_mode_keeps_only_test_variants() {
    let frontend = GoFrontend::new(SnapshotToolchain::new(snapshots()));
    let program = frontend.load(".", true).expect("load test snapshots");

    assert_eq!(program.order, vec!["example.com/hello/util", "example.com/hello"]);
    let main = &program.packages["example.com/hello"];
    assert!(main.test);
    let Some(Definition::Function(test)) = main.definitions().next() else {
        panic!("expected TestAdd");
    };
    assert_eq!(test.name.name, "TestAdd");
    assert!(test.is_test);
    assert!(!program.packages["example.com/hello/util"].test);
}

#[test]
fn missing_snapshot_reports_the_path() {
    let dir = TempDir::new().expect("tempdir");
    let frontend = GoFrontend::new(SnapshotToolchain::new(dir.path()));
    let err = frontend.load(".", false).expect_err("nothing to load");
    match err {
        LoadError::Snapshot { path, .. } => assert_eq!(path, dir.path().join("root.json")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn malformed_snapshot_is_a_decode_error() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("root.json"), "{ not json").expect("write snapshot");
    let frontend = GoFrontend::new(SnapshotToolchain::new(dir.path()));
    assert!(matches!(frontend.load(".", false), Err(LoadError::Decode { .. })));
}
