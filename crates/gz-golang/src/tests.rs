use std::cell::RefCell;
use std::collections::HashMap;

use gz_core::ir::{Definition, ExprKind, StmtKind};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::frontend::keep_variant;
use crate::host::HostPackage;
use crate::{build_package, DenyList, GoFrontend, HostToolchain, LoadError, SnapshotToolchain};

/// Serves canned packages and records every pattern it was asked for.
#[derive(Default)]
struct FakeToolchain {
    packages: HashMap<String, serde_json::Value>,
    requests: RefCell<Vec<String>>,
}

impl FakeToolchain {
    fn with(mut self, pattern: &str, packages: serde_json::Value) -> Self {
        self.packages.insert(pattern.to_string(), packages);
        self
    }
}

impl HostToolchain for FakeToolchain {
    fn load(&self, pattern: &str, _tests: bool) -> crate::error::Result<Vec<HostPackage>> {
        self.requests.borrow_mut().push(pattern.to_string());
        let value = self.packages.get(pattern).cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(value).expect("fake package json"))
    }
}

fn package(path: &str, imports: &[&str]) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "id": path,
        "name": name,
        "path": path,
        "imports": imports
            .iter()
            .map(|import| json!({ "path": import, "name": import.rsplit('/').next().unwrap_or(import) }))
            .collect::<Vec<_>>(),
    })
}

#[test]
fn keeps_only_the_variant_the_mode_needs() {
    assert!(keep_variant("example.com/p", false));
    assert!(!keep_variant("example.com/p", true));
    assert!(keep_variant("example.com/p [example.com/p.test]", true));
    assert!(keep_variant("example.com/p_test [example.com/p.test]", true));
    assert!(!keep_variant("example.com/p [example.com/p.test]", false));
    assert!(!keep_variant("example.com/p.test", true));
    assert!(!keep_variant("example.com/p.test", false));
}

#[test]
fn deny_list_covers_runtime_packages() {
    let deny = DenyList::default();
    for name in ["reflect", "testing", "runtime", "os", "syscall", "unsafe", "math"] {
        assert!(deny.is_denied(name), "{name} should be denied");
    }
    assert!(deny.is_denied("internal/bytealg"));
    assert!(!deny.is_denied("strings"));
    assert!(!deny.is_denied("math/bits"));

    let extended = DenyList::default().with_packages(["fmt".to_string()]);
    assert!(extended.is_denied("fmt"));
}

#[test]
fn snapshot_file_names_are_flat() {
    assert_eq!(SnapshotToolchain::file_name(".", false), "root.json");
    assert_eq!(SnapshotToolchain::file_name("./", true), "root.test.json");
    assert_eq!(
        SnapshotToolchain::file_name("example.com/a/b", false),
        "example.com.a.b.json"
    );
}

#[test]
fn loads_each_import_once_in_dependency_order() {
    let toolchain = FakeToolchain::default()
        .with(".", json!([package("app", &["app/a", "app/b", "os"])]))
        .with("app/a", json!([package("app/a", &["app/shared", "math"])]))
        .with("app/b", json!([package("app/b", &["app/shared", "internal/race"])]))
        .with("app/shared", json!([package("app/shared", &[])]));
    let frontend = GoFrontend::new(toolchain);

    let program = frontend.load(".", false).expect("load");

    assert_eq!(program.order, vec!["app/shared", "app/a", "app/b", "app"]);
    let requests = frontend_requests(&frontend);
    assert_eq!(requests, vec![".", "app/a", "app/shared", "app/b"]);
}

#[test]
fn test_variant_wins_over_plain_import_in_any_listing_order() {
    let mut external = package("app_test", &["app", "testing"]);
    external["id"] = json!("app_test [app.test]");
    let mut internal = package("app", &["app/util"]);
    internal["id"] = json!("app [app.test]");
    let mut main = package("app.test", &["app", "app_test"]);
    main["id"] = json!("app.test");
    let toolchain = FakeToolchain::default()
        .with(".", json!([package("app", &[]), external, internal, main]))
        .with("app", json!([package("app", &[])]))
        .with("app/util", json!([package("app/util", &[])]));
    let frontend = GoFrontend::new(toolchain);

    let program = frontend.load(".", true).expect("load");

    assert_eq!(program.order, vec!["app/util", "app", "app_test"]);
    assert!(program.packages["app"].test, "the test variant of app is kept");
    assert!(program.packages["app_test"].test);
    assert!(!program.packages["app/util"].test);
    assert_eq!(frontend_requests(&frontend), vec![".", "app/util"]);
}

fn frontend_requests(frontend: &GoFrontend<FakeToolchain>) -> Vec<String> {
    frontend.toolchain_ref().requests.borrow().clone()
}

#[test]
fn host_errors_fail_the_whole_load() {
    let mut broken = package("app", &[]);
    broken["errors"] = json!([
        { "pos": "main.go:3:5", "message": "undefined: foo" },
        { "pos": "util.go:9:1", "message": "missing return" }
    ]);
    let frontend = GoFrontend::new(FakeToolchain::default().with(".", json!([broken])));

    let err = frontend.load(".", false).expect_err("load should fail");
    match &err {
        LoadError::Packages { failures } => assert_eq!(failures.len(), 2),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "packages failed to load:\nmain.go:3:5: undefined: foo\nutil.go:9:1: missing return"
    );
}

#[test]
fn empty_pattern_is_an_error() {
    let frontend = GoFrontend::new(FakeToolchain::default());
    assert!(matches!(frontend.load("./nothing", false), Err(LoadError::Empty { .. })));
}

#[test]
fn rejects_dangling_type_references() {
    let host: HostPackage = serde_json::from_value(json!({
        "id": "app",
        "name": "app",
        "path": "app",
        "types": [{ "kind": "slice", "elem": 7 }]
    }))
    .expect("host json");
    assert!(matches!(build_package(host, false), Err(LoadError::Malformed { .. })));
}

#[test]
fn builds_identifier_categories_and_bindings() {
    let host: HostPackage = serde_json::from_value(json!({
        "id": "app",
        "name": "app",
        "path": "app",
        "types": [
            { "kind": "basic", "basic": "int" },
            { "kind": "signature" },
            { "kind": "basic", "basic": "untyped nil" }
        ],
        "files": [{
            "path": "app.go",
            "decls": [{
                "kind": "func",
                "name": { "name": "run", "tv": { "type": 1 }, "obj": { "id": 1, "kind": "func", "package": "app", "global": true }, "def": true },
                "type": { "tv": { "type": 1 } },
                "body": { "stmts": [
                    {
                        "kind": "assign",
                        "pos": { "line": 2, "column": 2 },
                        "tok": ":=",
                        "lhs": [{ "kind": "ident", "name": "n", "tv": { "type": 0 }, "obj": { "id": 2, "kind": "var", "package": "app", "shadow": 1 }, "def": true }],
                        "rhs": [{ "kind": "call", "tv": { "type": 0 },
                                  "fun": { "kind": "ident", "name": "int", "tv": { "type": 0, "is_type": true }, "obj": { "id": 3, "kind": "type_name" } },
                                  "args": [{ "kind": "basic_lit", "tv": { "type": 0, "value": { "int": 3 } }, "lit": "INT", "value": "3" }] }]
                    },
                    {
                        "kind": "assign",
                        "tok": "+=",
                        "lhs": [{ "kind": "ident", "name": "n", "tv": { "type": 0 }, "obj": { "id": 2, "kind": "var", "package": "app", "shadow": 1 } }],
                        "rhs": [{ "kind": "ident", "name": "nil", "tv": { "type": 2 }, "obj": { "id": 4, "kind": "nil" } }]
                    }
                ] }
            }]
        }]
    }))
    .expect("host json");

    let package = build_package(host, false).expect("build");
    let Some(Definition::Function(run)) = package.definitions().next() else {
        panic!("expected a function");
    };
    let body = run.func.body.as_ref().expect("body");
    let StmtKind::Assign(define) = &body.stmts[0].kind else {
        panic!("expected assignment");
    };
    let StmtKind::Assign(update) = &body.stmts[1].kind else {
        panic!("expected assignment");
    };

    let declared = define.lhs[0].as_variable().expect("variable");
    let used = update.lhs[0].as_variable().expect("variable");
    assert!(declared.declares);
    assert!(!used.declares);
    assert_eq!(declared.binding, used.binding);
    assert_eq!(declared.shadow, 1);
    assert_eq!(body.stmts[0].location.to_string(), "app.go:2:2");

    let ExprKind::Call(conversion) = &define.rhs[0].kind else {
        panic!("expected call");
    };
    assert!(matches!(conversion.callee.kind, ExprKind::Type(_)));
    assert!(matches!(update.rhs[0].kind, ExprKind::Nil));
    assert!(package.node_count > 0);
}
