use super::*;
use gz_core::fixture::Fixture;
use gz_core::ir::visit::{walk_expr, walk_package, Visitor};
use gz_core::ir::*;
use gz_core::types::Field as StructField;
use gz_core::{EscapeState, NodeId, TypeKind};
use pretty_assertions::assert_eq;

/// `(name, verdict)` of every variable use, in walk order.
fn uses(package: &Package) -> Vec<(String, EscapeState)> {
    #[derive(Default)]
    struct Uses(Vec<(String, EscapeState)>);

    impl Visitor for Uses {
        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Variable(ident) = &expr.kind {
                if !ident.declares {
                    self.0.push((ident.name.clone(), ident.escape()));
                }
            }
            walk_expr(self, expr)
        }
    }

    let mut uses = Uses::default();
    walk_package(&mut uses, package);
    uses.0
}

#[test]
fn test_sent_value_is_shared() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let chan = fx.chan(int);
    let name = fx.declare_function("f", &[chan], &[]);
    let ch = fx.param("ch", chan);
    let value = fx.int_lit(42);
    let define = fx.define("x", value);
    let channel = fx.var("ch");
    let x = fx.var("x");
    let send = fx.send(channel, x);
    let def = fx.function(name, vec![ch], vec![], vec![define, send]);
    let package = fx.finish(vec![def]);

    let report = analyze(&package);
    assert_eq!(report.get("x"), Some(EscapeState::SharedEscape));
    assert_eq!(report.get("ch"), Some(EscapeState::NoEscape));
    assert_eq!(
        uses(&package),
        vec![
            ("ch".to_string(), EscapeState::NoEscape),
            ("x".to_string(), EscapeState::SharedEscape),
        ]
    );
}

#[test]
fn test_returned_reference_is_heap() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ptr = fx.pointer(int);
    let name = fx.declare_function("f", &[], &[ptr]);
    let value = fx.int_lit(42);
    let define = fx.define("x", value);
    let x = fx.var("x");
    let address = fx.address_of(x);
    let ret = fx.ret(vec![address]);
    let def = fx.function(name, vec![], vec![ptr], vec![define, ret]);
    let package = fx.finish(vec![def]);

    assert_eq!(analyze(&package).get("x"), Some(EscapeState::HeapEscape));
}

#[test]
fn test_printed_value_stays_local() {
    let mut fx = Fixture::new("main");
    let name = fx.declare_function("f", &[], &[]);
    let value = fx.int_lit(42);
    let define = fx.define("x", value);
    let x = fx.var("x");
    let print = fx.builtin_call("print", vec![x], None);
    let print = fx.expr_stmt(print);
    let def = fx.function(name, vec![], vec![], vec![define, print]);
    let package = fx.finish(vec![def]);

    let report = analyze(&package);
    assert_eq!(report.get("x"), Some(EscapeState::NoEscape));
    assert_eq!(report.entries.len(), 1);
}

#[test]
fn test_spawned_closure_capture_is_shared() {
    let mut fx = Fixture::new("main");
    let name = fx.declare_function("f", &[], &[]);
    let value = fx.int_lit(42);
    let define = fx.define("x", value);
    let x = fx.var("x");
    let print = fx.builtin_call("print", vec![x], None);
    let print = fx.expr_stmt(print);
    let closure = fx.func_lit(vec![], vec![], vec![print]);
    let call = fx.call(closure, vec![], None);
    let spawn = fx.stmt(StmtKind::Go(call));
    let def = fx.function(name, vec![], vec![], vec![define, spawn]);
    let package = fx.finish(vec![def]);

    assert_eq!(analyze(&package).get("x"), Some(EscapeState::SharedEscape));
}

#[test]
fn test_plain_closure_capture_is_heap() {
    let mut fx = Fixture::new("main");
    let name = fx.declare_function("f", &[], &[]);
    let value = fx.int_lit(42);
    let define_x = fx.define("x", value);
    let x = fx.var("x");
    let print = fx.builtin_call("print", vec![x], None);
    let print = fx.expr_stmt(print);
    let closure = fx.func_lit(vec![], vec![], vec![print]);
    let define_g = fx.define("g", closure);
    let g = fx.var("g");
    let call = fx.call(g, vec![], None);
    let call = fx.expr_stmt(call);
    let def = fx.function(name, vec![], vec![], vec![define_x, define_g, call]);
    let package = fx.finish(vec![def]);

    let report = analyze(&package);
    assert_eq!(report.get("x"), Some(EscapeState::HeapEscape));
    assert_eq!(report.get("g"), Some(EscapeState::NoEscape));
}

#[test]
fn test_nested_element_follows_container() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ints = fx.slice(int);
    let chan = fx.chan(ints);
    let pair = fx.ty(TypeKind::Struct {
        fields: vec![StructField {
            name: "f".to_string(),
            ty: ints,
            embedded: false,
        }],
    });
    let pair = fx.named("Pair", pair);
    let name = fx.declare_function("f", &[chan], &[]);
    let ch = fx.param("ch", chan);

    let empty = fx.composite(pair, Vec::new());
    let define_a = fx.define("a", empty);
    let one = fx.int_lit(1);
    let define_y = fx.define("y", one);

    // []int{(a.f[0])}
    let a = fx.var("a");
    let field = fx.field(a, "f", 0, ints);
    let zero = fx.int_lit(0);
    let indexed = fx.index(field, zero, int);
    let element = fx.paren(indexed);
    let literal = fx.composite(ints, vec![element]);
    let define_s = fx.define("s", literal);

    let channel = fx.var("ch");
    let s = fx.var("s");
    let send = fx.send(channel, s);
    let def = fx.function(name, vec![ch], vec![], vec![define_a, define_y, define_s, send]);
    let package = fx.finish(vec![def]);

    let report = analyze(&package);
    assert_eq!(report.get("s"), Some(EscapeState::SharedEscape));
    assert_eq!(report.get("a"), Some(EscapeState::SharedEscape));
    assert_eq!(report.get("y"), Some(EscapeState::NoEscape));
}

#[test]
fn test_interface_argument_and_global_store_are_heap() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ptr = fx.pointer(int);
    let any = fx.ty(TypeKind::Interface { methods: Vec::new() });
    let global = fx.global_var("g", ptr, None);
    let sink = fx.declare_function("sink", &[any], &[]);
    let param = fx.param("v", any);
    let sink = fx.function(sink, vec![param], vec![], Vec::new());

    let name = fx.declare_function("f", &[], &[]);
    let one = fx.int_lit(1);
    let define_x = fx.define("x", one);
    let two = fx.int_lit(2);
    let define_z = fx.define("z", two);
    let g = fx.var("g");
    let x = fx.var("x");
    let address = fx.address_of(x);
    let store = fx.assign(g, address);
    let callee = fx.func_ref("sink");
    let z = fx.var("z");
    let call = fx.call(callee, vec![z], None);
    let call = fx.expr_stmt(call);
    let def = fx.function(name, vec![], vec![], vec![define_x, define_z, store, call]);
    let package = fx.finish(vec![global, sink, def]);

    let report = analyze(&package);
    assert_eq!(report.get("x"), Some(EscapeState::HeapEscape));
    assert_eq!(report.get("z"), Some(EscapeState::HeapEscape));
    assert!(report.get("g").is_none(), "package variables are not reported");
}

#[test]
fn test_resolver_handles_cycles_and_memoizes() {
    let mut graph = RelationGraph::with_capacity(6);
    graph.link(NodeId(0), NodeId(1));
    graph.link(NodeId(1), NodeId(2));
    graph.link(NodeId(2), NodeId(0));
    graph.mark(NodeId(2), EscapeState::HeapEscape);
    graph.mark(NodeId(2), EscapeState::NoEscape);
    graph.link(NodeId(4), NodeId(5));
    graph.mark(NodeId(5), EscapeState::SharedEscape);

    let mut resolver = Resolver::new(&graph);
    assert_eq!(resolver.resolve(NodeId(0)), EscapeState::HeapEscape);
    assert_eq!(resolver.resolve(NodeId(1)), EscapeState::HeapEscape);
    assert_eq!(resolver.resolve(NodeId(3)), EscapeState::NoEscape);
    assert_eq!(resolver.resolve(NodeId(4)), EscapeState::SharedEscape);
    assert_eq!(resolver.resolve(NodeId(5)), EscapeState::SharedEscape);
    // Ids past the graph resolve to the bottom of the lattice.
    assert_eq!(resolver.resolve(NodeId(99)), EscapeState::NoEscape);
}

#[test]
fn test_analysis_is_deterministic() {
    let build = || {
        let mut fx = Fixture::new("main");
        let name = fx.declare_function("f", &[], &[]);
        let value = fx.int_lit(1);
        let define = fx.define("x", value);
        let x = fx.var("x");
        let address = fx.address_of(x);
        let define_p = fx.define("p", address);
        let def = fx.function(name, vec![], vec![], vec![define, define_p]);
        fx.finish(vec![def])
    };
    let first = analyze(&build());
    let second = analyze(&build());
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>(),
        vec!["x", "p"]
    );
}
