use super::*;
use gz_core::fixture::Fixture;
use gz_core::ir::{BinaryOp, BranchKind, CaseClause, ExprKind, SelectStmt, StmtKind, SwitchStmt, TypeSwitchStmt};
use gz_core::types::{Field as StructField, Method};
use gz_core::{CodegenError, TypeKind};
use gz_escape::analyze;
use pretty_assertions::assert_eq;

fn generate_default(package: &Package) -> Result<String, GenerateErrors> {
    ZigGenerator::default().generate(package)
}

/// Trimmed lines of the generated text, for order-sensitive checks that do
/// not depend on indentation.
fn lines(code: &str) -> Vec<&str> {
    code.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

fn position(code: &str, line: &str) -> usize {
    lines(code)
        .iter()
        .position(|candidate| *candidate == line)
        .unwrap_or_else(|| panic!("`{line}` not found in:\n{code}"))
}

/// `func f() { x := 42; println(x) }`
fn local_printed() -> Package {
    let mut fx = Fixture::new("main");
    let name = fx.declare_function("f", &[], &[]);
    let value = fx.int_lit(42);
    let define = fx.define("x", value);
    let x = fx.var("x");
    let print = fx.builtin_call("println", vec![x], None);
    let print = fx.expr_stmt(print);
    let def = fx.function(name, vec![], vec![], vec![define, print]);
    fx.finish(vec![def])
}

#[test]
fn test_header_and_function_shape() {
    let package = local_printed();
    analyze(&package);
    let code = generate_default(&package).unwrap();
    assert_eq!(
        lines(&code)[..12].to_vec(),
        vec![
            "// Generated from Go package main.",
            "const std = @import(\"std\");",
            "const go = @import(\"go.zig\");",
            "pub fn f(inherited: ?*go.routine) void {",
            "var owned: go.routine = undefined;",
            "const task = go.routine.enter(inherited, &owned);",
            "defer if (inherited == null) task.exit();",
            "var x: isize = 42;",
            "_ = &x;",
            "go.println(.{ x });",
            "}",
            "pub const @\"f.(func)\" = go.rfunc{ .name = \"main.f\", .address = @ptrCast(&f) };",
        ]
    );
    assert!(code.contains("pub fn @\"package.init\"(inherited: ?*go.routine) void {"));
    assert!(code.ends_with("}\n"));
}

#[test]
fn test_generation_is_deterministic() {
    let package = local_printed();
    analyze(&package);
    let first = generate_default(&package).unwrap();
    let second = generate_default(&package).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_storage_follows_escape_verdict() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ptr = fx.pointer(int);
    let chan = fx.chan(int);

    let local = fx.declare_function("local", &[], &[]);
    let value = fx.int_lit(1);
    let define = fx.define("a", value);
    let a = fx.var("a");
    let print = fx.builtin_call("println", vec![a], None);
    let print = fx.expr_stmt(print);
    let local = fx.function(local, vec![], vec![], vec![define, print]);

    let heap = fx.declare_function("heap", &[], &[ptr]);
    let value = fx.int_lit(2);
    let define = fx.define("b", value);
    let b = fx.var("b");
    let address = fx.address_of(b);
    let ret = fx.ret(vec![address]);
    let heap = fx.function(heap, vec![], vec![ptr], vec![define, ret]);

    let shared = fx.declare_function("shared", &[chan], &[]);
    let ch = fx.param("ch", chan);
    let value = fx.int_lit(3);
    let define = fx.define("c", value);
    let channel = fx.var("ch");
    let c = fx.var("c");
    let send = fx.send(channel, c);
    let shared = fx.function(shared, vec![ch], vec![], vec![define, send]);

    let package = fx.finish(vec![local, heap, shared]);
    analyze(&package);
    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"var a: isize = 1;"), "{code}");
    assert!(code_lines.contains(&"const b = task.malloc(isize, 2);"), "{code}");
    assert!(code_lines.contains(&"const c = task.share(isize, 3);"), "{code}");
    assert!(code_lines.contains(&"ch.send(task, c.*);"), "{code}");
    assert!(code_lines.contains(&"pub fn shared(inherited: ?*go.routine, ch: go.chan(isize)) void {"));
}

#[test]
fn test_send_requires_shared_verdict() {
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

    // Without running the analysis every variable reads as non-escaping.
    let err = generate_default(&package).unwrap_err();
    assert_eq!(err.package, "main");
    assert_eq!(err.errors.len(), 1);
    match &err.errors[0] {
        CodegenError::InternalInvariant { message, .. } => {
            assert!(message.contains("shared-escape"), "{message}")
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unsupported_definition_leaves_no_trace() {
    let mut fx = Fixture::new("main");
    let before = fx.declare_function("before", &[], &[]);
    let broken = fx.declare_function("broken", &[], &[]);
    let after = fx.declare_function("after", &[], &[]);

    let value = fx.int_lit(7);
    let define = fx.define("kept", value);
    let before = fx.function(before, vec![], vec![], vec![define]);

    let value = fx.int_lit(8);
    let define = fx.define("lost", value);
    let select = fx.stmt(StmtKind::Select(SelectStmt { clauses: Vec::new() }));
    let broken = fx.function(broken, vec![], vec![], vec![define, select]);

    let after = fx.function(after, vec![], vec![], vec![]);
    let package = fx.finish(vec![before, broken, after]);
    analyze(&package);

    let options = GenerateOptions::default();
    let mut emitter = ZigEmitter::new(&package, &options);
    emitter.emit_package();
    assert_eq!(emitter.errors.len(), 1);
    assert!(matches!(
        &emitter.errors[0],
        CodegenError::UnsupportedConstruct { construct, .. } if construct == "select statement"
    ));
    let code = emitter.finish();
    assert!(code.contains("pub fn before("));
    assert!(code.contains("pub fn after("));
    assert!(!code.contains("broken"), "{code}");
    assert!(!code.contains("lost"), "{code}");
    assert!(!code.contains("\n\n\n"), "{code}");
}

#[test]
fn test_failed_generation_reports_every_definition() {
    let mut fx = Fixture::new("main");
    let first = fx.declare_function("first", &[], &[]);
    let second = fx.declare_function("second", &[], &[]);
    let select = fx.stmt(StmtKind::Select(SelectStmt { clauses: Vec::new() }));
    let first = fx.function(first, vec![], vec![], vec![select]);
    let select = fx.stmt(StmtKind::Select(SelectStmt { clauses: Vec::new() }));
    let second = fx.function(second, vec![], vec![], vec![select]);
    let package = fx.finish(vec![first, second]);
    analyze(&package);

    let err = generate_default(&package).unwrap_err();
    assert_eq!(err.errors.len(), 2);
    assert_eq!(err.to_string(), "2 definition(s) in package main failed to generate");
}

#[test]
fn test_constant_slice_global_is_static() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let slice = fx.slice(int);
    let elements = vec![fx.int_lit(1), fx.int_lit(2), fx.int_lit(3)];
    let value = fx.composite(slice, elements);
    let def = fx.global_var("xs", slice, Some(value));
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(
        code_lines.contains(&"pub var xs: go.slice(isize) = go.slice(isize).literal(3, .{ 1, 2, 3 });"),
        "{code}"
    );
    assert!(!code_lines.contains(&"xs = go.slice(isize).literal(3, .{ 1, 2, 3 });"));
}

#[test]
fn test_dynamic_global_is_set_in_package_init() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let name = fx.declare_function("seed", &[], &[int]);
    let value = fx.int_lit(4);
    let ret = fx.ret(vec![value]);
    let seed = fx.function(name, vec![], vec![int], vec![ret]);
    let callee = fx.func_ref("seed");
    let call = fx.call(callee, vec![], Some(int));
    let global = fx.global_var("n", int, Some(call));
    let package = fx.finish(vec![seed, global]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let declared = position(&code, "pub var n: isize = go.zero(isize);");
    let guard = position(&code, "@\"package.initialized\" = true;");
    let assigned = position(&code, "n = seed(task);");
    assert!(declared < guard && guard < assigned, "{code}");
}

#[test]
fn test_arithmetic_wraps() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let name = fx.declare_function("add", &[int, int], &[int]);
    let a = fx.param("a", int);
    let b = fx.param("b", int);
    let lhs = fx.var("a");
    let rhs = fx.var("b");
    let sum = fx.binary(BinaryOp::Add, lhs, rhs);
    let ret = fx.ret(vec![sum]);
    let def = fx.function(name, vec![a, b], vec![int], vec![ret]);
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"pub fn add(inherited: ?*go.routine, a: isize, b: isize) isize {"));
    assert!(code_lines.contains(&"return (a +% b);"), "{code}");
}

#[test]
fn test_runtime_import_is_configurable() {
    let package = local_printed();
    analyze(&package);
    let options = GenerateOptions {
        runtime_import: "runtime/go.zig".to_string(),
        ..GenerateOptions::default()
    };
    let code = generate(&package, &options).unwrap();
    assert!(code.contains("const go = @import(\"runtime/go.zig\");"));
    assert_eq!(ZigGenerator::file_name(&package), "main.zig");
}

#[test]
fn test_slice_index_reads_through_element_pointer() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ints = fx.slice(int);
    let name = fx.declare_function("second", &[ints], &[int]);
    let xs = fx.param("xs", ints);
    let target = fx.var("xs");
    let one = fx.int_lit(1);
    let element = fx.index(target, one, int);
    let ret = fx.ret(vec![element]);
    let def = fx.function(name, vec![xs], vec![int], vec![ret]);
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"pub fn second(inherited: ?*go.routine, xs: go.slice(isize)) isize {"));
    assert!(code_lines.contains(&"return xs.index(1).*;"), "{code}");
}

#[test]
fn test_receive_blocks_on_the_channel() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let chan = fx.chan(int);
    let name = fx.declare_function("next", &[chan], &[int]);
    let ch = fx.param("ch", chan);
    let channel = fx.var("ch");
    let received = fx.receive(channel);
    let ret = fx.ret(vec![received]);
    let def = fx.function(name, vec![ch], vec![int], vec![ret]);
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    assert!(lines(&code).contains(&"return ch.recv(task);"), "{code}");
}

/// `type T struct{ N int }`, `type I interface{ M() int }`,
/// `func (t T) M() int { return 1 }` and `func box(n T) I { return n }`.
fn boxed_method() -> Package {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let method_sig = fx.signature(vec![], vec![int]);
    let method = Method {
        name: "M".to_string(),
        signature: method_sig,
        pointer_receiver: false,
    };
    let fields = fx.ty(TypeKind::Struct {
        fields: vec![StructField {
            name: "N".to_string(),
            ty: int,
            embedded: false,
        }],
    });
    let t = fx.types.push(TypeKind::Named {
        package: Some("main".to_string()),
        name: "T".to_string(),
        underlying: fields,
        methods: vec![method.clone()],
    });
    let iface = fx.ty(TypeKind::Interface { methods: vec![method] });
    let i = fx.named("I", iface);
    let t_def = fx.type_definition("T", t);
    let i_def = fx.type_definition("I", i);

    let receiver = fx.param("t", t);
    let one = fx.int_lit(1);
    let ret = fx.ret(vec![one]);
    let m_def = fx.method(receiver, "M", vec![], vec![int], vec![ret]);

    let name = fx.declare_function("box", &[t], &[i]);
    let n = fx.param("n", t);
    let value = fx.var("n");
    let ret = fx.ret(vec![value]);
    let box_def = fx.function(name, vec![n], vec![i], vec![ret]);
    fx.finish(vec![t_def, i_def, m_def, box_def])
}

#[test]
fn test_defined_type_gets_rtype_descriptor() {
    let package = boxed_method();
    analyze(&package);
    let code = generate_default(&package).unwrap();

    let start = position(&code, "pub const @\"T.(type)\" = go.rtype{");
    assert_eq!(
        lines(&code)[start..start + 10].to_vec(),
        vec![
            "pub const @\"T.(type)\" = go.rtype{",
            ".name = \"main.T\",",
            ".kind = .@\"struct\",",
            ".size = @sizeOf(T),",
            ".equal = go.equality(T),",
            ".hash = go.hashing(T),",
            ".fields = &.{",
            ".{ .name = \"N\", .type = &go.rtypes.int, .offset = @offsetOf(T, \"N\"), .size = @sizeOf(isize), .exported = true, .embedded = false },",
            "},",
            "};",
        ]
    );
    assert!(position(&code, "pub const T = struct {") < start);
    assert!(lines(&code).contains(&".kind = .interface,"), "{code}");
}

#[test]
fn test_boxing_uses_method_shims() {
    let package = boxed_method();
    analyze(&package);
    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);

    let method = position(&code, "pub fn @\"T.M\"(inherited: ?*go.routine, t: T) isize {");
    let shim = position(&code, "pub fn @\"main.T.M.(itfc)\"(inherited: ?*go.routine, address: ?*anyopaque) isize {");
    assert!(method < shim, "{code}");
    assert_eq!(
        code_lines[shim + 1..shim + 3].to_vec(),
        vec![
            "const recv: *T = @ptrCast(@alignCast(address.?));",
            "return @\"T.M\"(inherited, recv.*);",
        ]
    );
    assert!(code_lines.contains(&"pub const @\"T.M.(func)\" = go.rfunc{ .name = \"main.T.M\", .address = @ptrCast(&@\"T.M\") };"));

    // The interface holds a heap copy of the value.
    assert!(code_lines.contains(&"const n = task.malloc(T, @\"n.arg\");"), "{code}");
    assert!(
        code_lines.contains(&"return I.make(task, T, &@\"T.(type)\", n.*, &.{ .M = &@\"main.T.M.(itfc)\" });"),
        "{code}"
    );
}

#[test]
fn test_variadic_arguments_are_packed() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ints = fx.slice(int);
    let name = fx.declare_variadic("sum", &[ints], &[int]);
    let nums = fx.param("nums", ints);
    let value = fx.var("nums");
    let count = fx.builtin_call("len", vec![value], Some(int));
    let ret = fx.ret(vec![count]);
    let sum = fx.function(name, vec![nums], vec![int], vec![ret]);

    let name = fx.declare_function("f", &[ints], &[]);
    let xs = fx.param("xs", ints);
    let callee = fx.func_ref("sum");
    let args = vec![fx.int_lit(1), fx.int_lit(2), fx.int_lit(3)];
    let packed = fx.call(callee, args, Some(int));
    let packed = fx.expr_stmt(packed);
    let callee = fx.func_ref("sum");
    let spread = fx.var("xs");
    let mut spread = fx.call(callee, vec![spread], Some(int));
    if let ExprKind::Call(call) = &mut spread.kind {
        call.ellipsis = true;
    }
    let spread = fx.expr_stmt(spread);
    let f = fx.function(name, vec![xs], vec![], vec![packed, spread]);
    let package = fx.finish(vec![sum, f]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"return go.len(nums);"), "{code}");
    assert!(
        code_lines.contains(&"_ = sum(task, go.variadic(task, isize, .{ 1, 2, 3 }));"),
        "{code}"
    );
    assert!(code_lines.contains(&"_ = sum(task, xs);"), "{code}");
}

#[test]
fn test_go_statement_spawns_a_routine() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let name = fx.declare_function("worker", &[int], &[]);
    let n = fx.param("n", int);
    let worker = fx.function(name, vec![n], vec![], vec![]);

    let name = fx.declare_function("start", &[], &[]);
    let callee = fx.func_ref("worker");
    let seven = fx.int_lit(7);
    let call = fx.call(callee, vec![seven], None);
    let spawn = fx.stmt(StmtKind::Go(call));
    let start = fx.function(name, vec![], vec![], vec![spawn]);
    let package = fx.finish(vec![worker, start]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"_ = n;"), "{code}");
    assert!(code_lines.contains(&"task.go(worker, .{ 7 });"), "{code}");
}

#[test]
fn test_make_and_append_lower_to_runtime_calls() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let ints = fx.slice(int);
    let chan = fx.chan(int);
    let name = fx.declare_function("f", &[], &[]);

    let ty = fx.type_operand(ints);
    let args = vec![ty, fx.int_lit(0), fx.int_lit(4)];
    let made = fx.builtin_call("make", args, Some(ints));
    let define_xs = fx.define("xs", made);
    let target = fx.var("xs");
    let base = fx.var("xs");
    let args = vec![base, fx.int_lit(1), fx.int_lit(2)];
    let appended = fx.builtin_call("append", args, Some(ints));
    let append = fx.assign(target, appended);
    let ty = fx.type_operand(chan);
    let made = fx.builtin_call("make", vec![ty], Some(chan));
    let define_ch = fx.define("ch", made);
    let def = fx.function(name, vec![], vec![], vec![define_xs, append, define_ch]);
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(
        code_lines.contains(&"var xs: go.slice(isize) = go.slice(isize).make(task, 0, 4);"),
        "{code}"
    );
    assert!(code.contains("xs = xs.append(task, .{ 1, 2 });"), "{code}");
    assert!(code_lines.contains(&"var ch: go.chan(isize) = go.chan(isize).make(task, 0);"), "{code}");
}

#[test]
fn test_switch_lowers_to_labelled_if_chain() {
    let mut fx = Fixture::new("main");
    let int = fx.int();
    let name = fx.declare_function("classify", &[int], &[]);
    let n = fx.param("n", int);

    let zero = fx.int_lit(0);
    let print_zero = fx.builtin_call("println", vec![zero], None);
    let print_zero = fx.expr_stmt(print_zero);
    let location = fx.location();
    let default = CaseClause {
        location,
        values: Vec::new(),
        body: vec![print_zero],
    };
    let one = fx.int_lit(1);
    let print_one = fx.builtin_call("println", vec![one], None);
    let print_one = fx.expr_stmt(print_one);
    let brk = fx.stmt(StmtKind::Branch {
        kind: BranchKind::Break,
        label: None,
    });
    let location = fx.location();
    let small = CaseClause {
        location,
        values: vec![fx.int_lit(1), fx.int_lit(2)],
        body: vec![print_one, brk],
    };
    let tag = fx.var("n");
    // `default` is written first but tested last.
    let switch = fx.stmt(StmtKind::Switch(SwitchStmt {
        init: None,
        tag: Some(tag),
        clauses: vec![default, small],
    }));
    let def = fx.function(name, vec![n], vec![], vec![switch]);
    let package = fx.finish(vec![def]);
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let start = position(&code, "const @\"tag.1\" = n;");
    assert_eq!(
        lines(&code)[start - 1..start + 10].to_vec(),
        vec![
            "{",
            "const @\"tag.1\" = n;",
            "@\"switch.2\": {",
            "if ((@\"tag.1\" == @as(isize, 1)) or (@\"tag.1\" == @as(isize, 2))) {",
            "go.println(.{ @as(isize, 1) });",
            "break :@\"switch.2\";",
            "} else {",
            "go.println(.{ @as(isize, 0) });",
            "}",
            "}",
            "}",
        ]
    );
}

#[test]
fn test_closure_is_hoisted_with_its_captures() {
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
    analyze(&package);

    let code = generate_default(&package).unwrap();
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"const x = task.malloc(isize, 42);"), "{code}");
    assert!(code.contains(".make(task, @\"closure.1\"{ .x = x });"), "{code}");
    assert!(code_lines.contains(&"g.invoke(task, .{});"), "{code}");

    let function = position(&code, "pub fn f(inherited: ?*go.routine) void {");
    let hoisted = position(&code, "const @\"closure.1\" = struct {");
    assert!(function < hoisted, "closures follow the function that makes them");
    assert_eq!(
        code_lines[hoisted + 1..hoisted + 5].to_vec(),
        vec![
            "x: *isize,",
            "pub fn call(inherited: ?*go.routine, context: ?*const anyopaque) void {",
            "const env: *const @This() = @ptrCast(@alignCast(context.?));",
            "const x = env.x;",
        ]
    );
    assert!(code_lines.contains(&"go.print(.{ x.* });"), "{code}");
}

#[test]
fn test_unsupported_control_flow_is_reported() {
    let mut fx = Fixture::new("main");
    let type_switch = fx.declare_function("kinds", &[], &[]);
    let labelled = fx.declare_function("labelled", &[], &[]);
    let jumps = fx.declare_function("jumps", &[], &[]);

    let any = fx.ty(TypeKind::Interface { methods: Vec::new() });
    let subject = fx.expr(Some(any), ExprKind::Nil);
    let stmt = fx.stmt(StmtKind::TypeSwitch(TypeSwitchStmt {
        init: None,
        binding: None,
        subject,
        clauses: Vec::new(),
    }));
    let type_switch = fx.function(type_switch, vec![], vec![], vec![stmt]);

    let label = fx.label("outer");
    let inner = fx.stmt(StmtKind::Empty);
    let stmt = fx.stmt(StmtKind::Label {
        label,
        stmt: Box::new(inner),
    });
    let labelled = fx.function(labelled, vec![], vec![], vec![stmt]);

    let label = fx.label("done");
    let stmt = fx.stmt(StmtKind::Branch {
        kind: BranchKind::Goto,
        label: Some(label),
    });
    let jumps = fx.function(jumps, vec![], vec![], vec![stmt]);

    let package = fx.finish(vec![type_switch, labelled, jumps]);
    analyze(&package);

    let err = generate_default(&package).unwrap_err();
    let constructs = err
        .errors
        .iter()
        .map(|error| match error {
            CodegenError::UnsupportedConstruct { construct, .. } => construct.as_str(),
            other => panic!("unexpected error {other:?}"),
        })
        .collect::<Vec<_>>();
    assert_eq!(constructs, vec!["type switch", "labeled statement", "goto"]);
}
