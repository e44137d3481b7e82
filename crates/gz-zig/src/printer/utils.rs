/// Words Zig reserves, plus the primitive type names that cannot be
/// shadowed.
const ZIG_RESERVED: &[&str] = &[
    "addrspace", "align", "allowzero", "and", "anyframe", "anytype", "asm", "async", "await", "break",
    "callconv", "catch", "comptime", "const", "continue", "defer", "else", "enum", "errdefer", "error",
    "export", "extern", "fn", "for", "if", "inline", "linksection", "noalias", "noinline", "nosuspend",
    "opaque", "or", "orelse", "packed", "pub", "resume", "return", "struct", "suspend", "switch", "test",
    "threadlocal", "try", "union", "unreachable", "usingnamespace", "var", "volatile", "while", "anyerror",
    "anyopaque", "bool", "comptime_float", "comptime_int", "f16", "f32", "f64", "f80", "f128", "isize",
    "usize", "noreturn", "type", "void", "true", "false", "null", "undefined", "c_char", "c_short",
    "c_ushort", "c_int", "c_uint", "c_long", "c_ulong", "c_longlong", "c_ulonglong", "c_longdouble",
];

/// Names generated code declares in every function body or file scope.
const GENERATED: &[&str] = &["go", "std", "task", "inherited", "owned", "context", "env", "address", "recv"];

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `i32`, `u7` and friends are primitive types in Zig.
fn is_arbitrary_int(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('i' | 'u'))
        && name.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

pub(super) fn quote(name: &str) -> String {
    format!("@\"{}\"", escape_zig_string(name))
}

/// Zig spelling of a Go identifier.
pub(super) fn zig_name(name: &str) -> String {
    if GENERATED.contains(&name) {
        quote(&format!("{name}.go"))
    } else if !is_plain_identifier(name) || ZIG_RESERVED.contains(&name) || is_arbitrary_int(name) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// Zig spelling of a field name after a `.`, where generated names cannot
/// collide.
pub(super) fn field_name(name: &str) -> String {
    if !is_plain_identifier(name) || ZIG_RESERVED.contains(&name) || is_arbitrary_int(name) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// Joins dotted parts into one quoted identifier, `@"T.M"`.
pub(super) fn dotted(parts: &[&str]) -> String {
    quote(&parts.join("."))
}

pub(super) fn render_float(value: f64) -> String {
    if value.fract() != 0.0 {
        value.to_string()
    } else if value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{:e}", value)
    }
}

pub(super) fn escape_zig_string(raw: &str) -> String {
    raw.chars().flat_map(|c| c.escape_default()).collect()
}

pub(super) fn string_literal(raw: &str) -> String {
    format!("\"{}\"", escape_zig_string(raw))
}
