//! Runtime resources copied next to the generated sources.
//!
//! Every `go` statement runs on its own OS thread, so routines are scheduled
//! preemptively. Channel operations keep Go semantics (unbuffered sends
//! rendezvous, buffered ones block on a full or empty queue) but programs
//! must not rely on any interleaving beyond what channels enforce.

/// Scheduler, containers and reflection support imported by every
/// generated file.
pub const GO_ZIG: &str = include_str!("../runtime/go.zig");
pub const BUILD_ZIG: &str = include_str!("../runtime/build.zig");
pub const BUILD_ZIG_ZON: &str = include_str!("../runtime/build.zig.zon");

/// Default name generated files import the runtime by.
pub const RUNTIME_FILE: &str = "go.zig";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeFile {
    pub name: &'static str,
    pub contents: &'static str,
    /// Part of the build scaffolding rather than the runtime proper.
    pub build: bool,
}

/// Every resource, runtime library first.
pub fn files() -> [RuntimeFile; 3] {
    [
        RuntimeFile {
            name: RUNTIME_FILE,
            contents: GO_ZIG,
            build: false,
        },
        RuntimeFile {
            name: "build.zig",
            contents: BUILD_ZIG,
            build: true,
        },
        RuntimeFile {
            name: "build.zig.zon",
            contents: BUILD_ZIG_ZON,
            build: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_declares_what_generated_code_uses() {
        for name in [
            "pub const routine",
            "pub fn slice(",
            "pub fn smap(",
            "pub fn chan(",
            "pub fn pointer(",
            "pub fn interface(",
            "pub const rtype",
            "pub fn variadic(",
        ] {
            assert!(GO_ZIG.contains(name), "runtime is missing `{name}`");
        }
        assert!(BUILD_ZIG_ZON.contains(".name"));
        assert_eq!(files()[0].name, RUNTIME_FILE);
    }

    #[test]
    fn routines_are_threads_and_say_so() {
        assert!(GO_ZIG.contains("std.Thread.spawn("));
        assert!(GO_ZIG.contains("Routines are OS threads scheduled preemptively"));
    }
}
