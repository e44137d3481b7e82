//! Zig code generation for gozig.
//!
//! [`ZigGenerator`] lowers one analysed [`Package`](gz_core::ir::Package)
//! into the text of a single Zig source file. Generated files import the
//! runtime library shipped in [`runtime`], which provides the containers,
//! the task scheduler and the reflection descriptors the output refers to.

mod printer;
pub mod runtime;

pub use printer::{generate, GenerateErrors, GenerateOptions, ZigGenerator};

/// Canonical identifier for the Zig backend.
pub const ZIG: &str = "zig";
