//! Command-line driver for gozig.
//!
//! Loads a Go module through the host toolchain, runs escape analysis and
//! Zig generation per package, and writes the generated files next to the
//! runtime library.

pub mod commands;
pub mod config;
pub mod diagnostics;

pub mod error {
    use gz_golang::LoadError;
    use gz_zig::GenerateErrors;
    use miette::Diagnostic;
    use thiserror::Error;

    #[derive(Error, Debug, Diagnostic)]
    pub enum CliError {
        #[error("IO error: {0}")]
        #[diagnostic(code(gozig::io))]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        #[diagnostic(code(gozig::config), help("check the TOML syntax and section names of the config file"))]
        Config(String),

        #[error(transparent)]
        #[diagnostic(code(gozig::load), help("the Go sources must type-check before they can be transpiled"))]
        Load(#[from] LoadError),

        #[error("{} package(s) failed to generate", failures.len())]
        #[diagnostic(code(gozig::generate))]
        Generate { failures: Vec<GenerateErrors> },
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use config::GzConfig;
pub use error::{CliError, Result};
