//! Diagnostic and error reporting utilities

use crate::{CliError, Result};
use gz_core::diagnostics::{Diagnostic, DiagnosticLevel};
use gz_zig::GenerateErrors;
use tracing::{error, warn};

/// Installs miette as the report handler for top-level errors.
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| CliError::Config(format!("failed to set up error reporting: {e}")))?;
    Ok(())
}

/// `<file>:<line>:<column>: <message>` lines for every failed definition.
pub fn generate_diagnostics(failures: &GenerateErrors) -> Vec<Diagnostic> {
    failures.errors.iter().map(Diagnostic::from).collect()
}

/// Logs a diagnostic at the tracing level matching its severity.
pub fn emit_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic.level {
        DiagnosticLevel::Error => error!("{diagnostic}"),
        DiagnosticLevel::Warning => warn!("{diagnostic}"),
    }
}

/// Two packages sharing a name would overwrite each other's output file.
pub fn collision_diagnostic(file_name: &str, previous: &str, path: &str) -> Diagnostic {
    Diagnostic::warning(format!("packages {previous} and {path} both generate {file_name}"))
        .with_suggestion(format!("{path} overwrites the output of {previous}"))
        .with_code("collision")
}

/// Logs the per-definition errors a failure carries. Returns whether
/// anything was rendered.
pub fn render_cli_error(error: &CliError) -> bool {
    match error {
        CliError::Generate { failures } => {
            for failure in failures {
                for diagnostic in generate_diagnostics(failure) {
                    emit_diagnostic(&diagnostic);
                }
                error!("{failure}");
            }
            true
        }
        CliError::Load(gz_golang::LoadError::Packages { failures }) => {
            for failure in failures {
                error!("{failure}");
            }
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gz_core::{CodegenError, Location};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_diagnostics_are_location_prefixed() {
        let location = Location::new("main.go".into(), 12, 2);
        let failures = GenerateErrors {
            package: "example.com/hello".to_string(),
            errors: vec![
                CodegenError::unsupported(&location, "select statement"),
                CodegenError::invariant(&location, "x is sent on a channel without a shared-escape verdict"),
            ],
        };
        let rendered = generate_diagnostics(&failures)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "main.go:12:2: unsupported construct: select statement [unsupported]".to_string(),
                "main.go:12:2: internal invariant violated: x is sent on a channel without a shared-escape verdict [invariant] (hints: this is a compiler bug, please report it)".to_string(),
            ]
        );
    }

    #[test]
    fn test_collision_is_a_warning() {
        let diagnostic = collision_diagnostic("util.zig", "example.com/a/util", "example.com/b/util");
        assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
        assert_eq!(
            diagnostic.to_string(),
            "packages example.com/a/util and example.com/b/util both generate util.zig [collision] (hints: example.com/b/util overwrites the output of example.com/a/util)"
        );
    }

    #[test]
    fn test_only_collected_errors_are_rendered() {
        let io = CliError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!render_cli_error(&io));
        let generate = CliError::Generate { failures: Vec::new() };
        assert!(render_cli_error(&generate));
    }
}
