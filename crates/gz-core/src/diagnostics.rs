use crate::error::CodegenError;
use crate::location::Location;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl Display for DiagnosticLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Warning => f.write_str("warning"),
            DiagnosticLevel::Error => f.write_str("error"),
        }
    }
}

/// A user facing message, optionally anchored to a source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub location: Option<Location>,
    pub suggestions: Vec<String>,
    pub code: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            location: None,
            suggestions: Vec::new(),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Renders as `<file>:<line>:<column>: <message>`, the format editors pick up.
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, " (hints: {})", self.suggestions.join("; "))?;
        }
        Ok(())
    }
}

impl From<&CodegenError> for Diagnostic {
    fn from(error: &CodegenError) -> Self {
        let message = match error {
            CodegenError::UnsupportedConstruct { construct, .. } => {
                format!("unsupported construct: {construct}")
            }
            CodegenError::InternalInvariant { message, .. } => {
                format!("internal invariant violated: {message}")
            }
        };
        let diagnostic = Diagnostic::error(message)
            .with_location(error.location().clone())
            .with_code(error.code());
        match error {
            CodegenError::InternalInvariant { .. } => {
                diagnostic.with_suggestion("this is a compiler bug, please report it")
            }
            CodegenError::UnsupportedConstruct { .. } => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_location_prefix() {
        let location = Location::new("main.go".into(), 7, 3);
        let error = CodegenError::unsupported(&location, "select statement");
        assert_eq!(error.to_string(), "main.go:7:3: unsupported construct: select statement");
        assert_eq!(
            Diagnostic::from(&error).to_string(),
            "main.go:7:3: unsupported construct: select statement [unsupported]"
        );
    }
}
