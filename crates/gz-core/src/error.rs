use crate::location::Location;
use std::result;
use thiserror::Error;

/// Failure while generating target code for one top-level definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// The IR contains a shape the generator cannot lower. Fatal for the
    /// enclosing definition only.
    #[error("{location}: unsupported construct: {construct}")]
    UnsupportedConstruct { location: Location, construct: String },
    /// A contract between stages was broken, e.g. a node without its
    /// resolved type.
    #[error("{location}: internal invariant violated: {message}")]
    InternalInvariant { location: Location, message: String },
}

impl CodegenError {
    pub fn unsupported(location: &Location, construct: impl Into<String>) -> Self {
        CodegenError::UnsupportedConstruct {
            location: location.clone(),
            construct: construct.into(),
        }
    }

    pub fn invariant(location: &Location, message: impl Into<String>) -> Self {
        CodegenError::InternalInvariant {
            location: location.clone(),
            message: message.into(),
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            CodegenError::UnsupportedConstruct { location, .. }
            | CodegenError::InternalInvariant { location, .. } => location,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CodegenError::UnsupportedConstruct { .. } => "unsupported",
            CodegenError::InternalInvariant { .. } => "invariant",
        }
    }
}

pub type Result<T, E = CodegenError> = result::Result<T, E>;
