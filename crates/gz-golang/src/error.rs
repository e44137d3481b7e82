use gz_core::Location;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single problem the host toolchain reported while type-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// `file:line:column` as the host spelled it, or `-` when unknown.
    pub position: String,
    pub message: String,
}

impl Display for LoadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Discovery or type-check failure. Always fatal for the whole run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to run host toolchain `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("host toolchain `{program}` exited with {status}: {stderr}")]
    Toolchain {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("failed to read package snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed host output for `{pattern}`: {source}")]
    Decode {
        pattern: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{location}: malformed host node: {message}")]
    Malformed { location: Location, message: String },
    #[error("no packages matched `{pattern}`")]
    Empty { pattern: String },
    #[error("packages failed to load:\n{}", failures.iter().join("\n"))]
    Packages { failures: Vec<LoadFailure> },
}

impl LoadError {
    pub fn malformed(location: &Location, message: impl Into<String>) -> Self {
        LoadError::Malformed {
            location: location.clone(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
