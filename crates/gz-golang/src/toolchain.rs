//! Adapters for the external host toolchain that parses and type-checks Go.

use crate::error::{LoadError, Result};
use crate::host::HostPackage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

/// Produces resolved package dumps for an import pattern.
pub trait HostToolchain {
    fn load(&self, pattern: &str, tests: bool) -> Result<Vec<HostPackage>>;
}

impl<T: HostToolchain + ?Sized> HostToolchain for Box<T> {
    fn load(&self, pattern: &str, tests: bool) -> Result<Vec<HostPackage>> {
        (**self).load(pattern, tests)
    }
}

fn decode(pattern: &str, bytes: &[u8]) -> Result<Vec<HostPackage>> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Decode {
        pattern: pattern.to_string(),
        source,
    })
}

/// Runs a dump program (by default `gozig-dump`) that prints the JSON package
/// array for `[args..] [-test] <pattern>` on stdout.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    program: PathBuf,
    args: Vec<String>,
    dir: PathBuf,
}

impl CommandToolchain {
    pub const DEFAULT_PROGRAM: &'static str = "gozig-dump";

    pub fn new(program: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }
}

impl HostToolchain for CommandToolchain {
    fn load(&self, pattern: &str, tests: bool) -> Result<Vec<HostPackage>> {
        let program = self.program.display().to_string();
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.dir);
        if tests {
            command.arg("-test");
        }
        command.arg(pattern);
        debug!(%program, pattern, tests, "invoking host toolchain");

        let output = command.output().map_err(|source| LoadError::Spawn {
            program: program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(LoadError::Toolchain {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        trace!(bytes = output.stdout.len(), "host toolchain output");
        decode(pattern, &output.stdout)
    }
}

/// Reads package dumps recorded earlier, one file per pattern.
#[derive(Debug, Clone)]
pub struct SnapshotToolchain {
    dir: PathBuf,
}

impl SnapshotToolchain {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `.` maps to `root.json`, `example.com/a/b` to `example.com.a.b.json`,
    /// test variants get a `.test` suffix before the extension.
    pub fn file_name(pattern: &str, tests: bool) -> String {
        let trimmed = pattern.trim_start_matches("./").trim_matches('/');
        let base = if trimmed.is_empty() || trimmed == "." {
            "root".to_string()
        } else {
            trimmed.replace(['/', '\\'], ".")
        };
        if tests {
            format!("{base}.test.json")
        } else {
            format!("{base}.json")
        }
    }

    pub fn path_for(&self, pattern: &str, tests: bool) -> PathBuf {
        self.dir.join(Self::file_name(pattern, tests))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl HostToolchain for SnapshotToolchain {
    fn load(&self, pattern: &str, tests: bool) -> Result<Vec<HostPackage>> {
        let path = self.path_for(pattern, tests);
        debug!(path = %path.display(), "reading package snapshot");
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Snapshot { path, source })?;
        decode(pattern, &bytes)
    }
}
