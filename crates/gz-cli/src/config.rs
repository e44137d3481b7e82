//! CLI configuration and settings management

use crate::{CliError, Result};
use eyre::WrapErr;
use gz_golang::CommandToolchain;
use gz_zig::runtime::RUNTIME_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG: &str = "gozig.toml";

/// Configuration loaded from a TOML file, with defaults for every key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GzConfig {
    pub toolchain: ToolchainConfig,
    pub output: OutputConfig,
    pub codegen: CodegenConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Program that dumps resolved packages as JSON
    pub program: String,

    /// Extra arguments passed before the pattern
    pub args: Vec<String>,

    /// Read recorded dumps from this directory instead of running `program`
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the source directory
    pub directory: String,

    /// Name the runtime library is written and imported under
    pub runtime_file: String,

    /// Also write `build.zig` and `build.zig.zon`
    pub build_files: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Import paths served by the runtime in addition to the built-in list
    pub deny: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: CommandToolchain::DEFAULT_PROGRAM.to_string(),
            args: Vec::new(),
            snapshot: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".zig".to_string(),
            runtime_file: RUNTIME_FILE.to_string(),
            build_files: true,
        }
    }
}

impl GzConfig {
    /// Loads `config_path`, or the first config file found in the standard
    /// locations, or the defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "using config file");
                return Self::load_from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Working directory first, then the home directory, then the user
    /// config directory.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".gozig.toml"));
        }
        paths.extend(Self::default_config_path());
        paths
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::read(path).map_err(|err| CliError::Config(format!("{err:#}")))
    }

    fn read(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content).wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gozig").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = GzConfig::default();
        assert_eq!(config.toolchain.program, "gozig-dump");
        assert_eq!(config.output.directory, ".zig");
        assert_eq!(config.output.runtime_file, "go.zig");
        assert!(config.output.build_files);
        assert!(config.codegen.deny.is_empty());
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut config = GzConfig::default();
        config.toolchain.args = vec!["-tags".to_string(), "purego".to_string()];
        config.toolchain.snapshot = Some(PathBuf::from("snapshots"));
        config.codegen.deny = vec!["sync/atomic".to_string()];
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded = GzConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gozig.toml");
        std::fs::write(&path, "[output]\ndirectory = \"zig-out\"\n").unwrap();

        let config = GzConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output.directory, "zig-out");
        assert_eq!(config.output.runtime_file, "go.zig");
        assert_eq!(config.toolchain, ToolchainConfig::default());
    }

    #[test]
    fn test_malformed_file_names_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[output\n").unwrap();

        let err = GzConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("broken.toml"), "{err}");
    }
}
