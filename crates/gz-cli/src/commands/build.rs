//! `gz build` and `gz test`: load, analyse and generate every package of a
//! Go module, then write the runtime library next to the output.

use crate::diagnostics::{collision_diagnostic, emit_diagnostic};
use crate::{config::GzConfig, CliError, Result};
use clap::Args;
use gz_golang::{CommandToolchain, DenyList, GoFrontend, HostToolchain, SnapshotToolchain};
use gz_zig::{runtime, GenerateOptions, ZigGenerator};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Import pattern of the module root, relative to the source directory.
const ROOT_PATTERN: &str = ".";

/// Arguments shared by `build` and `test`.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Directory holding the Go sources
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Output directory (defaults to `<DIR>/.zig`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read recorded package dumps from this directory instead of running
    /// the host toolchain
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Program that dumps resolved packages as JSON
    #[arg(long)]
    pub toolchain: Option<PathBuf>,

    /// Print the escape verdict of every local variable
    #[arg(long)]
    pub escapes: bool,
}

impl BuildArgs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            output: None,
            snapshot: None,
            toolchain: None,
            escapes: false,
        }
    }
}

/// What a successful run wrote.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub output: PathBuf,
    /// Import paths of the generated packages, dependencies first.
    pub packages: Vec<String>,
    pub files: Vec<PathBuf>,
}

pub async fn build_command(args: BuildArgs, config: &GzConfig) -> Result<BuildSummary> {
    transpile(args, config, false).await
}

/// Like `build`, but loads the test variants so `zig build test` runs the
/// Go tests.
pub async fn test_command(args: BuildArgs, config: &GzConfig) -> Result<BuildSummary> {
    transpile(args, config, true).await
}

fn toolchain(args: &BuildArgs, config: &GzConfig) -> Box<dyn HostToolchain> {
    if let Some(snapshot) = args.snapshot.as_ref().or(config.toolchain.snapshot.as_ref()) {
        debug!(dir = %snapshot.display(), "loading from snapshots");
        return Box::new(SnapshotToolchain::new(snapshot));
    }
    let program = args
        .toolchain
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.toolchain.program));
    Box::new(CommandToolchain::new(program, &args.dir).with_args(config.toolchain.args.iter().cloned()))
}

async fn transpile(args: BuildArgs, config: &GzConfig, tests: bool) -> Result<BuildSummary> {
    let deny = DenyList::default().with_packages(config.codegen.deny.iter().cloned());
    let frontend = GoFrontend::new(toolchain(&args, config)).with_deny_list(deny.clone());
    let program = frontend.load(ROOT_PATTERN, tests)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.dir.join(&config.output.directory));
    tokio::fs::create_dir_all(&output).await?;

    let generator = ZigGenerator::new(GenerateOptions {
        runtime_import: config.output.runtime_file.clone(),
        deny,
    });
    let mut summary = BuildSummary {
        output: output.clone(),
        ..BuildSummary::default()
    };
    let mut failures = Vec::new();
    let mut names = std::collections::BTreeMap::new();

    for package in program.iter() {
        let report = gz_escape::analyze(package);
        if args.escapes {
            println!("# {}", package.path);
            for entry in report.iter() {
                println!("{entry}");
            }
        }
        let file_name = ZigGenerator::file_name(package);
        if let Some(previous) = names.insert(file_name.clone(), package.path.clone()) {
            emit_diagnostic(&collision_diagnostic(&file_name, &previous, &package.path));
        }
        match generator.generate(package) {
            Ok(code) => {
                let path = output.join(&file_name);
                tokio::fs::write(&path, code).await?;
                info!(package = %package.path, file = %path.display(), "generated");
                summary.packages.push(package.path.clone());
                summary.files.push(path);
            }
            Err(errors) => {
                warn!(package = %package.path, errors = errors.errors.len(), "generation failed");
                failures.push(errors);
            }
        }
    }

    summary.files.extend(write_runtime(&output, config).await?);
    if failures.is_empty() {
        Ok(summary)
    } else {
        Err(CliError::Generate { failures })
    }
}

async fn write_runtime(output: &Path, config: &GzConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in runtime::files() {
        let name = if file.build {
            if !config.output.build_files {
                continue;
            }
            file.name
        } else {
            config.output.runtime_file.as_str()
        };
        let path = output.join(name);
        tokio::fs::write(&path, file.contents).await?;
        written.push(path);
    }
    Ok(written)
}
