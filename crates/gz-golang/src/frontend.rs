//! Package discovery: drives the host toolchain over a root pattern and
//! every transitive import, and builds the IR for each package found.

use std::collections::{BTreeMap, BTreeSet};

use gz_core::ir::Package;
use tracing::{debug, info};

use crate::builder::build_package;
use crate::error::{LoadError, LoadFailure, Result};
use crate::host::HostPackage;
use crate::toolchain::HostToolchain;

/// Packages that are never loaded because the runtime library provides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyList {
    exact: BTreeSet<String>,
    prefixes: Vec<String>,
}

impl DenyList {
    pub const DEFAULT: [&'static str; 7] = ["reflect", "testing", "runtime", "os", "syscall", "unsafe", "math"];

    pub fn with_packages(mut self, packages: impl IntoIterator<Item = String>) -> Self {
        self.exact.extend(packages);
        self
    }

    pub fn is_denied(&self, path: &str) -> bool {
        self.exact.contains(path) || self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.exact.iter().map(String::as_str)
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self {
            exact: Self::DEFAULT.iter().map(|name| name.to_string()).collect(),
            prefixes: vec!["internal/".to_string()],
        }
    }
}

/// Every package reachable from the root, with a dependency-first order.
#[derive(Debug, Default)]
pub struct LoadedProgram {
    pub packages: BTreeMap<String, Package>,
    /// Import paths, each one after all of its dependencies.
    pub order: Vec<String>,
}

impl LoadedProgram {
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.order.iter().filter_map(|path| self.packages.get(path))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Registry for one load invocation.
#[derive(Default)]
struct LoadContext {
    visited: BTreeSet<String>,
    program: LoadedProgram,
}

impl LoadContext {
    fn insert(&mut self, package: Package) {
        self.program.order.push(package.path.clone());
        self.program.packages.insert(package.path.clone(), package);
    }
}

/// Go frontend that delegates parsing and type checking to the host.
pub struct GoFrontend<T> {
    toolchain: T,
    deny: DenyList,
}

impl<T: HostToolchain> GoFrontend<T> {
    pub fn new(toolchain: T) -> Self {
        Self {
            toolchain,
            deny: DenyList::default(),
        }
    }

    pub fn with_deny_list(mut self, deny: DenyList) -> Self {
        self.deny = deny;
        self
    }

    pub fn toolchain_ref(&self) -> &T {
        &self.toolchain
    }

    /// Loads the packages matched by `pattern` and everything they import.
    /// In test mode only the test variants of the root packages are kept.
    pub fn load(&self, pattern: &str, tests: bool) -> Result<LoadedProgram> {
        let mut ctx = LoadContext::default();
        let roots = self.load_pattern(&mut ctx, pattern, tests)?;
        if roots == 0 {
            return Err(LoadError::Empty {
                pattern: pattern.to_string(),
            });
        }
        info!(pattern, packages = ctx.program.len(), "loaded packages");
        Ok(ctx.program)
    }

    fn load_pattern(&self, ctx: &mut LoadContext, pattern: &str, tests: bool) -> Result<usize> {
        let hosts = self.toolchain.load(pattern, tests)?;
        check_errors(&hosts)?;

        let mut batch = BTreeMap::new();
        let mut listed = Vec::new();
        for host in hosts {
            if !keep_variant(&host.id, tests) {
                debug!(id = %host.id, "skipping package variant");
                continue;
            }
            if ctx.visited.contains(&host.path) || batch.contains_key(&host.path) {
                continue;
            }
            listed.push(host.path.clone());
            batch.insert(host.path.clone(), host);
        }

        let mut loaded = 0;
        for path in listed {
            loaded += self.load_member(ctx, &mut batch, &path, tests)?;
        }
        Ok(loaded)
    }

    /// Builds one package of a batch after everything it imports. Imports
    /// that are members of the same batch are taken from it, so an external
    /// test package listed first never pulls in the plain variant of the
    /// package under test.
    fn load_member(
        &self,
        ctx: &mut LoadContext,
        batch: &mut BTreeMap<String, HostPackage>,
        path: &str,
        tests: bool,
    ) -> Result<usize> {
        let Some(host) = batch.remove(path) else {
            return Ok(0);
        };
        if !ctx.visited.insert(host.path.clone()) {
            return Ok(0);
        }
        let imports = host
            .imports
            .iter()
            .map(|import| import.path.clone())
            .collect::<Vec<_>>();
        let package = build_package(host, tests)?;

        let mut loaded = 1;
        for import in imports {
            if self.deny.is_denied(&import) {
                debug!(%import, "import provided by the runtime");
                continue;
            }
            if batch.contains_key(&import) {
                loaded += self.load_member(ctx, batch, &import, tests)?;
                continue;
            }
            if ctx.visited.contains(&import) {
                continue;
            }
            self.load_pattern(ctx, &import, false)?;
        }
        ctx.insert(package);
        Ok(loaded)
    }
}

/// Test builds see three variants per package; keep the ones the mode needs.
pub(crate) fn keep_variant(id: &str, tests: bool) -> bool {
    if id.ends_with(".test") {
        return false;
    }
    id.ends_with(".test]") == tests
}

fn check_errors(hosts: &[HostPackage]) -> Result<()> {
    let failures = hosts
        .iter()
        .flat_map(|host| host.errors.iter())
        .map(|error| LoadFailure {
            position: if error.pos.is_empty() {
                "-".to_string()
            } else {
                error.pos.clone()
            },
            message: error.message.clone(),
        })
        .collect::<Vec<_>>();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(LoadError::Packages { failures })
    }
}
