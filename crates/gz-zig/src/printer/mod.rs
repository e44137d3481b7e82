use std::collections::BTreeSet;

use gz_core::ir::{Definition, Identifier, Package};
use gz_core::{CodegenError, Result, TypeId, TypeTable};
use gz_golang::DenyList;
use thiserror::Error;
use tracing::{debug, trace};

use crate::runtime::RUNTIME_FILE;

mod builtins;
mod call;
mod expr;
mod item;
mod stmt;
mod ty;
mod utils;
mod value;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// File name the runtime library is imported from.
    pub runtime_import: String,
    /// Packages served by the runtime library instead of generated files.
    pub deny: DenyList,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            runtime_import: RUNTIME_FILE.to_string(),
            deny: DenyList::default(),
        }
    }
}

/// Every definition of a package that could not be generated.
#[derive(Debug, Error)]
#[error("{} definition(s) in package {package} failed to generate", errors.len())]
pub struct GenerateErrors {
    pub package: String,
    pub errors: Vec<CodegenError>,
}

/// Public entry point used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct ZigGenerator {
    options: GenerateOptions,
}

impl ZigGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Name of the file the package is generated into, which is also the
    /// name importers refer to it by.
    pub fn file_name(package: &Package) -> String {
        format!("{}.zig", package.name)
    }

    /// Generates the package. Definitions that fail leave no trace in the
    /// output; their errors are returned together.
    pub fn generate(&self, package: &Package) -> Result<String, GenerateErrors> {
        let mut emitter = ZigEmitter::new(package, &self.options);
        emitter.emit_package();
        if emitter.errors.is_empty() {
            Ok(emitter.finish())
        } else {
            Err(GenerateErrors {
                package: package.path.clone(),
                errors: emitter.errors,
            })
        }
    }
}

pub fn generate(package: &Package, options: &GenerateOptions) -> Result<String, GenerateErrors> {
    ZigGenerator::new(options.clone()).generate(package)
}

/// A construct `break` can leave.
#[derive(Debug)]
pub(super) enum Breakable {
    Loop,
    Switch { label: String, used: bool },
}

/// State of the function whose body is being emitted.
#[derive(Debug, Default)]
pub(super) struct FunctionScope {
    pub results: Vec<TypeId>,
    pub named_results: Vec<Identifier>,
    /// Statement nesting below the function body.
    pub depth: usize,
    pub breakables: Vec<Breakable>,
}

struct Checkpoint {
    code: usize,
    indent: usize,
    hoisted: usize,
    init: usize,
    init_calls: usize,
    adapters: BTreeSet<String>,
}

pub(super) struct ZigEmitter<'p> {
    package: &'p Package,
    types: &'p TypeTable,
    options: &'p GenerateOptions,
    /// Names of packages that resolve to `go.<name>`.
    runtime: BTreeSet<String>,
    code: String,
    indent: usize,
    counter: u32,
    scopes: Vec<FunctionScope>,
    /// Package-level declarations produced while emitting a definition.
    hoisted: Vec<String>,
    /// Function adapters already hoisted.
    adapters: BTreeSet<String>,
    /// Statements of `package.init` for variables with dynamic initializers.
    init: Vec<String>,
    /// Go `init` functions, in declaration order.
    init_calls: Vec<String>,
    errors: Vec<CodegenError>,
}

impl<'p> ZigEmitter<'p> {
    pub(super) fn new(package: &'p Package, options: &'p GenerateOptions) -> Self {
        let mut runtime: BTreeSet<String> = options
            .deny
            .packages()
            .map(|path| path.rsplit('/').next().unwrap_or(path).to_string())
            .collect();
        runtime.extend(
            package
                .imports
                .iter()
                .filter(|import| options.deny.is_denied(&import.path))
                .map(|import| import.name.clone()),
        );
        Self {
            package,
            types: &package.types,
            options,
            runtime,
            code: String::new(),
            indent: 0,
            counter: 0,
            scopes: Vec::new(),
            hoisted: Vec::new(),
            adapters: BTreeSet::new(),
            init: Vec::new(),
            init_calls: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn finish(mut self) -> String {
        if !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code
    }

    fn emit_package(&mut self) {
        debug!("generating zig for {}", self.package.path);
        self.emit_header();
        for def in self.package.definitions() {
            self.emit_guarded(def);
        }
        self.emit_package_init();
        debug!(
            "generated {} for {} with {} error(s)",
            ZigGenerator::file_name(self.package),
            self.package.path,
            self.errors.len()
        );
    }

    fn emit_header(&mut self) {
        self.push_comment(&format!("Generated from Go package {}.", self.package.path));
        self.push_line("const std = @import(\"std\");");
        self.push_line(&format!(
            "const go = @import(\"{}\");",
            utils::escape_zig_string(&self.options.runtime_import)
        ));
        let imports: BTreeSet<&str> = self
            .package
            .imports
            .iter()
            .filter(|import| !self.options.deny.is_denied(&import.path))
            .map(|import| import.name.as_str())
            .collect();
        for name in imports {
            self.push_line(&format!(
                "const {} = @import(\"{}.zig\");",
                utils::zig_name(name),
                utils::escape_zig_string(name)
            ));
        }
    }

    /// Emits one definition, or nothing at all when it fails.
    fn emit_guarded(&mut self, def: &Definition) {
        let checkpoint = self.checkpoint();
        self.push_blank_line();
        trace!("emitting definition at {}", def.location());
        match self.emit_definition(def) {
            Ok(()) => {
                for hoisted in std::mem::take(&mut self.hoisted) {
                    self.push_blank_line();
                    self.code.push_str(&hoisted);
                }
            }
            Err(err) => {
                debug!("{err}");
                self.rollback(checkpoint);
                self.errors.push(err);
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            code: self.code.len(),
            indent: self.indent,
            hoisted: self.hoisted.len(),
            init: self.init.len(),
            init_calls: self.init_calls.len(),
            adapters: self.adapters.clone(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.code.truncate(checkpoint.code);
        self.indent = checkpoint.indent;
        self.hoisted.truncate(checkpoint.hoisted);
        self.init.truncate(checkpoint.init);
        self.init_calls.truncate(checkpoint.init_calls);
        self.adapters = checkpoint.adapters;
        self.scopes.clear();
    }

    /// Runs `emit` against an empty buffer and returns what it wrote.
    fn capture<T>(&mut self, indent: usize, emit: impl FnOnce(&mut Self) -> Result<T>) -> Result<(String, T)> {
        let saved_code = std::mem::take(&mut self.code);
        let saved_indent = std::mem::replace(&mut self.indent, indent);
        let result = emit(self);
        let captured = std::mem::replace(&mut self.code, saved_code);
        self.indent = saved_indent;
        result.map(|value| (captured, value))
    }

    /// A new temporary name, unique within the package.
    fn fresh(&mut self, prefix: &str) -> String {
        self.counter += 1;
        utils::quote(&format!("{prefix}.{}", self.counter))
    }

    fn scope(&mut self) -> Option<&mut FunctionScope> {
        self.scopes.last_mut()
    }

    fn is_runtime(&self, package: &str) -> bool {
        self.runtime.contains(package)
    }

    /// Prefix for names declared in `package`: empty for the package being
    /// generated.
    fn package_prefix(&self, package: Option<&str>) -> String {
        match package {
            Some(package) if package != self.package.name => {
                if self.is_runtime(package) {
                    format!("go.{}.", utils::zig_name(package))
                } else {
                    format!("{}.", utils::zig_name(package))
                }
            }
            _ => String::new(),
        }
    }

    fn push_comment(&mut self, message: &str) {
        for line in message.lines() {
            self.push_line(&format!("// {}", line.trim()));
        }
    }

    fn push_blank_line(&mut self) {
        if self.code.ends_with("\n\n") || self.code.is_empty() {
            return;
        }
        if !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.push('\n');
    }

    fn push_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.code.push_str("    ");
        }
        self.code.push_str(line);
        self.code.push('\n');
    }
}
