//! The typed intermediate representation.
//!
//! A [`Package`] is built once per compile by the loader, annotated in place
//! by the escape analyzer (through the write-once [`Identifier::escapes`]
//! cells) and then consumed read-only by the code generator.

mod expr;
mod item;
mod stmt;
pub mod visit;

pub use expr::*;
pub use item::*;
pub use stmt::*;

use crate::escape::EscapeState;
use crate::id::NodeId;
use crate::location::Location;
use crate::types::{TypeId, TypeTable};
use crate::value::ConstValue;
use once_cell::unsync::OnceCell;
use std::sync::Arc;

/// Resolved static type and constant value of an expression or type node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typed {
    pub ty: Option<TypeId>,
    pub constant: Option<ConstValue>,
}

impl Typed {
    pub fn of(ty: TypeId) -> Self {
        Self {
            ty: Some(ty),
            constant: None,
        }
    }

    pub fn constant(ty: TypeId, value: ConstValue) -> Self {
        Self {
            ty: Some(ty),
            constant: Some(value),
        }
    }
}

/// One occurrence of a name, declaring or using.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub id: NodeId,
    pub location: Location,
    pub typed: Typed,
    pub name: String,
    /// Identity of the declared object; `None` for `_` and for labels.
    pub binding: Option<NodeId>,
    /// This occurrence introduces the binding.
    pub declares: bool,
    /// Number of enclosing declarations of the same name this one shadows.
    pub shadow: u32,
    /// Declared at package scope.
    pub global: bool,
    /// Names a method rather than a plain function.
    pub method: bool,
    /// Declaring package, when it differs from the one being compiled.
    pub package: Option<String>,
    /// Filled by the escape analyzer, read by the generator.
    pub escapes: OnceCell<EscapeState>,
}

impl Identifier {
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }

    /// Verdict recorded by the analyzer, `NoEscape` when none was recorded.
    pub fn escape(&self) -> EscapeState {
        self.escapes.get().copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub path: String,
    /// Built from the test variant of the package.
    pub test: bool,
    pub files: Vec<File>,
    pub types: TypeTable,
    /// Every package this one depends on.
    pub imports: Vec<ImportedPackage>,
    /// Number of node ids handed out while building, an upper bound for
    /// every [`NodeId`] inside.
    pub node_count: u32,
}

impl Package {
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.files.iter().flat_map(|file| file.definitions.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportedPackage {
    pub path: String,
    /// Declared package name, which is also the name generated code uses.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub path: Arc<str>,
    pub doc: Option<String>,
    pub imports: Vec<Import>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub location: Location,
    pub rename: Option<String>,
    pub path: String,
}
