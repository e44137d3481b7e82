use super::{Identifier, Stmt, TypeExpr, Typed};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Type(TypeDefinition),
    Constant(ValueDefinition),
    Variable(ValueDefinition),
    Function(FunctionDefinition),
}

impl Definition {
    pub fn location(&self) -> &Location {
        match self {
            Definition::Type(def) => &def.location,
            Definition::Constant(def) | Definition::Variable(def) => &def.location,
            Definition::Function(def) => &def.location,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Definition::Type(def) => def.doc.as_deref(),
            Definition::Constant(def) | Definition::Variable(def) => def.doc.as_deref(),
            Definition::Function(def) => def.doc.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub location: Location,
    pub doc: Option<String>,
    pub name: Identifier,
    /// `type A = B` rather than `type A B`.
    pub alias: bool,
    pub type_params: Vec<Field>,
    pub ty: TypeExpr,
}

/// `const` and `var` specs: `names [type] = values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDefinition {
    pub location: Location,
    pub doc: Option<String>,
    pub names: Vec<Identifier>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<super::Expr>,
}

impl ValueDefinition {
    pub fn is_global(&self) -> bool {
        self.names.iter().any(|name| name.global)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub location: Location,
    pub doc: Option<String>,
    pub name: Identifier,
    pub receiver: Option<Field>,
    pub func: Function,
    /// Package test entry point (`func TestXxx(t *testing.T)` in test mode).
    pub is_test: bool,
}

impl FunctionDefinition {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Shared by function declarations and function literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub location: Location,
    pub signature: Signature,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub location: Location,
    /// Resolved signature type.
    pub typed: Typed,
    pub type_params: Vec<Field>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub location: Location,
    pub names: Vec<Identifier>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub location: Location,
    pub stmts: Vec<Stmt>,
}
