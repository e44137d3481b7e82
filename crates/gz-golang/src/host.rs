//! Wire format of the host toolchain's package dumps.
//!
//! The dump tool walks the host AST after type checking and prints one JSON
//! array of packages. Every expression carries its resolved type (an index
//! into the package type table), its constant value when it has one, and
//! whether it denotes a type. Identifiers carry the object they resolve to.

use gz_core::types::{ChanDir, TypeId, TypeTable};
use gz_core::ConstValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeAndValue {
    #[serde(rename = "type", default)]
    pub ty: Option<TypeId>,
    #[serde(default)]
    pub value: Option<ConstValue>,
    #[serde(default)]
    pub is_type: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostPackage {
    /// go/packages id, e.g. `example.com/p [example.com/p.test]`.
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub imports: Vec<HostImportedPackage>,
    #[serde(default)]
    pub types: TypeTable,
    #[serde(default)]
    pub errors: Vec<HostError>,
    #[serde(default)]
    pub files: Vec<HostFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostImportedPackage {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostError {
    #[serde(default)]
    pub pos: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFile {
    pub path: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub imports: Vec<HostImport>,
    #[serde(default)]
    pub decls: Vec<HostDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostImport {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub name: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Var,
    Const,
    TypeName,
    Func,
    PkgName,
    Builtin,
    Nil,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostObject {
    /// Unique per dump.
    pub id: u64,
    pub kind: ObjectKind,
    /// Name of the declaring package.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub shadow: u32,
    /// Declared at package scope.
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub method: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostIdent {
    #[serde(default)]
    pub pos: Pos,
    pub name: String,
    #[serde(default)]
    pub tv: TypeAndValue,
    #[serde(default)]
    pub obj: Option<HostObject>,
    /// Defining occurrence.
    #[serde(default)]
    pub def: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostDecl {
    Func(HostFuncDecl),
    Gen(HostGenDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenToken {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostGenDecl {
    #[serde(default)]
    pub pos: Pos,
    pub token: GenToken,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub specs: Vec<HostSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostSpec {
    Value {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        doc: Option<String>,
        names: Vec<HostIdent>,
        #[serde(rename = "type", default)]
        ty: Option<HostExpr>,
        #[serde(default)]
        values: Vec<HostExpr>,
    },
    Type {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        doc: Option<String>,
        name: HostIdent,
        #[serde(default)]
        assign: bool,
        #[serde(default)]
        type_params: Vec<HostField>,
        #[serde(rename = "type")]
        ty: HostExpr,
    },
    Import(HostImport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFuncDecl {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub recv: Option<HostField>,
    pub name: HostIdent,
    #[serde(rename = "type")]
    pub ty: HostFuncType,
    #[serde(default)]
    pub body: Option<HostBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFuncType {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub tv: TypeAndValue,
    #[serde(default)]
    pub type_params: Vec<HostField>,
    #[serde(default)]
    pub params: Vec<HostField>,
    #[serde(default)]
    pub results: Vec<HostField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostField {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub names: Vec<HostIdent>,
    #[serde(rename = "type")]
    pub ty: HostExpr,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostBlock {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub stmts: Vec<HostStmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCaseClause {
    #[serde(default)]
    pub pos: Pos,
    /// Empty for `default`.
    #[serde(default)]
    pub list: Vec<HostExpr>,
    #[serde(default)]
    pub body: Vec<HostStmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCommClause {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub comm: Option<Box<HostStmt>>,
    #[serde(default)]
    pub body: Vec<HostStmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostStmt {
    Decl {
        #[serde(default)]
        pos: Pos,
        decl: HostGenDecl,
    },
    Empty {
        #[serde(default)]
        pos: Pos,
    },
    Labeled {
        #[serde(default)]
        pos: Pos,
        label: HostIdent,
        stmt: Box<HostStmt>,
    },
    Expr {
        #[serde(default)]
        pos: Pos,
        x: HostExpr,
    },
    Send {
        #[serde(default)]
        pos: Pos,
        chan: HostExpr,
        value: HostExpr,
    },
    IncDec {
        #[serde(default)]
        pos: Pos,
        x: HostExpr,
        inc: bool,
    },
    Assign {
        #[serde(default)]
        pos: Pos,
        lhs: Vec<HostExpr>,
        tok: String,
        rhs: Vec<HostExpr>,
    },
    Go {
        #[serde(default)]
        pos: Pos,
        call: HostExpr,
    },
    Defer {
        #[serde(default)]
        pos: Pos,
        call: HostExpr,
    },
    Return {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        results: Vec<HostExpr>,
    },
    Branch {
        #[serde(default)]
        pos: Pos,
        tok: String,
        #[serde(default)]
        label: Option<HostIdent>,
    },
    Block(HostBlock),
    If {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        init: Option<Box<HostStmt>>,
        cond: HostExpr,
        body: HostBlock,
        #[serde(rename = "else", default)]
        otherwise: Option<Box<HostStmt>>,
    },
    Switch {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        init: Option<Box<HostStmt>>,
        #[serde(default)]
        tag: Option<HostExpr>,
        #[serde(default)]
        body: Vec<HostCaseClause>,
    },
    TypeSwitch {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        init: Option<Box<HostStmt>>,
        assign: Box<HostStmt>,
        #[serde(default)]
        body: Vec<HostCaseClause>,
    },
    Select {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        body: Vec<HostCommClause>,
    },
    For {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        init: Option<Box<HostStmt>>,
        #[serde(default)]
        cond: Option<HostExpr>,
        #[serde(default)]
        post: Option<Box<HostStmt>>,
        body: HostBlock,
    },
    Range {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        key: Option<HostExpr>,
        #[serde(default)]
        value: Option<HostExpr>,
        /// `:=`, `=` or empty.
        #[serde(default)]
        tok: String,
        x: HostExpr,
        body: HostBlock,
    },
}

impl HostStmt {
    pub fn pos(&self) -> Pos {
        match self {
            HostStmt::Decl { pos, .. }
            | HostStmt::Empty { pos }
            | HostStmt::Labeled { pos, .. }
            | HostStmt::Expr { pos, .. }
            | HostStmt::Send { pos, .. }
            | HostStmt::IncDec { pos, .. }
            | HostStmt::Assign { pos, .. }
            | HostStmt::Go { pos, .. }
            | HostStmt::Defer { pos, .. }
            | HostStmt::Return { pos, .. }
            | HostStmt::Branch { pos, .. }
            | HostStmt::If { pos, .. }
            | HostStmt::Switch { pos, .. }
            | HostStmt::TypeSwitch { pos, .. }
            | HostStmt::Select { pos, .. }
            | HostStmt::For { pos, .. }
            | HostStmt::Range { pos, .. } => *pos,
            HostStmt::Block(block) => block.pos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSelectionKind {
    Field,
    Method,
    MethodExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSelection {
    pub kind: HostSelectionKind,
    #[serde(default)]
    pub index: Vec<usize>,
    #[serde(default)]
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostExpr {
    Ident(HostIdent),
    BasicLit {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        /// `INT`, `FLOAT`, `IMAG`, `CHAR` or `STRING`.
        lit: String,
        value: String,
    },
    CompositeLit {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(rename = "type", default)]
        ty: Option<Box<HostExpr>>,
        #[serde(default)]
        elts: Vec<HostExpr>,
    },
    FuncLit {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(rename = "type")]
        ty: HostFuncType,
        body: HostBlock,
    },
    Paren {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
    },
    Selector {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
        sel: HostIdent,
        /// Absent for package-qualified identifiers.
        #[serde(default)]
        selection: Option<HostSelection>,
    },
    Index {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
        index: Box<HostExpr>,
    },
    IndexList {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
        indices: Vec<HostExpr>,
    },
    Slice {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
        #[serde(default)]
        low: Option<Box<HostExpr>>,
        #[serde(default)]
        high: Option<Box<HostExpr>>,
        #[serde(default)]
        max: Option<Box<HostExpr>>,
    },
    TypeAssert {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
        /// Absent in `x.(type)`.
        #[serde(rename = "type", default)]
        ty: Option<Box<HostExpr>>,
    },
    Call {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        fun: Box<HostExpr>,
        #[serde(default)]
        args: Vec<HostExpr>,
        #[serde(default)]
        ellipsis: bool,
    },
    Star {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        x: Box<HostExpr>,
    },
    Unary {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        op: String,
        x: Box<HostExpr>,
    },
    Binary {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        op: String,
        x: Box<HostExpr>,
        y: Box<HostExpr>,
    },
    KeyValue {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        key: Box<HostExpr>,
        value: Box<HostExpr>,
    },
    ArrayType {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(default)]
        len: Option<Box<HostExpr>>,
        elt: Box<HostExpr>,
    },
    StructType {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(default)]
        fields: Vec<HostField>,
    },
    FuncType(HostFuncType),
    InterfaceType {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(default)]
        methods: Vec<HostField>,
    },
    MapType {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        key: Box<HostExpr>,
        value: Box<HostExpr>,
    },
    ChanType {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(default)]
        dir: ChanDir,
        value: Box<HostExpr>,
    },
    Ellipsis {
        #[serde(default)]
        pos: Pos,
        #[serde(default)]
        tv: TypeAndValue,
        #[serde(default)]
        elt: Option<Box<HostExpr>>,
    },
}

impl HostExpr {
    pub fn pos(&self) -> Pos {
        match self {
            HostExpr::Ident(ident) => ident.pos,
            HostExpr::FuncType(func) => func.pos,
            HostExpr::BasicLit { pos, .. }
            | HostExpr::CompositeLit { pos, .. }
            | HostExpr::FuncLit { pos, .. }
            | HostExpr::Paren { pos, .. }
            | HostExpr::Selector { pos, .. }
            | HostExpr::Index { pos, .. }
            | HostExpr::IndexList { pos, .. }
            | HostExpr::Slice { pos, .. }
            | HostExpr::TypeAssert { pos, .. }
            | HostExpr::Call { pos, .. }
            | HostExpr::Star { pos, .. }
            | HostExpr::Unary { pos, .. }
            | HostExpr::Binary { pos, .. }
            | HostExpr::KeyValue { pos, .. }
            | HostExpr::ArrayType { pos, .. }
            | HostExpr::StructType { pos, .. }
            | HostExpr::InterfaceType { pos, .. }
            | HostExpr::MapType { pos, .. }
            | HostExpr::ChanType { pos, .. }
            | HostExpr::Ellipsis { pos, .. } => *pos,
        }
    }

    pub fn tv(&self) -> &TypeAndValue {
        match self {
            HostExpr::Ident(ident) => &ident.tv,
            HostExpr::FuncType(func) => &func.tv,
            HostExpr::BasicLit { tv, .. }
            | HostExpr::CompositeLit { tv, .. }
            | HostExpr::FuncLit { tv, .. }
            | HostExpr::Paren { tv, .. }
            | HostExpr::Selector { tv, .. }
            | HostExpr::Index { tv, .. }
            | HostExpr::IndexList { tv, .. }
            | HostExpr::Slice { tv, .. }
            | HostExpr::TypeAssert { tv, .. }
            | HostExpr::Call { tv, .. }
            | HostExpr::Star { tv, .. }
            | HostExpr::Unary { tv, .. }
            | HostExpr::Binary { tv, .. }
            | HostExpr::KeyValue { tv, .. }
            | HostExpr::ArrayType { tv, .. }
            | HostExpr::StructType { tv, .. }
            | HostExpr::InterfaceType { tv, .. }
            | HostExpr::MapType { tv, .. }
            | HostExpr::ChanType { tv, .. }
            | HostExpr::Ellipsis { tv, .. } => tv,
        }
    }
}
