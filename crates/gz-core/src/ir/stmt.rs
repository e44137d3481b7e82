use super::{Block, Definition, Expr, Identifier};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub location: Location,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Block),
    Assign(AssignStmt),
    IncDec { target: Expr, increment: bool },
    Expr(Expr),
    Empty,
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(SelectStmt),
    Send { channel: Expr, value: Expr },
    /// Operand is always a call expression.
    Go(Expr),
    /// Operand is always a call expression.
    Defer(Expr),
    Return(Vec<Expr>),
    Branch { kind: BranchKind, label: Option<Identifier> },
    Label { label: Identifier, stmt: Box<Stmt> },
    Declaration(Vec<Definition>),
}

impl StmtKind {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::Block(_) => "block",
            StmtKind::Assign(_) => "assignment",
            StmtKind::IncDec { .. } => "increment statement",
            StmtKind::Expr(_) => "expression statement",
            StmtKind::Empty => "empty statement",
            StmtKind::If(_) => "if statement",
            StmtKind::For(_) => "for statement",
            StmtKind::Range(_) => "range statement",
            StmtKind::Switch(_) => "switch statement",
            StmtKind::TypeSwitch(_) => "type switch",
            StmtKind::Select(_) => "select statement",
            StmtKind::Send { .. } => "send statement",
            StmtKind::Go(_) => "go statement",
            StmtKind::Defer(_) => "defer statement",
            StmtKind::Return(_) => "return statement",
            StmtKind::Branch { .. } => "branch statement",
            StmtKind::Label { .. } => "labeled statement",
            StmtKind::Declaration(_) => "declaration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    /// The binary operator a compound assignment applies.
    pub fn binary(self) -> Option<super::BinaryOp> {
        use super::BinaryOp;
        Some(match self {
            AssignOp::Assign | AssignOp::Define => return None,
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::Rem => BinaryOp::Rem,
            AssignOp::And => BinaryOp::And,
            AssignOp::Or => BinaryOp::Or,
            AssignOp::Xor => BinaryOp::Xor,
            AssignOp::Shl => BinaryOp::Shl,
            AssignOp::Shr => BinaryOp::Shr,
            AssignOp::AndNot => BinaryOp::AndNot,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: AssignOp,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    /// Either another `if` or a block.
    pub otherwise: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `for k, v := range` rather than `for k, v = range`.
    pub define: bool,
    pub subject: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub location: Location,
    /// Empty for `default`.
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub binding: Option<Identifier>,
    pub subject: Expr,
    pub clauses: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub clauses: Vec<CommClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    pub location: Location,
    /// Send or receive statement; `None` for `default`.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}
