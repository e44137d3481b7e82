use super::{Field, Function, Identifier, Signature, Typed};
use crate::id::NodeId;
use crate::location::Location;
use crate::types::{ChanDir, TypeId};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub location: Location,
    pub typed: Typed,
    pub kind: ExprKind,
}

impl Expr {
    pub fn ty(&self) -> Option<TypeId> {
        self.typed.ty
    }

    /// Skips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    /// The identifier when this is a plain (possibly parenthesised) variable.
    pub fn as_variable(&self) -> Option<&Identifier> {
        match &self.unparen().kind {
            ExprKind::Variable(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_variable().is_some_and(Identifier::is_blank)
    }

    /// The variable at the bottom of a chain of field, index and dereference
    /// operations.
    pub fn root_variable(&self) -> Option<&Identifier> {
        match &self.kind {
            ExprKind::Variable(ident) => Some(ident),
            ExprKind::Paren(inner) | ExprKind::Deref(inner) => inner.root_variable(),
            ExprKind::Selector(selector) => selector.target.root_variable(),
            ExprKind::Index { target, .. } | ExprKind::Slice { target, .. } => target.root_variable(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Variable(Identifier),
    Constant(Identifier),
    Function(Identifier),
    Package(Identifier),
    Builtin(Identifier),
    Nil,
    /// An expression position that denotes a type: conversions, `make`.
    Type(TypeExpr),
    Literal(Literal),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call(CallExpr),
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// Generic instantiation `f[A, B]`.
    Indices {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        target: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    Selector(SelectorExpr),
    Deref(Box<Expr>),
    Composite {
        ty: Option<TypeExpr>,
        elements: Vec<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FunctionLit(Function),
    TypeAssertion {
        target: Box<Expr>,
        ty: Option<TypeExpr>,
    },
    Receive(Box<Expr>),
    Paren(Box<Expr>),
}

impl ExprKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Variable(_) => "variable",
            ExprKind::Constant(_) => "constant",
            ExprKind::Function(_) => "function",
            ExprKind::Package(_) => "package name",
            ExprKind::Builtin(_) => "builtin",
            ExprKind::Nil => "nil",
            ExprKind::Type(_) => "type expression",
            ExprKind::Literal(_) => "literal",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Call(_) => "call",
            ExprKind::Index { .. } => "index expression",
            ExprKind::Indices { .. } => "generic instantiation",
            ExprKind::Slice { .. } => "slice expression",
            ExprKind::Selector(_) => "selector",
            ExprKind::Deref(_) => "dereference",
            ExprKind::Composite { .. } => "composite literal",
            ExprKind::KeyValue { .. } => "key-value pair",
            ExprKind::FunctionLit(_) => "function literal",
            ExprKind::TypeAssertion { .. } => "type assertion",
            ExprKind::Receive(_) => "channel receive",
            ExprKind::Paren(_) => "parenthesised expression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Source spelling, quotes included.
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
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
    LogicalAnd,
    LogicalOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    /// `^x`
    Complement,
    /// `&x`
    Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    /// The last argument is spread with `...`.
    pub ellipsis: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// `pkg.Name`
    Qualified,
    Field,
    Method,
    /// `T.Method`
    MethodExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub target: Box<Expr>,
    pub field: Identifier,
    pub kind: SelectionKind,
    /// Field indices walked through embedded structs; the last entry is the
    /// selected field or method.
    pub path: Vec<usize>,
    /// The selection goes through at least one pointer indirection.
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub id: NodeId,
    pub location: Location,
    pub typed: Typed,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    Named {
        package: Option<String>,
        name: Identifier,
    },
    Pointer(Box<TypeExpr>),
    Array {
        len: Option<Box<Expr>>,
        elem: Box<TypeExpr>,
    },
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Function(Box<Signature>),
    Interface(Vec<Field>),
    Struct(Vec<Field>),
    /// `...T` in a parameter list.
    Variadic(Box<TypeExpr>),
    /// Generic instantiation `T[A]`.
    Instance {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
}
