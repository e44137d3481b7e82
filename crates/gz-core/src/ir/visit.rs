//! Read-only traversal of the IR.
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to keep descending.

use super::*;

pub trait Visitor: Sized {
    fn visit_definition(&mut self, def: &Definition) {
        walk_definition(self, def)
    }

    fn visit_function(&mut self, func: &Function) {
        walk_function(self, func)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr)
    }

    fn visit_type_expr(&mut self, ty: &TypeExpr) {
        walk_type_expr(self, ty)
    }

    fn visit_identifier(&mut self, _ident: &Identifier) {}
}

pub fn walk_package<V: Visitor>(visitor: &mut V, package: &Package) {
    for def in package.definitions() {
        visitor.visit_definition(def);
    }
}

pub fn walk_definition<V: Visitor>(visitor: &mut V, def: &Definition) {
    match def {
        Definition::Type(def) => {
            visitor.visit_identifier(&def.name);
            visitor.visit_type_expr(&def.ty);
        }
        Definition::Constant(def) | Definition::Variable(def) => {
            for name in &def.names {
                visitor.visit_identifier(name);
            }
            if let Some(ty) = &def.ty {
                visitor.visit_type_expr(ty);
            }
            for value in &def.values {
                visitor.visit_expr(value);
            }
        }
        Definition::Function(def) => {
            visitor.visit_identifier(&def.name);
            if let Some(receiver) = &def.receiver {
                walk_field(visitor, receiver);
            }
            visitor.visit_function(&def.func);
        }
    }
}

pub fn walk_field<V: Visitor>(visitor: &mut V, field: &Field) {
    for name in &field.names {
        visitor.visit_identifier(name);
    }
    visitor.visit_type_expr(&field.ty);
}

pub fn walk_signature<V: Visitor>(visitor: &mut V, signature: &Signature) {
    for field in signature
        .type_params
        .iter()
        .chain(&signature.params)
        .chain(&signature.results)
    {
        walk_field(visitor, field);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, func: &Function) {
    walk_signature(visitor, &func.signature);
    if let Some(body) = &func.body {
        walk_block(visitor, body);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

fn walk_clauses<V: Visitor>(visitor: &mut V, clauses: &[CaseClause]) {
    for clause in clauses {
        for value in &clause.values {
            visitor.visit_expr(value);
        }
        for stmt in &clause.body {
            visitor.visit_stmt(stmt);
        }
    }
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Block(block) => walk_block(visitor, block),
        StmtKind::Assign(assign) => {
            for expr in assign.lhs.iter().chain(&assign.rhs) {
                visitor.visit_expr(expr);
            }
        }
        StmtKind::IncDec { target, .. } => visitor.visit_expr(target),
        StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => visitor.visit_expr(expr),
        StmtKind::Empty => {}
        StmtKind::If(stmt) => {
            if let Some(init) = &stmt.init {
                visitor.visit_stmt(init);
            }
            visitor.visit_expr(&stmt.cond);
            walk_block(visitor, &stmt.then);
            if let Some(otherwise) = &stmt.otherwise {
                visitor.visit_stmt(otherwise);
            }
        }
        StmtKind::For(stmt) => {
            if let Some(init) = &stmt.init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = &stmt.cond {
                visitor.visit_expr(cond);
            }
            if let Some(post) = &stmt.post {
                visitor.visit_stmt(post);
            }
            walk_block(visitor, &stmt.body);
        }
        StmtKind::Range(stmt) => {
            for expr in stmt.key.iter().chain(&stmt.value) {
                visitor.visit_expr(expr);
            }
            visitor.visit_expr(&stmt.subject);
            walk_block(visitor, &stmt.body);
        }
        StmtKind::Switch(stmt) => {
            if let Some(init) = &stmt.init {
                visitor.visit_stmt(init);
            }
            if let Some(tag) = &stmt.tag {
                visitor.visit_expr(tag);
            }
            walk_clauses(visitor, &stmt.clauses);
        }
        StmtKind::TypeSwitch(stmt) => {
            if let Some(init) = &stmt.init {
                visitor.visit_stmt(init);
            }
            if let Some(binding) = &stmt.binding {
                visitor.visit_identifier(binding);
            }
            visitor.visit_expr(&stmt.subject);
            walk_clauses(visitor, &stmt.clauses);
        }
        StmtKind::Select(stmt) => {
            for clause in &stmt.clauses {
                if let Some(comm) = &clause.comm {
                    visitor.visit_stmt(comm);
                }
                for stmt in &clause.body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        StmtKind::Send { channel, value } => {
            visitor.visit_expr(channel);
            visitor.visit_expr(value);
        }
        StmtKind::Return(results) => {
            for expr in results {
                visitor.visit_expr(expr);
            }
        }
        StmtKind::Branch { label, .. } => {
            if let Some(label) = label {
                visitor.visit_identifier(label);
            }
        }
        StmtKind::Label { label, stmt } => {
            visitor.visit_identifier(label);
            visitor.visit_stmt(stmt);
        }
        StmtKind::Declaration(defs) => {
            for def in defs {
                visitor.visit_definition(def);
            }
        }
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Variable(ident)
        | ExprKind::Constant(ident)
        | ExprKind::Function(ident)
        | ExprKind::Package(ident)
        | ExprKind::Builtin(ident) => visitor.visit_identifier(ident),
        ExprKind::Nil | ExprKind::Literal(_) => {}
        ExprKind::Type(ty) => visitor.visit_type_expr(ty),
        ExprKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Call(call) => {
            visitor.visit_expr(&call.callee);
            for arg in &call.args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Index { target, index } => {
            visitor.visit_expr(target);
            visitor.visit_expr(index);
        }
        ExprKind::Indices { target, indices } => {
            visitor.visit_expr(target);
            for index in indices {
                visitor.visit_expr(index);
            }
        }
        ExprKind::Slice {
            target,
            low,
            high,
            max,
        } => {
            visitor.visit_expr(target);
            for bound in [low, high, max].into_iter().flatten() {
                visitor.visit_expr(bound);
            }
        }
        ExprKind::Selector(selector) => {
            visitor.visit_expr(&selector.target);
            visitor.visit_identifier(&selector.field);
        }
        ExprKind::Deref(inner) | ExprKind::Receive(inner) | ExprKind::Paren(inner) => {
            visitor.visit_expr(inner)
        }
        ExprKind::Composite { ty, elements } => {
            if let Some(ty) = ty {
                visitor.visit_type_expr(ty);
            }
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::KeyValue { key, value } => {
            visitor.visit_expr(key);
            visitor.visit_expr(value);
        }
        ExprKind::FunctionLit(func) => visitor.visit_function(func),
        ExprKind::TypeAssertion { target, ty } => {
            visitor.visit_expr(target);
            if let Some(ty) = ty {
                visitor.visit_type_expr(ty);
            }
        }
    }
}

pub fn walk_type_expr<V: Visitor>(visitor: &mut V, ty: &TypeExpr) {
    match &ty.kind {
        TypeExprKind::Named { name, .. } => visitor.visit_identifier(name),
        TypeExprKind::Pointer(elem) | TypeExprKind::Slice(elem) | TypeExprKind::Variadic(elem) => {
            visitor.visit_type_expr(elem)
        }
        TypeExprKind::Array { len, elem } => {
            if let Some(len) = len {
                visitor.visit_expr(len);
            }
            visitor.visit_type_expr(elem);
        }
        TypeExprKind::Map { key, value } => {
            visitor.visit_type_expr(key);
            visitor.visit_type_expr(value);
        }
        TypeExprKind::Chan { elem, .. } => visitor.visit_type_expr(elem),
        TypeExprKind::Function(signature) => walk_signature(visitor, signature),
        TypeExprKind::Interface(fields) | TypeExprKind::Struct(fields) => {
            for field in fields {
                walk_field(visitor, field);
            }
        }
        TypeExprKind::Instance { base, args } => {
            visitor.visit_type_expr(base);
            for arg in args {
                visitor.visit_type_expr(arg);
            }
        }
    }
}

/// Collects every binding a subtree refers to through a variable use.
#[derive(Default)]
pub struct VariableUses {
    pub uses: std::collections::BTreeSet<NodeId>,
}

impl Visitor for VariableUses {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Variable(ident) = &expr.kind {
            if let Some(binding) = ident.binding {
                self.uses.insert(binding);
            }
        }
        walk_expr(self, expr)
    }
}

/// Local variables a function literal refers to but does not declare, in
/// order of first use.
pub fn captured_variables(func: &Function) -> Vec<Identifier> {
    #[derive(Default)]
    struct Captures {
        declared: std::collections::BTreeSet<NodeId>,
        used: Vec<Identifier>,
    }

    impl Visitor for Captures {
        fn visit_identifier(&mut self, ident: &Identifier) {
            if ident.declares {
                if let Some(binding) = ident.binding {
                    self.declared.insert(binding);
                }
            }
        }

        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Variable(ident) = &expr.kind {
                if !ident.declares
                    && !ident.global
                    && ident.binding.is_some()
                    && !self.used.iter().any(|used| used.binding == ident.binding)
                {
                    self.used.push(ident.clone());
                }
            }
            walk_expr(self, expr)
        }
    }

    let mut captures = Captures::default();
    walk_function(&mut captures, func);
    let Captures { declared, used } = captures;
    used.into_iter()
        .filter(|ident| ident.binding.is_some_and(|binding| !declared.contains(&binding)))
        .collect()
}
