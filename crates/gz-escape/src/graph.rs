//! Relation graph over IR nodes.
//!
//! Every node that takes part in a value flow gets an entry keyed by its
//! [`NodeId`]. Nodes that decide an escape outright carry a verdict; nodes
//! that merely pass a value along carry bidirectional buddy edges to the
//! nodes they compose, so the verdict of one spreads over the whole
//! connected component when it is resolved.

use gz_core::ir::visit::captured_variables;
use gz_core::ir::*;
use gz_core::tracing::trace;
use gz_core::{EscapeState, NodeId, TypeId, TypeKind, TypeTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    pub verdict: EscapeState,
    pub buddies: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: Vec<Relation>,
}

impl RelationGraph {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            nodes: vec![Relation::default(); len],
        }
    }

    pub fn build(package: &Package) -> Self {
        let mut builder = GraphBuilder {
            graph: Self::with_capacity(package.node_count as usize),
            types: &package.types,
            results: Vec::new(),
        };
        for def in package.definitions() {
            builder.definition(def);
        }
        builder.graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn slot(&mut self, id: NodeId) -> &mut Relation {
        if id.index() >= self.nodes.len() {
            self.nodes.resize(id.index() + 1, Relation::default());
        }
        &mut self.nodes[id.index()]
    }

    /// Raises the verdict of a node; verdicts never go down.
    pub fn mark(&mut self, id: NodeId, state: EscapeState) {
        let slot = self.slot(id);
        slot.verdict = slot.verdict.join(state);
    }

    pub fn link(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        self.slot(a).buddies.push(b);
        self.slot(b).buddies.push(a);
    }

    pub fn verdict(&self, id: NodeId) -> EscapeState {
        self.nodes.get(id.index()).map(|node| node.verdict).unwrap_or_default()
    }

    pub fn buddies(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.index()).map(|node| node.buddies.as_slice()).unwrap_or_default()
    }
}

struct GraphBuilder<'a> {
    graph: RelationGraph,
    types: &'a TypeTable,
    /// Result types of the functions being walked, innermost last.
    results: Vec<Vec<TypeId>>,
}

impl GraphBuilder<'_> {
    fn is_interface(&self, ty: Option<TypeId>) -> bool {
        ty.is_some_and(|ty| self.types.contains(ty) && self.types.is_interface(ty))
    }

    /// Storing `value` into a slot of type `slot` boxes it behind an
    /// interface.
    fn store(&mut self, slot: Option<TypeId>, value: &Expr) {
        if self.is_interface(slot) && !self.is_interface(value.ty()) && !matches!(value.kind, ExprKind::Nil) {
            self.graph.mark(value.id, EscapeState::HeapEscape);
        }
    }

    fn definition(&mut self, def: &Definition) {
        match def {
            Definition::Type(_) | Definition::Constant(_) => {}
            Definition::Variable(def) => self.value_definition(def),
            Definition::Function(def) => self.function(&def.func),
        }
    }

    fn value_definition(&mut self, def: &ValueDefinition) {
        for value in &def.values {
            self.expr(value);
        }
        for (index, name) in def.names.iter().enumerate() {
            let Some(binding) = name.binding else { continue };
            if name.global {
                self.graph.mark(binding, EscapeState::HeapEscape);
            }
            let value = if def.values.len() == def.names.len() {
                def.values.get(index)
            } else {
                def.values.first()
            };
            if let Some(value) = value {
                self.graph.link(binding, value.id);
                if def.values.len() == def.names.len() {
                    self.store(name.typed.ty, value);
                }
            }
        }
    }

    fn function(&mut self, func: &Function) {
        let results = func
            .signature
            .typed
            .ty
            .filter(|ty| self.types.contains(*ty))
            .map(|ty| match self.types.underlying_kind(ty) {
                TypeKind::Signature { results, .. } => results.clone(),
                _ => Vec::new(),
            })
            .unwrap_or_default();
        self.results.push(results);
        if let Some(body) = &func.body {
            self.block(body);
        }
        self.results.pop();
    }

    /// Marks every local a function literal captures.
    fn captures(&mut self, func: &Function, state: EscapeState) {
        for ident in captured_variables(func) {
            if let Some(binding) = ident.binding {
                trace!("{} captured at {}: {state}", ident.name, ident.location);
                self.graph.mark(binding, state);
            }
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block),
            StmtKind::Assign(assign) => self.assign(assign),
            StmtKind::IncDec { target, .. } => self.expr(target),
            StmtKind::Expr(expr) | StmtKind::Defer(expr) => self.expr(expr),
            StmtKind::Empty | StmtKind::Branch { .. } => {}
            StmtKind::If(stmt) => {
                if let Some(init) = &stmt.init {
                    self.stmt(init);
                }
                self.expr(&stmt.cond);
                self.block(&stmt.then);
                if let Some(otherwise) = &stmt.otherwise {
                    self.stmt(otherwise);
                }
            }
            StmtKind::For(stmt) => {
                if let Some(init) = &stmt.init {
                    self.stmt(init);
                }
                if let Some(cond) = &stmt.cond {
                    self.expr(cond);
                }
                if let Some(post) = &stmt.post {
                    self.stmt(post);
                }
                self.block(&stmt.body);
            }
            StmtKind::Range(stmt) => {
                self.expr(&stmt.subject);
                for target in stmt.key.iter().chain(&stmt.value) {
                    self.expr(target);
                    self.graph.link(target.id, stmt.subject.id);
                }
                self.block(&stmt.body);
            }
            StmtKind::Switch(stmt) => {
                if let Some(init) = &stmt.init {
                    self.stmt(init);
                }
                if let Some(tag) = &stmt.tag {
                    self.expr(tag);
                }
                for clause in &stmt.clauses {
                    for value in &clause.values {
                        self.expr(value);
                    }
                    self.stmts(&clause.body);
                }
            }
            StmtKind::TypeSwitch(stmt) => {
                if let Some(init) = &stmt.init {
                    self.stmt(init);
                }
                self.expr(&stmt.subject);
                if let Some(binding) = stmt.binding.as_ref().and_then(|ident| ident.binding) {
                    self.graph.link(binding, stmt.subject.id);
                }
                for clause in &stmt.clauses {
                    self.stmts(&clause.body);
                }
            }
            StmtKind::Select(stmt) => {
                for clause in &stmt.clauses {
                    if let Some(comm) = &clause.comm {
                        self.stmt(comm);
                    }
                    self.stmts(&clause.body);
                }
            }
            StmtKind::Send { channel, value } => {
                self.expr(channel);
                self.expr(value);
                self.graph.mark(value.id, EscapeState::SharedEscape);
            }
            StmtKind::Go(call) => self.spawn(call),
            StmtKind::Return(values) => {
                for value in values {
                    self.expr(value);
                }
                let results = self.results.last().cloned().unwrap_or_default();
                if results.len() == values.len() {
                    for (slot, value) in results.into_iter().zip(values) {
                        self.store(Some(slot), value);
                    }
                }
            }
            StmtKind::Label { stmt, .. } => self.stmt(stmt),
            StmtKind::Declaration(defs) => {
                for def in defs {
                    self.definition(def);
                }
            }
        }
    }

    fn assign(&mut self, assign: &AssignStmt) {
        for expr in assign.rhs.iter().chain(&assign.lhs) {
            self.expr(expr);
        }
        let paired = assign.lhs.len() == assign.rhs.len();
        for (index, target) in assign.lhs.iter().enumerate() {
            if target.is_blank() {
                continue;
            }
            let value = if paired {
                &assign.rhs[index]
            } else {
                match assign.rhs.first() {
                    Some(value) => value,
                    None => continue,
                }
            };
            self.graph.link(target.id, value.id);
            if paired {
                self.store(target.ty(), value);
            }
            if let Some(root) = target.root_variable().filter(|root| root.global) {
                if let Some(binding) = root.binding {
                    self.graph.mark(binding, EscapeState::HeapEscape);
                }
                self.graph.mark(value.id, EscapeState::HeapEscape);
            }
        }
    }

    /// `go f(args)`: everything handed to the new task is shared with it.
    fn spawn(&mut self, expr: &Expr) {
        let ExprKind::Call(call) = &expr.unparen().kind else {
            self.expr(expr);
            return;
        };
        self.call(expr.unparen().id, call);
        if let ExprKind::FunctionLit(func) = &call.callee.unparen().kind {
            self.captures(func, EscapeState::SharedEscape);
        }
        self.graph.mark(call.callee.id, EscapeState::SharedEscape);
        for arg in &call.args {
            self.graph.mark(arg.id, EscapeState::SharedEscape);
        }
    }

    fn call(&mut self, id: NodeId, call: &CallExpr) {
        self.expr(&call.callee);
        for arg in &call.args {
            self.expr(arg);
        }
        match &call.callee.unparen().kind {
            ExprKind::Builtin(builtin) => match builtin.name.as_str() {
                // The result aliases the first operand and holds the rest.
                "append" => {
                    for arg in &call.args {
                        self.graph.link(id, arg.id);
                    }
                }
                "copy" => {
                    if let [dst, src] = call.args.as_slice() {
                        self.graph.link(dst.id, src.id);
                    }
                }
                _ => {}
            },
            ExprKind::Type(_) => {
                if let Some(arg) = call.args.first() {
                    self.store(call.callee.ty(), arg);
                    self.graph.link(id, arg.id);
                }
            }
            _ => {
                let Some(ty) = call.callee.ty().filter(|ty| self.types.contains(*ty)) else {
                    return;
                };
                let TypeKind::Signature { params, variadic, .. } = self.types.underlying_kind(ty) else {
                    return;
                };
                let (params, variadic) = (params.clone(), *variadic);
                for (index, arg) in call.args.iter().enumerate() {
                    let spread = variadic && index + 1 >= params.len();
                    let slot = if spread && !call.ellipsis {
                        params.last().and_then(|last| self.types.elem(*last))
                    } else {
                        params.get(index).or(params.last()).copied()
                    };
                    self.store(slot, arg);
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        let id = expr.id;
        match &expr.kind {
            ExprKind::Variable(ident) => {
                if let Some(binding) = ident.binding {
                    self.graph.link(id, binding);
                }
            }
            ExprKind::Constant(_)
            | ExprKind::Function(_)
            | ExprKind::Package(_)
            | ExprKind::Builtin(_)
            | ExprKind::Nil
            | ExprKind::Type(_)
            | ExprKind::Literal(_) => {}
            ExprKind::Binary { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
                self.graph.link(id, lhs.id);
                self.graph.link(id, rhs.id);
            }
            ExprKind::Unary { op, operand } => {
                self.expr(operand);
                self.graph.link(id, operand.id);
                if *op == UnaryOp::Address {
                    self.graph.mark(operand.id, EscapeState::HeapEscape);
                }
            }
            ExprKind::Call(call) => self.call(id, call),
            ExprKind::Index { target, index } => {
                self.expr(target);
                self.expr(index);
                self.graph.link(id, target.id);
            }
            ExprKind::Indices { target, indices } => {
                self.expr(target);
                for index in indices {
                    self.expr(index);
                }
                self.graph.link(id, target.id);
            }
            ExprKind::Slice {
                target,
                low,
                high,
                max,
            } => {
                self.expr(target);
                for bound in [low, high, max].into_iter().flatten() {
                    self.expr(bound);
                }
                self.graph.link(id, target.id);
            }
            ExprKind::Selector(selector) => {
                self.expr(&selector.target);
                if selector.kind == SelectionKind::Qualified {
                    return;
                }
                self.graph.link(id, selector.target.id);
                if selector.kind == SelectionKind::Method && self.takes_address(selector) {
                    self.graph.mark(selector.target.id, EscapeState::HeapEscape);
                }
            }
            ExprKind::Deref(inner) | ExprKind::Paren(inner) => {
                self.expr(inner);
                self.graph.link(id, inner.id);
            }
            ExprKind::TypeAssertion { target, .. } => {
                self.expr(target);
                self.graph.link(id, target.id);
            }
            ExprKind::Receive(channel) => {
                self.expr(channel);
                self.graph.mark(id, EscapeState::SharedEscape);
            }
            ExprKind::Composite { elements, .. } => self.composite(expr, elements),
            ExprKind::KeyValue { key, value } => {
                self.expr(key);
                self.expr(value);
                self.graph.link(id, value.id);
            }
            ExprKind::FunctionLit(func) => {
                self.captures(func, EscapeState::HeapEscape);
                self.function(func);
            }
        }
    }

    /// A pointer-receiver method selected on an addressable value implicitly
    /// takes its address.
    fn takes_address(&self, selector: &SelectorExpr) -> bool {
        let Some(ty) = selector.target.ty().filter(|ty| self.types.contains(*ty)) else {
            return false;
        };
        if self.types.is_pointer(ty) || selector.indirect {
            return false;
        }
        self.types
            .methods(ty)
            .iter()
            .any(|method| method.name == selector.field.name && method.pointer_receiver)
    }

    fn composite(&mut self, expr: &Expr, elements: &[Expr]) {
        let ty = expr.ty().filter(|ty| self.types.contains(*ty));
        let fields = ty.map(|ty| self.types.fields(ty).to_vec()).unwrap_or_default();
        let is_struct = ty.is_some_and(|ty| matches!(self.types.underlying_kind(ty), TypeKind::Struct { .. }));
        let elem = ty.and_then(|ty| self.types.elem(ty));
        for (index, element) in elements.iter().enumerate() {
            match (&element.kind, is_struct) {
                // Struct keys name fields, not values.
                (ExprKind::KeyValue { key, value }, true) => {
                    self.expr(value);
                    self.graph.link(element.id, value.id);
                    let slot = key
                        .as_variable()
                        .and_then(|key| fields.iter().find(|field| field.name == key.name))
                        .map(|field| field.ty);
                    self.store(slot, value);
                }
                (ExprKind::KeyValue { value, .. }, false) => {
                    self.expr(element);
                    self.store(elem, value);
                }
                (_, true) => {
                    self.expr(element);
                    self.store(fields.get(index).map(|field| field.ty), element);
                }
                (_, false) => {
                    self.expr(element);
                    self.store(elem, element);
                }
            }
            self.graph.link(expr.id, element.id);
        }
    }
}
