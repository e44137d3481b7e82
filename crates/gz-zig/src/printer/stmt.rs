use gz_core::ir::{
    AssignOp, AssignStmt, Block, BranchKind, CallExpr, Definition, Expr, ExprKind, ForStmt, Identifier, IfStmt,
    RangeStmt, Stmt, StmtKind, SwitchStmt, ValueDefinition,
};
use gz_core::{CodegenError, EscapeState, Location, Result, TypeKind};
use itertools::Itertools;

use super::builtins::{DEFERRABLE_BUILTINS, VOID_BUILTINS};
use super::call::Callee;
use super::{Breakable, ZigEmitter};

/// Left-hand side of an assignment: an expression, or the name a `var`
/// declaration introduces.
#[derive(Clone, Copy)]
enum Target<'a> {
    Expr(&'a Expr),
    Name(&'a Identifier),
}

impl ZigEmitter<'_> {
    pub(super) fn emit_block(&mut self, block: &Block) -> Result<()> {
        self.emit_stmts(&block.stmts)
    }

    fn emit_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    /// Emits `stmts` one nesting level deeper.
    fn emit_nested(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.indent += 1;
        if let Some(scope) = self.scope() {
            scope.depth += 1;
        }
        let result = self.emit_stmts(stmts);
        if let Some(scope) = self.scope() {
            scope.depth -= 1;
        }
        self.indent -= 1;
        result
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        let at = &stmt.location;
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.push_line("{");
                self.emit_nested(&block.stmts)?;
                self.push_line("}");
                Ok(())
            }
            StmtKind::Assign(assign) => self.emit_assign(assign, at),
            StmtKind::IncDec { target, increment } => self.emit_inc_dec(target, *increment),
            StmtKind::Expr(expr) => self.emit_expr_stmt(expr),
            StmtKind::Empty => Ok(()),
            StmtKind::If(stmt) => self.emit_if(stmt),
            StmtKind::For(stmt) => self.emit_for(stmt),
            StmtKind::Range(stmt) => self.emit_range(stmt, at),
            StmtKind::Switch(stmt) => self.emit_switch(stmt),
            StmtKind::Send { channel, value } => self.emit_send(channel, value),
            StmtKind::Go(call) => self.emit_go(call),
            StmtKind::Defer(call) => self.emit_defer(call),
            StmtKind::Return(values) => self.emit_return(values, at),
            StmtKind::Branch { kind, label } => {
                if label.is_some() && matches!(kind, BranchKind::Break | BranchKind::Continue) {
                    return Err(CodegenError::unsupported(at, "labeled branch"));
                }
                self.emit_branch(*kind, at)
            }
            StmtKind::Declaration(defs) => {
                for def in defs {
                    self.emit_local_definition(def, at)?;
                }
                Ok(())
            }
            StmtKind::TypeSwitch(_) | StmtKind::Select(_) | StmtKind::Label { .. } => {
                Err(CodegenError::unsupported(at, stmt.kind.describe()))
            }
        }
    }

    /// Declares a local variable, boxed according to its escape verdict.
    pub(super) fn declare_local(&mut self, ident: &Identifier, value: Option<String>) -> Result<()> {
        if ident.is_blank() {
            if let Some(value) = value {
                self.push_line(&format!("_ = {value};"));
            }
            return Ok(());
        }
        let ty = ident.typed.ty.ok_or_else(|| {
            CodegenError::invariant(&ident.location, format!("{} has no resolved type", ident.name))
        })?;
        let zig = self.render_type(ty, &ident.location)?;
        let value = value.unwrap_or_else(|| format!("go.zero({zig})"));
        let name = self.local_name(ident);
        match ident.escape() {
            EscapeState::NoEscape => {
                self.push_line(&format!("var {name}: {zig} = {value};"));
                self.push_line(&format!("_ = &{name};"));
            }
            EscapeState::HeapEscape => self.push_line(&format!("const {name} = task.malloc({zig}, {value});")),
            EscapeState::SharedEscape => self.push_line(&format!("const {name} = task.share({zig}, {value});")),
        }
        Ok(())
    }

    fn emit_local_definition(&mut self, def: &Definition, at: &Location) -> Result<()> {
        match def {
            Definition::Variable(def) => self.emit_local_variables(def),
            Definition::Constant(_) => Ok(()),
            Definition::Type(def) => {
                let (text, ()) = self.capture(0, |this| this.emit_type_definition(def, false))?;
                self.hoisted.push(text);
                Ok(())
            }
            Definition::Function(_) => Err(CodegenError::invariant(at, "function declared inside a function")),
        }
    }

    fn emit_local_variables(&mut self, def: &ValueDefinition) -> Result<()> {
        if def.values.is_empty() {
            for name in &def.names {
                self.declare_local(name, None)?;
            }
            return Ok(());
        }
        if def.values.len() == def.names.len() {
            for (name, value) in def.names.iter().zip(&def.values) {
                let value = match name.typed.ty {
                    Some(ty) => self.value_for(ty, value)?,
                    None => self.render_expr(value)?,
                };
                self.declare_local(name, Some(value))?;
            }
            return Ok(());
        }
        let targets = def.names.iter().map(Target::Name).collect::<Vec<_>>();
        match def.values.as_slice() {
            [value] => self.destructure(&targets, value),
            _ => Err(CodegenError::invariant(&def.location, "declaration count mismatch")),
        }
    }

    /// Stores a rendered value into an assignment target.
    fn store(&mut self, target: Target<'_>, value: String) -> Result<()> {
        match target {
            Target::Name(ident) => self.declare_local(ident, Some(value)),
            Target::Expr(expr) => {
                if let Some(ident) = expr.as_variable() {
                    if ident.declares || ident.is_blank() {
                        return self.declare_local(ident, Some(value));
                    }
                }
                if let ExprKind::Index { target, index } = &expr.unparen().kind {
                    if matches!(self.types.underlying_kind(self.type_of(target)?), TypeKind::Map { .. }) {
                        let map = self.render_expr(target)?;
                        let key = self.render_expr(index)?;
                        self.push_line(&format!("{map}.set(task, {key}, {value});"));
                        return Ok(());
                    }
                }
                let place = self.render_expr(expr)?;
                self.push_line(&format!("{place} = {value};"));
                Ok(())
            }
        }
    }

    fn target_value(&mut self, target: &Expr, value: &Expr) -> Result<String> {
        let slot = target.as_variable().and_then(|ident| ident.typed.ty).or(target.ty());
        match slot {
            Some(slot) if !target.is_blank() => self.value_for(slot, value),
            _ => self.render_expr(value),
        }
    }

    fn emit_assign(&mut self, assign: &AssignStmt, at: &Location) -> Result<()> {
        let AssignStmt { lhs, op, rhs } = assign;
        if let Some(binary) = op.binary() {
            let ([target], [value]) = (lhs.as_slice(), rhs.as_slice()) else {
                return Err(CodegenError::invariant(at, "compound assignment with several operands"));
            };
            let ty = target.ty();
            let value = self.render_expr(value)?;
            if let ExprKind::Index { target: map, index } = &target.unparen().kind {
                if matches!(self.types.underlying_kind(self.type_of(map)?), TypeKind::Map { .. }) {
                    let map = self.render_expr(map)?;
                    let key = self.render_expr(index)?;
                    let combined = self.combine(binary, ty, &format!("{map}.get({key})"), &value);
                    self.push_line(&format!("{map}.set(task, {key}, {combined});"));
                    return Ok(());
                }
            }
            let current = self.render_expr(target)?;
            let combined = self.combine(binary, ty, &current, &value);
            self.push_line(&format!("{current} = {combined};"));
            return Ok(());
        }
        debug_assert!(matches!(op, AssignOp::Assign | AssignOp::Define));
        if lhs.len() == rhs.len() {
            if let ([target], [value]) = (lhs.as_slice(), rhs.as_slice()) {
                let value = self.target_value(target, value)?;
                return self.store(Target::Expr(target), value);
            }
            // Every value is evaluated before any target is written.
            let values = lhs
                .iter()
                .zip(rhs)
                .map(|(target, value)| self.target_value(target, value))
                .collect::<Result<Vec<_>>>()?;
            let tuple = self.fresh("assign");
            self.push_line(&format!("const {tuple} = .{{ {} }};", values.join(", ")));
            for (index, target) in lhs.iter().enumerate() {
                self.store(Target::Expr(target), format!("{tuple}[{index}]"))?;
            }
            return Ok(());
        }
        let targets = lhs.iter().map(Target::Expr).collect::<Vec<_>>();
        match rhs.as_slice() {
            [value] => self.destructure(&targets, value),
            _ => Err(CodegenError::invariant(at, "assignment count mismatch")),
        }
    }

    /// `a, b := f()` and the comma-ok forms.
    fn destructure(&mut self, targets: &[Target<'_>], value: &Expr) -> Result<()> {
        let rendered = match &value.unparen().kind {
            ExprKind::Index { target, index }
                if matches!(self.types.underlying_kind(self.type_of(target)?), TypeKind::Map { .. }) =>
            {
                format!("{}.lookup({})", self.render_expr(target)?, self.render_expr(index)?)
            }
            ExprKind::Receive(channel) => format!("{}.recv2(task)", self.render_expr(channel)?),
            ExprKind::TypeAssertion { target, .. } => self.type_assertion(value.unparen(), target, true)?,
            ExprKind::Call(_) => self.render_expr(value)?,
            other => {
                return Err(CodegenError::invariant(
                    &value.location,
                    format!("{} cannot produce several values", other.describe()),
                ));
            }
        };
        let tuple = self.fresh("tuple");
        self.push_line(&format!("const {tuple} = {rendered};"));
        for (index, target) in targets.iter().enumerate() {
            let blank = match target {
                Target::Expr(expr) => expr.is_blank(),
                Target::Name(ident) => ident.is_blank(),
            };
            if !blank {
                self.store(*target, format!("{tuple}[{index}]"))?;
            }
        }
        Ok(())
    }

    fn emit_inc_dec(&mut self, target: &Expr, increment: bool) -> Result<()> {
        let ty = self.type_of(target)?;
        let wrapping = if self.types.is_integer(ty) { "%" } else { "" };
        let sign = if increment { "+" } else { "-" };
        if let ExprKind::Index { target: map, index } = &target.unparen().kind {
            if matches!(self.types.underlying_kind(self.type_of(map)?), TypeKind::Map { .. }) {
                let map = self.render_expr(map)?;
                let key = self.render_expr(index)?;
                self.push_line(&format!("{map}.set(task, {key}, {map}.get({key}) {sign}{wrapping} 1);"));
                return Ok(());
            }
        }
        let place = self.render_expr(target)?;
        self.push_line(&format!("{place} {sign}{wrapping}= 1;"));
        Ok(())
    }

    fn emit_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        let text = self.render_expr(expr)?;
        if self.produces_value(expr)? {
            self.push_line(&format!("_ = {text};"));
        } else {
            self.push_line(&format!("{text};"));
        }
        Ok(())
    }

    fn produces_value(&self, expr: &Expr) -> Result<bool> {
        let ExprKind::Call(call) = &expr.unparen().kind else {
            return Ok(true);
        };
        match &call.callee.unparen().kind {
            ExprKind::Builtin(ident) => Ok(!VOID_BUILTINS.contains(&ident.name.as_str())),
            ExprKind::Type(_) => Ok(true),
            _ => {
                let (_, results, _) = self.signature_parts(self.type_of(&call.callee)?, &expr.location)?;
                Ok(!results.is_empty())
            }
        }
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> Result<()> {
        match &stmt.init {
            Some(init) => {
                self.push_line("{");
                self.indent += 1;
                self.emit_stmt(init)?;
                self.emit_if_chain(stmt, "if")?;
                self.indent -= 1;
                self.push_line("}");
                Ok(())
            }
            None => self.emit_if_chain(stmt, "if"),
        }
    }

    fn emit_if_chain(&mut self, stmt: &IfStmt, keyword: &str) -> Result<()> {
        let cond = self.render_expr(&stmt.cond)?;
        self.push_line(&format!("{keyword} ({cond}) {{"));
        self.emit_nested(&stmt.then.stmts)?;
        match stmt.otherwise.as_deref() {
            None => self.push_line("}"),
            Some(Stmt {
                kind: StmtKind::If(next),
                ..
            }) if next.init.is_none() => return self.emit_if_chain(next, "} else if"),
            Some(Stmt {
                kind: StmtKind::Block(block),
                ..
            }) => {
                self.push_line("} else {");
                self.emit_nested(&block.stmts)?;
                self.push_line("}");
            }
            Some(other) => {
                self.push_line("} else {");
                self.emit_nested(std::slice::from_ref(other))?;
                self.push_line("}");
            }
        }
        Ok(())
    }

    /// A simple statement rendered on one line, for loop continuations.
    fn inline_stmt(&mut self, stmt: &Stmt) -> Result<String> {
        let (text, ()) = self.capture(0, |this| this.emit_stmt(stmt))?;
        let mut lines = text.lines();
        match (lines.next(), lines.next()) {
            (Some(line), None) => Ok(line.trim_end_matches(';').to_string()),
            _ => Err(CodegenError::unsupported(
                &stmt.location,
                "loop post statement that needs several statements",
            )),
        }
    }

    /// Runs `emit` with `breakable` as the innermost target of `break`.
    fn with_breakable<T>(&mut self, breakable: Breakable, emit: impl FnOnce(&mut Self) -> Result<T>) -> Result<(T, Breakable)> {
        if let Some(scope) = self.scope() {
            scope.breakables.push(breakable);
        }
        let result = emit(self);
        let breakable = self
            .scope()
            .and_then(|scope| scope.breakables.pop())
            .unwrap_or(Breakable::Loop);
        result.map(|value| (value, breakable))
    }

    fn emit_for(&mut self, stmt: &ForStmt) -> Result<()> {
        let scoped = stmt.init.is_some();
        if scoped {
            self.push_line("{");
            self.indent += 1;
        }
        if let Some(init) = &stmt.init {
            self.emit_stmt(init)?;
        }
        let cond = match &stmt.cond {
            Some(cond) => self.render_expr(cond)?,
            None => "true".to_string(),
        };
        match &stmt.post {
            Some(post) => {
                let post = self.inline_stmt(post)?;
                self.push_line(&format!("while ({cond}) : ({post}) {{"));
            }
            None => self.push_line(&format!("while ({cond}) {{")),
        }
        self.with_breakable(Breakable::Loop, |this| this.emit_nested(&stmt.body.stmts))?;
        self.push_line("}");
        if scoped {
            self.indent -= 1;
            self.push_line("}");
        }
        Ok(())
    }

    fn emit_range(&mut self, stmt: &RangeStmt, at: &Location) -> Result<()> {
        let subject_ty = self.type_of(&stmt.subject)?;
        let subject = self.render_expr(&stmt.subject)?;
        let iterator = match self.types.underlying_kind(subject_ty) {
            TypeKind::Chan { .. } => format!("go.range_chan(task, {subject})"),
            TypeKind::Pointer { .. } => format!("go.range({subject}.address.?.*)"),
            TypeKind::Signature { .. } => return Err(CodegenError::unsupported(at, "range over function")),
            _ => format!("go.range({subject})"),
        };
        let range = self.fresh("range");
        let item = self.fresh("item");
        self.push_line("{");
        self.indent += 1;
        self.push_line(&format!("var {range} = {iterator};"));
        let bound = stmt.key.is_some() || stmt.value.is_some();
        let capture = if bound { item.as_str() } else { "_" };
        self.push_line(&format!("while ({range}.next()) |{capture}| {{"));
        self.indent += 1;
        for (expr, field) in [(&stmt.key, "key"), (&stmt.value, "value")] {
            if let Some(expr) = expr.as_ref().filter(|expr| !expr.is_blank()) {
                self.store(Target::Expr(expr), format!("{item}.{field}"))?;
            }
        }
        self.indent -= 1;
        self.with_breakable(Breakable::Loop, |this| this.emit_nested(&stmt.body.stmts))?;
        self.push_line("}");
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    fn emit_switch(&mut self, stmt: &SwitchStmt) -> Result<()> {
        self.push_line("{");
        self.indent += 1;
        if let Some(init) = &stmt.init {
            self.emit_stmt(init)?;
        }
        let tag = match &stmt.tag {
            Some(tag) => {
                let name = self.fresh("tag");
                let value = self.render_typed_operand(tag)?;
                self.push_line(&format!("const {name} = {value};"));
                if stmt.clauses.iter().all(|clause| clause.is_default()) {
                    self.push_line(&format!("_ = {name};"));
                }
                Some((name, tag.ty()))
            }
            None => None,
        };
        let label = self.fresh("switch");
        let clauses = stmt
            .clauses
            .iter()
            .filter(|clause| !clause.is_default())
            .chain(stmt.clauses.iter().filter(|clause| clause.is_default()))
            .collect::<Vec<_>>();
        let indent = self.indent + 1;
        let ((body, ()), breakable) = self.with_breakable(
            Breakable::Switch {
                label: label.clone(),
                used: false,
            },
            |this| {
                this.capture(indent, |this| {
                    let mut opened = false;
                    for clause in &clauses {
                        if clause.is_default() {
                            if opened {
                                this.push_line("} else {");
                                this.emit_nested(&clause.body)?;
                                this.push_line("}");
                            } else {
                                this.push_line("{");
                                this.emit_nested(&clause.body)?;
                                this.push_line("}");
                            }
                            opened = false;
                            continue;
                        }
                        let tests = clause
                            .values
                            .iter()
                            .map(|value| match &tag {
                                Some((name, ty)) => {
                                    let value = this.render_typed_operand(value)?;
                                    Ok(this.combine(gz_core::ir::BinaryOp::Eq, *ty, name, &value))
                                }
                                None => this.render_expr(value),
                            })
                            .collect::<Result<Vec<_>>>()?;
                        let keyword = if opened { "} else if" } else { "if" };
                        this.push_line(&format!("{keyword} ({}) {{", tests.iter().join(" or ")));
                        this.emit_nested(&clause.body)?;
                        opened = true;
                    }
                    if opened {
                        this.push_line("}");
                    }
                    Ok(())
                })
            },
        )?;
        let used = matches!(breakable, Breakable::Switch { used: true, .. });
        self.push_line(&if used { format!("{label}: {{") } else { "{".to_string() });
        self.code.push_str(&body);
        self.push_line("}");
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    fn emit_branch(&mut self, kind: BranchKind, at: &Location) -> Result<()> {
        match kind {
            BranchKind::Continue => {
                self.push_line("continue;");
                Ok(())
            }
            BranchKind::Break => {
                let label = match self.scope().and_then(|scope| scope.breakables.last_mut()) {
                    Some(Breakable::Switch { label, used }) => {
                        *used = true;
                        Some(label.clone())
                    }
                    Some(Breakable::Loop) => None,
                    None => return Err(CodegenError::invariant(at, "break outside a loop or switch")),
                };
                match label {
                    Some(label) => self.push_line(&format!("break :{label};")),
                    None => self.push_line("break;"),
                }
                Ok(())
            }
            BranchKind::Goto | BranchKind::Fallthrough => Err(CodegenError::unsupported(
                at,
                if kind == BranchKind::Goto { "goto" } else { "fallthrough" },
            )),
        }
    }

    fn emit_send(&mut self, channel: &Expr, value: &Expr) -> Result<()> {
        if let Some(root) = value.root_variable() {
            if !root.global && root.binding.is_some() && root.escape() != EscapeState::SharedEscape {
                return Err(CodegenError::invariant(
                    &value.location,
                    format!("{} is sent on a channel without a shared-escape verdict", root.name),
                ));
            }
        }
        let elem = self
            .types
            .elem(self.type_of(channel)?)
            .ok_or_else(|| CodegenError::invariant(&channel.location, "send on a non-channel"))?;
        let channel = self.render_expr(channel)?;
        let value = self.value_for(elem, value)?;
        self.push_line(&format!("{channel}.send(task, {value});"));
        Ok(())
    }

    fn call_of<'e>(&self, expr: &'e Expr) -> Result<&'e CallExpr> {
        match &expr.unparen().kind {
            ExprKind::Call(call) => Ok(call),
            other => Err(CodegenError::invariant(
                &expr.location,
                format!("expected a call, found {}", other.describe()),
            )),
        }
    }

    fn emit_go(&mut self, expr: &Expr) -> Result<()> {
        let call = self.call_of(expr)?;
        if matches!(call.callee.unparen().kind, ExprKind::Builtin(_) | ExprKind::Type(_)) {
            return Err(CodegenError::unsupported(&expr.location, "go statement on a builtin or conversion"));
        }
        let lowered = self.lower_call(expr, call)?;
        let args = lowered.tuple();
        match lowered.callee {
            Callee::Direct(function) => self.push_line(&format!("task.go({function}, {args});")),
            Callee::Value(value) => self.push_line(&format!("task.goInvoke({value}, {args});")),
        }
        Ok(())
    }

    fn emit_defer(&mut self, expr: &Expr) -> Result<()> {
        let at = &expr.location;
        if self.scope().is_some_and(|scope| scope.depth > 0) {
            return Err(CodegenError::unsupported(at, "defer inside a nested block"));
        }
        let call = self.call_of(expr)?;
        let packed = self.fresh("defer");
        match &call.callee.unparen().kind {
            ExprKind::Builtin(ident) => {
                if !DEFERRABLE_BUILTINS.contains(&ident.name.as_str()) {
                    return Err(CodegenError::unsupported(at, format!("deferred builtin {}", ident.name)));
                }
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.render_typed_operand(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.push_line(&format!("const {packed} = .{{ {} }};", args.join(", ")));
                let deferred = self.builtin_with(expr, &ident.name, call, Some(&packed))?;
                self.push_line(&format!("defer {deferred};"));
            }
            ExprKind::Type(_) => return Err(CodegenError::unsupported(at, "deferred conversion")),
            _ => {
                let lowered = self.lower_call(expr, call)?;
                let discard = if lowered.returns_value { "_ = " } else { "" };
                match &lowered.callee {
                    Callee::Direct(function) => {
                        let args = std::iter::once("task").chain(lowered.args.iter().map(String::as_str)).join(", ");
                        self.push_line(&format!("const {packed} = .{{ {args} }};"));
                        self.push_line(&format!("defer {discard}@call(.auto, {function}, {packed});"));
                    }
                    Callee::Value(value) => {
                        self.push_line(&format!("const {packed} = .{{ {value}, {} }};", lowered.tuple()));
                        self.push_line(&format!("defer {discard}{packed}[0].invoke(task, {packed}[1]);"));
                    }
                }
            }
        }
        Ok(())
    }

    fn emit_return(&mut self, values: &[Expr], at: &Location) -> Result<()> {
        let (results, named) = match self.scope() {
            Some(scope) => (scope.results.clone(), scope.named_results.clone()),
            None => return Err(CodegenError::invariant(at, "return outside a function")),
        };
        let rendered = if values.is_empty() {
            named.iter().map(|result| self.variable(result)).collect::<Vec<_>>()
        } else if values.len() == results.len() {
            values
                .iter()
                .zip(&results)
                .map(|(value, result)| self.value_for(*result, value))
                .collect::<Result<Vec<_>>>()?
        } else if let [value] = values {
            vec![self.render_expr(value)?]
        } else {
            return Err(CodegenError::invariant(at, "return count mismatch"));
        };
        match rendered.as_slice() {
            [] => self.push_line("return;"),
            [value] => self.push_line(&format!("return {value};")),
            values => self.push_line(&format!("return .{{ {} }};", values.join(", "))),
        }
        Ok(())
    }
}
