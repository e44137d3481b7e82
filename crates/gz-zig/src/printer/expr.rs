use gz_core::ir::visit::captured_variables;
use gz_core::ir::{BinaryOp, Expr, ExprKind, Function, Identifier, SelectionKind, SelectorExpr, UnaryOp};
use gz_core::types::BasicKind;
use gz_core::{CodegenError, Location, Result, TypeId, TypeKind};
use itertools::Itertools;

use super::item::FunctionKind;
use super::utils::{dotted, field_name, quote, zig_name};
use super::ZigEmitter;

impl ZigEmitter<'_> {
    pub(super) fn render_expr(&mut self, expr: &Expr) -> Result<String> {
        let at = &expr.location;
        if let Some(value) = &expr.typed.constant {
            if !matches!(expr.kind, ExprKind::Type(_)) {
                return Ok(self.render_constant(value, expr.ty()));
            }
        }
        match &expr.kind {
            ExprKind::Variable(ident) => Ok(self.variable(ident)),
            ExprKind::Constant(ident) if ident.global => Ok(self.global_name(ident)),
            ExprKind::Constant(ident) => Err(CodegenError::invariant(
                at,
                format!("constant {} has no resolved value", ident.name),
            )),
            ExprKind::Function(ident) => self.function_value(expr, ident),
            ExprKind::Package(ident) => Err(CodegenError::unsupported(
                at,
                format!("package {} used as a value", ident.name),
            )),
            ExprKind::Builtin(ident) => Err(CodegenError::unsupported(
                at,
                format!("builtin {} used as a value", ident.name),
            )),
            ExprKind::Nil => Ok(".{}".to_string()),
            ExprKind::Type(_) => Err(CodegenError::unsupported(at, "type used as a value")),
            ExprKind::Literal(literal) => self.render_literal(expr, literal.kind, &literal.raw),
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            ExprKind::Unary { op, operand } => self.unary(expr, *op, operand),
            ExprKind::Call(call) => self.render_call(expr, call),
            ExprKind::Index { target, index } => self.index(target, index),
            ExprKind::Indices { .. } => Err(CodegenError::unsupported(at, "generic instantiation")),
            ExprKind::Slice {
                target,
                low,
                high,
                max,
            } => {
                if max.is_some() {
                    return Err(CodegenError::unsupported(at, "three-index slice expression"));
                }
                self.slice_expr(target, low.as_deref(), high.as_deref())
            }
            ExprKind::Selector(selector) => self.selector(expr, selector),
            ExprKind::Deref(inner) => Ok(format!("{}.address.?.*", self.render_expr(inner)?)),
            ExprKind::Composite { elements, .. } => {
                let ty = self.type_of(expr)?;
                self.composite_of(ty, elements, at)
            }
            ExprKind::KeyValue { .. } => Err(CodegenError::invariant(
                at,
                "key-value pair outside a composite literal",
            )),
            ExprKind::FunctionLit(func) => self.function_literal(expr, func),
            ExprKind::TypeAssertion { target, .. } => self.type_assertion(expr, target, false),
            ExprKind::Receive(channel) => Ok(format!("{}.recv(task)", self.render_expr(channel)?)),
            ExprKind::Paren(inner) => Ok(format!("({})", self.render_expr(inner)?)),
        }
    }

    /// Zig name of a local binding; shadowing declarations get a numbered
    /// name because Zig forbids shadowing.
    pub(super) fn local_name(&self, ident: &Identifier) -> String {
        if ident.shadow > 0 {
            quote(&format!("{}.{}", ident.name, ident.shadow))
        } else {
            zig_name(&ident.name)
        }
    }

    /// A local name with a suffix, for the unboxed copy of a parameter.
    pub(super) fn suffixed_name(&self, ident: &Identifier, suffix: &str) -> String {
        if ident.shadow > 0 {
            quote(&format!("{}.{}.{suffix}", ident.name, ident.shadow))
        } else {
            quote(&format!("{}.{suffix}", ident.name))
        }
    }

    pub(super) fn global_name(&self, ident: &Identifier) -> String {
        format!("{}{}", self.package_prefix(ident.package.as_deref()), zig_name(&ident.name))
    }

    pub(super) fn variable(&self, ident: &Identifier) -> String {
        if ident.is_blank() {
            "_".to_string()
        } else if ident.global {
            self.global_name(ident)
        } else if ident.escape().is_boxed() {
            format!("{}.*", self.local_name(ident))
        } else {
            self.local_name(ident)
        }
    }

    /// A top-level function used as a value goes through an adapter with
    /// the closure calling convention.
    fn function_value(&mut self, expr: &Expr, ident: &Identifier) -> Result<String> {
        let at = &expr.location;
        let ty = self.type_of(expr)?;
        let fn_type = self.render_fn_type(ty, at)?;
        let (params, results, _) = self.signature_parts(ty, at)?;
        let adapter = match &ident.package {
            Some(package) => dotted(&[package, &ident.name, "(value)"]),
            None => dotted(&[&ident.name, "(value)"]),
        };
        if self.adapters.insert(adapter.clone()) {
            let args = (0..params.len()).map(|index| quote(&format!("arg.{index}"))).collect::<Vec<_>>();
            let declared = params
                .iter()
                .zip(&args)
                .map(|(param, arg)| Ok(format!(", {arg}: {}", self.render_type(*param, at)?)))
                .collect::<Result<String>>()?;
            let returns = self.render_results(&results, at)?;
            let target = self.global_name(ident);
            let (text, ()) = self.capture(0, |this| {
                this.push_line(&format!("const {adapter} = struct {{"));
                this.indent += 1;
                this.push_line(&format!(
                    "pub fn call(inherited: ?*go.routine, context: ?*const anyopaque{declared}) {returns} {{"
                ));
                this.indent += 1;
                this.push_line("_ = context;");
                this.push_line(&format!(
                    "return {target}({});",
                    std::iter::once("inherited").chain(args.iter().map(String::as_str)).join(", ")
                ));
                this.indent -= 1;
                this.push_line("}");
                this.indent -= 1;
                this.push_line("};");
                Ok(())
            })?;
            self.hoisted.push(text);
        }
        Ok(format!("go.func({fn_type}).make(task, {adapter}{{}})"))
    }

    /// The operand type that decides how an operator is lowered: the typed
    /// side wins over an untyped constant.
    fn operand_type(&self, lhs: &Expr, rhs: &Expr) -> Option<TypeId> {
        [lhs, rhs]
            .iter()
            .filter_map(|expr| expr.ty())
            .find(|ty| !self.types.basic(*ty).is_some_and(BasicKind::is_untyped))
            .or_else(|| lhs.ty())
    }

    /// Operators Zig applies natively only to numbers and booleans.
    fn is_native_operand(&self, ty: Option<TypeId>) -> bool {
        ty.and_then(|ty| self.types.basic(ty)).is_some_and(|basic| {
            !basic.is_string() && !matches!(basic, BasicKind::Complex64 | BasicKind::Complex128)
        })
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<String> {
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            let other = match (&lhs.unparen().kind, &rhs.unparen().kind) {
                (ExprKind::Nil, _) => Some(rhs),
                (_, ExprKind::Nil) => Some(lhs),
                _ => None,
            };
            if let Some(other) = other {
                let test = format!("go.isnil({})", self.render_expr(other)?);
                return Ok(if op == BinaryOp::Eq { test } else { format!("!{test}") });
            }
        }
        let ty = self.operand_type(lhs, rhs);
        let runtime = matches!(op, BinaryOp::Shl | BinaryOp::Shr)
            || (op.is_comparison() && !self.is_native_operand(ty))
            || (op == BinaryOp::Add && ty.is_some_and(|ty| self.types.is_string(ty)));
        let (l, r) = if runtime {
            (self.render_typed_operand(lhs)?, self.render_typed_operand(rhs)?)
        } else {
            (self.render_expr(lhs)?, self.render_expr(rhs)?)
        };
        Ok(self.combine(op, ty, &l, &r))
    }

    /// Applies a binary operator to two rendered operands of type `ty`.
    pub(super) fn combine(&self, op: BinaryOp, ty: Option<TypeId>, l: &str, r: &str) -> String {
        let basic = ty.and_then(|ty| self.types.basic(ty));
        let integer = basic.is_some_and(BasicKind::is_integer);
        let signed = basic.is_some_and(BasicKind::is_signed);
        let complex = matches!(basic, Some(BasicKind::Complex64 | BasicKind::Complex128));
        let string = basic.is_some_and(BasicKind::is_string);
        let native = self.is_native_operand(ty);
        match op {
            BinaryOp::LogicalAnd => format!("({l} and {r})"),
            BinaryOp::LogicalOr => format!("({l} or {r})"),
            BinaryOp::Eq if !native => format!("go.equal({l}, {r})"),
            BinaryOp::Ne if !native => format!("!go.equal({l}, {r})"),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge if !native => {
                format!("(go.compare({l}, {r}) {} 0)", comparison(op))
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                format!("({l} {} {r})", comparison(op))
            }
            BinaryOp::Add if string => format!("go.concat(task, {l}, {r})"),
            BinaryOp::Add if complex => format!("{l}.add({r})"),
            BinaryOp::Sub if complex => format!("{l}.sub({r})"),
            BinaryOp::Mul if complex => format!("{l}.mul({r})"),
            BinaryOp::Div if complex => format!("{l}.div({r})"),
            BinaryOp::Add if integer => format!("({l} +% {r})"),
            BinaryOp::Sub if integer => format!("({l} -% {r})"),
            BinaryOp::Mul if integer => format!("({l} *% {r})"),
            BinaryOp::Div if signed => format!("@divTrunc({l}, {r})"),
            BinaryOp::Rem if signed => format!("@rem({l}, {r})"),
            BinaryOp::Add => format!("({l} + {r})"),
            BinaryOp::Sub => format!("({l} - {r})"),
            BinaryOp::Mul => format!("({l} * {r})"),
            BinaryOp::Div => format!("({l} / {r})"),
            BinaryOp::Rem => format!("({l} % {r})"),
            BinaryOp::And => format!("({l} & {r})"),
            BinaryOp::Or => format!("({l} | {r})"),
            BinaryOp::Xor => format!("({l} ^ {r})"),
            BinaryOp::AndNot => format!("({l} & ~{r})"),
            BinaryOp::Shl => format!("go.shl({l}, {r})"),
            BinaryOp::Shr => format!("go.shr({l}, {r})"),
        }
    }

    fn unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> Result<String> {
        if op == UnaryOp::Address {
            return self.address_of(operand);
        }
        let value = self.render_expr(operand)?;
        let basic = operand.ty().and_then(|ty| self.types.basic(ty));
        Ok(match op {
            UnaryOp::Neg if matches!(basic, Some(BasicKind::Complex64 | BasicKind::Complex128)) => {
                format!("{value}.neg()")
            }
            UnaryOp::Neg if basic.is_some_and(BasicKind::is_integer) => format!("(-%{value})"),
            UnaryOp::Neg => format!("(-{value})"),
            UnaryOp::Plus => value,
            UnaryOp::Not => format!("(!{value})"),
            UnaryOp::Complement => format!("(~{value})"),
            UnaryOp::Address => {
                return Err(CodegenError::invariant(&expr.location, "address operator reached value lowering"));
            }
        })
    }

    fn address_of(&mut self, operand: &Expr) -> Result<String> {
        let at = &operand.location;
        let elem = self.render_type(self.type_of(operand)?, at)?;
        if let ExprKind::Composite { elements, .. } = &operand.unparen().kind {
            let ty = self.type_of(operand)?;
            let literal = self.composite_of(ty, elements, at)?;
            return Ok(format!("go.pointer({elem}).new(task, {literal})"));
        }
        Ok(format!("go.pointer({elem}).to({})", self.place_address(operand)?))
    }

    /// A Zig pointer to the storage an addressable expression denotes.
    pub(super) fn place_address(&mut self, place: &Expr) -> Result<String> {
        let at = &place.location;
        match &place.kind {
            ExprKind::Paren(inner) => self.place_address(inner),
            ExprKind::Variable(ident) if ident.global => Ok(format!("&{}", self.global_name(ident))),
            ExprKind::Variable(ident) if ident.escape().is_boxed() => Ok(self.local_name(ident)),
            ExprKind::Variable(ident) => Ok(format!("&{}", self.local_name(ident))),
            ExprKind::Index { target, index }
                if matches!(self.types.underlying_kind(self.type_of(target)?), TypeKind::Slice { .. }) =>
            {
                Ok(format!("{}.index({})", self.render_expr(target)?, self.render_expr(index)?))
            }
            ExprKind::Deref(inner) => Ok(format!("{}.address.?", self.render_expr(inner)?)),
            ExprKind::Index { .. } | ExprKind::Selector(_) => Ok(format!("&{}", self.render_expr(place)?)),
            ExprKind::Composite { elements, .. } => {
                let ty = self.type_of(place)?;
                let zig = self.render_type(ty, at)?;
                let literal = self.composite_of(ty, elements, at)?;
                Ok(format!("task.malloc({zig}, {literal})"))
            }
            other => Err(CodegenError::unsupported(at, format!("address of {}", other.describe()))),
        }
    }

    fn index(&mut self, target: &Expr, index: &Expr) -> Result<String> {
        let at = &target.location;
        let target_ty = self.type_of(target)?;
        let t = self.render_expr(target)?;
        let i = self.render_expr(index)?;
        match self.types.underlying_kind(target_ty) {
            TypeKind::Slice { .. } => Ok(format!("{t}.index({i}).*")),
            TypeKind::Array { .. } => Ok(format!("{t}[@intCast({i})]")),
            TypeKind::Map { .. } => Ok(format!("{t}.get({i})")),
            TypeKind::Pointer { elem } if matches!(self.types.underlying_kind(*elem), TypeKind::Array { .. }) => {
                Ok(format!("{t}.address.?[@intCast({i})]"))
            }
            TypeKind::Basic { basic } if basic.is_string() => Ok(format!("{t}[@intCast({i})]")),
            _ => Err(CodegenError::unsupported(
                at,
                format!("index of {}", self.types.display(target_ty)),
            )),
        }
    }

    fn bound(&mut self, bound: Option<&Expr>) -> Result<String> {
        bound.map_or_else(|| Ok("null".to_string()), |bound| self.render_expr(bound))
    }

    fn slice_expr(&mut self, target: &Expr, low: Option<&Expr>, high: Option<&Expr>) -> Result<String> {
        let at = &target.location;
        let target_ty = self.type_of(target)?;
        let lo = self.bound(low)?;
        let hi = self.bound(high)?;
        match self.types.underlying_kind(target_ty).clone() {
            TypeKind::Slice { .. } => Ok(format!("{}.sub({lo}, {hi})", self.render_expr(target)?)),
            TypeKind::Basic { basic } if basic.is_string() => {
                Ok(format!("go.substr({}, {lo}, {hi})", self.render_expr(target)?))
            }
            TypeKind::Array { elem, .. } => {
                let elem = self.render_type(elem, at)?;
                let array = self.place_address(target)?;
                Ok(format!("go.slice({elem}).borrow({array}).sub({lo}, {hi})"))
            }
            TypeKind::Pointer { elem } => match self.types.underlying_kind(elem).clone() {
                TypeKind::Array { elem, .. } => {
                    let elem = self.render_type(elem, at)?;
                    let array = self.render_expr(target)?;
                    Ok(format!("go.slice({elem}).borrow({array}.address.?).sub({lo}, {hi})"))
                }
                _ => Err(CodegenError::unsupported(at, format!("slice of {}", self.types.display(target_ty)))),
            },
            _ => Err(CodegenError::unsupported(at, format!("slice of {}", self.types.display(target_ty)))),
        }
    }

    fn selector(&mut self, expr: &Expr, selector: &SelectorExpr) -> Result<String> {
        let at = &expr.location;
        match selector.kind {
            SelectionKind::Qualified => {
                // Package variables of function type are taken for functions.
                let is_function = expr
                    .ty()
                    .is_some_and(|ty| matches!(self.types.kind(ty), TypeKind::Signature { .. }));
                if is_function {
                    self.function_value(expr, &selector.field)
                } else {
                    Ok(self.qualified(selector))
                }
            }
            SelectionKind::Field => self.field_access(selector, at),
            SelectionKind::Method => Err(CodegenError::unsupported(at, "method value")),
            SelectionKind::MethodExpr => Err(CodegenError::unsupported(at, "method expression")),
        }
    }

    /// `pkg.Name` for a name declared in another package. The prefix is the
    /// declared package name the header imports, never the file-local alias.
    pub(super) fn qualified(&self, selector: &SelectorExpr) -> String {
        let package = selector.field.package.as_deref().or(match &selector.target.unparen().kind {
            ExprKind::Package(package) => Some(package.name.as_str()),
            _ => None,
        });
        format!("{}{}", self.package_prefix(package), zig_name(&selector.field.name))
    }

    /// Steps into field `index` of a struct value or of the struct a pointer
    /// refers to.
    pub(super) fn step_field(&self, text: String, ty: TypeId, index: usize, at: &Location) -> Result<(String, TypeId)> {
        let (base, struct_ty) = if self.types.is_pointer(ty) {
            (format!("{text}.address.?"), self.types.deref(ty))
        } else {
            (text, ty)
        };
        let field = self.types.fields(struct_ty).get(index).ok_or_else(|| {
            CodegenError::invariant(at, format!("{} has no field #{index}", self.types.display(struct_ty)))
        })?;
        Ok((format!("{base}.{}", field_name(&field.name)), field.ty))
    }

    /// Receiver text and type after walking the embedded fields of a
    /// selection, the final field or method excluded.
    pub(super) fn promoted(&mut self, selector: &SelectorExpr, at: &Location) -> Result<(String, TypeId)> {
        let mut text = self.render_expr(&selector.target)?;
        let mut ty = self.type_of(&selector.target)?;
        let embedded = selector.path.len().saturating_sub(1);
        for &index in &selector.path[..embedded] {
            (text, ty) = self.step_field(text, ty, index, at)?;
        }
        Ok((text, ty))
    }

    fn field_access(&mut self, selector: &SelectorExpr, at: &Location) -> Result<String> {
        let (text, ty) = self.promoted(selector, at)?;
        match selector.path.last() {
            Some(&index) => Ok(self.step_field(text, ty, index, at)?.0),
            None if self.types.is_pointer(ty) => Ok(format!("{text}.address.?.{}", field_name(&selector.field.name))),
            None => Ok(format!("{text}.{}", field_name(&selector.field.name))),
        }
    }

    /// A composite literal whose type was elided inside an enclosing one.
    pub(super) fn elided_composite(&mut self, slot: TypeId, elements: &[Expr], at: &Location) -> Result<String> {
        if self.types.is_pointer(slot) {
            let elem = self.types.deref(slot);
            let zig = self.render_type(elem, at)?;
            let literal = self.composite_of(elem, elements, at)?;
            return Ok(format!("go.pointer({zig}).new(task, {literal})"));
        }
        self.composite_of(slot, elements, at)
    }

    pub(super) fn composite_of(&mut self, ty: TypeId, elements: &[Expr], at: &Location) -> Result<String> {
        let zig = self.render_type(ty, at)?;
        match self.types.underlying_kind(ty).clone() {
            TypeKind::Struct { fields } => {
                let mut inits = Vec::with_capacity(elements.len());
                for (position, element) in elements.iter().enumerate() {
                    let (field, value) = match &element.kind {
                        ExprKind::KeyValue { key, value } => {
                            let name = match &key.kind {
                                ExprKind::Variable(ident) => &ident.name,
                                _ => return Err(CodegenError::invariant(&key.location, "struct literal key is not a field name")),
                            };
                            let field = fields.iter().find(|field| &field.name == name).ok_or_else(|| {
                                CodegenError::invariant(&key.location, format!("{} has no field {name}", self.types.display(ty)))
                            })?;
                            (field, value.as_ref())
                        }
                        _ => {
                            let field = fields.get(position).ok_or_else(|| {
                                CodegenError::invariant(&element.location, "too many values in struct literal")
                            })?;
                            (field, element)
                        }
                    };
                    let value = self.value_for(field.ty, value)?;
                    inits.push(format!(".{} = {value}", field_name(&field.name)));
                }
                if inits.is_empty() {
                    Ok(format!("{zig}{{}}"))
                } else {
                    Ok(format!("{zig}{{ {} }}", inits.join(", ")))
                }
            }
            TypeKind::Array { len, elem } => {
                let values = self.positional(elem, elements, at)?;
                let elem = self.render_type(elem, at)?;
                Ok(format!("go.array({elem}, {len}, .{{ {} }})", values.join(", ")))
            }
            TypeKind::Slice { elem } => {
                let values = self.positional(elem, elements, at)?;
                Ok(format!("{zig}.from(task, .{{ {} }})", values.join(", ")))
            }
            TypeKind::Map { key, value } => {
                let mut entries = Vec::with_capacity(elements.len());
                for element in elements {
                    let ExprKind::KeyValue { key: k, value: v } = &element.kind else {
                        return Err(CodegenError::invariant(&element.location, "map literal entry without a key"));
                    };
                    let k = self.value_for(key, k)?;
                    let v = self.value_for(value, v)?;
                    entries.push(format!(".{{ {k}, {v} }}"));
                }
                Ok(format!("{zig}.from(task, .{{ {} }})", entries.join(", ")))
            }
            _ => Err(CodegenError::unsupported(
                at,
                format!("composite literal of type {}", self.types.display(ty)),
            )),
        }
    }

    fn positional(&mut self, elem: TypeId, elements: &[Expr], at: &Location) -> Result<Vec<String>> {
        elements
            .iter()
            .map(|element| match &element.kind {
                ExprKind::KeyValue { .. } => Err(CodegenError::unsupported(at, "indexed element in a sequence literal")),
                _ => self.value_for(elem, element),
            })
            .collect()
    }

    /// Hoists a function literal into a context struct and returns the
    /// `go.func` value that binds its captures.
    fn function_literal(&mut self, expr: &Expr, func: &Function) -> Result<String> {
        let at = &expr.location;
        let ty = self.type_of(expr)?;
        let fn_type = self.render_fn_type(ty, at)?;
        let name = self.fresh("closure");
        let captures = captured_variables(func);
        let mut fields = Vec::with_capacity(captures.len());
        let mut inits = Vec::with_capacity(captures.len());
        for ident in &captures {
            let var_ty = ident.typed.ty.ok_or_else(|| {
                CodegenError::invariant(&ident.location, format!("captured {} has no resolved type", ident.name))
            })?;
            let var_ty = self.render_type(var_ty, &ident.location)?;
            let local = self.local_name(ident);
            let field_ty = if ident.escape().is_boxed() {
                format!("*{var_ty}")
            } else {
                var_ty
            };
            fields.push(format!("{local}: {field_ty},"));
            inits.push(format!(".{local} = {local}"));
        }
        let (text, ()) = self.capture(0, |this| {
            this.push_line(&format!("const {name} = struct {{"));
            this.indent += 1;
            for field in &fields {
                this.push_line(field);
            }
            if !fields.is_empty() {
                this.push_blank_line();
            }
            this.emit_function("pub fn call", None, func, FunctionKind::Closure { captures: &captures })?;
            this.indent -= 1;
            this.push_line("};");
            Ok(())
        })?;
        self.hoisted.push(text);
        let context = if inits.is_empty() {
            format!("{name}{{}}")
        } else {
            format!("{name}{{ {} }}", inits.join(", "))
        };
        Ok(format!("go.func({fn_type}).make(task, {context})"))
    }

    pub(super) fn type_assertion(&mut self, expr: &Expr, target: &Expr, with_ok: bool) -> Result<String> {
        let at = &expr.location;
        let asserted = match &expr.kind {
            ExprKind::TypeAssertion { ty: Some(ty), .. } => ty.typed.ty,
            _ => None,
        }
        .or(expr.ty())
        .ok_or_else(|| CodegenError::invariant(at, "type assertion without a resolved type"))?;
        if self.types.is_interface(asserted) {
            return Err(CodegenError::unsupported(at, "type assertion to an interface type"));
        }
        let zig = self.render_type(asserted, at)?;
        let rtype = self.rtype_ref(asserted, at)?;
        let value = self.render_expr(target)?;
        let assert = if with_ok { "assert2" } else { "assert" };
        Ok(format!("go.{assert}({zig}, {rtype}, {value})"))
    }
}

fn comparison(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        _ => ">=",
    }
}
