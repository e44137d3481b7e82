use gz_core::ir::{CallExpr, Expr, ExprKind, SelectionKind, SelectorExpr};
use gz_core::{CodegenError, Location, Result, TypeId, TypeKind};
use itertools::Itertools;

use super::utils::{dotted, field_name};
use super::ZigEmitter;

/// What a call jumps to.
#[derive(Debug)]
pub(super) enum Callee {
    /// A named Zig function taking the routine handle first.
    Direct(String),
    /// A `go.func` value.
    Value(String),
}

/// A call with its callee and arguments rendered but not yet assembled, so
/// `go` and `defer` can package it differently.
#[derive(Debug)]
pub(super) struct LoweredCall {
    pub callee: Callee,
    pub args: Vec<String>,
    pub returns_value: bool,
}

impl LoweredCall {
    pub fn render(&self) -> String {
        match &self.callee {
            Callee::Direct(function) => format!(
                "{function}({})",
                std::iter::once("task").chain(self.args.iter().map(String::as_str)).join(", ")
            ),
            Callee::Value(value) => format!("{value}.invoke(task, {})", self.tuple()),
        }
    }

    /// The arguments as a Zig tuple literal.
    pub fn tuple(&self) -> String {
        if self.args.is_empty() {
            ".{}".to_string()
        } else {
            format!(".{{ {} }}", self.args.join(", "))
        }
    }
}

impl ZigEmitter<'_> {
    pub(super) fn render_call(&mut self, expr: &Expr, call: &CallExpr) -> Result<String> {
        match &call.callee.unparen().kind {
            ExprKind::Builtin(ident) => self.builtin(expr, &ident.name, call),
            ExprKind::Type(_) => self.conversion(expr, call),
            _ => Ok(self.lower_call(expr, call)?.render()),
        }
    }

    pub(super) fn lower_call(&mut self, expr: &Expr, call: &CallExpr) -> Result<LoweredCall> {
        let at = &expr.location;
        let callee = call.callee.unparen();
        let (params, results, variadic) = self.signature_parts(self.type_of(callee)?, at)?;
        let mut args = Vec::with_capacity(call.args.len() + 1);
        let callee = match &callee.kind {
            ExprKind::Function(ident) => Callee::Direct(self.global_name(ident)),
            ExprKind::Selector(selector) if selector.kind == SelectionKind::Qualified => {
                Callee::Direct(self.qualified(selector))
            }
            ExprKind::Selector(selector) if selector.kind == SelectionKind::Method => {
                let (callee, receiver) = self.method_callee(selector, at)?;
                args.push(receiver);
                callee
            }
            ExprKind::Selector(selector) if selector.kind == SelectionKind::MethodExpr => {
                return Err(CodegenError::unsupported(at, "method expression call"));
            }
            ExprKind::Builtin(ident) => {
                return Err(CodegenError::unsupported(
                    at,
                    format!("builtin {} in this position", ident.name),
                ));
            }
            _ => Callee::Value(self.render_expr(callee)?),
        };
        args.extend(self.call_args(call, &params, variadic, at)?);
        Ok(LoweredCall {
            callee,
            args,
            returns_value: !results.is_empty(),
        })
    }

    fn call_args(&mut self, call: &CallExpr, params: &[TypeId], variadic: bool, at: &Location) -> Result<Vec<String>> {
        if call.args.len() == 1 && params.len() > 1 {
            let spread = call.args[0]
                .ty()
                .is_some_and(|ty| matches!(self.types.kind(ty), TypeKind::Tuple { .. }));
            if spread {
                return Err(CodegenError::unsupported(at, "multi-value call used as arguments"));
            }
        }
        let fixed = if variadic { params.len().saturating_sub(1) } else { params.len() };
        let mut args = Vec::with_capacity(params.len());
        for (param, arg) in params.iter().zip(&call.args).take(fixed) {
            args.push(self.value_for(*param, arg)?);
        }
        if !variadic {
            return Ok(args);
        }
        let Some(&slice) = params.last() else {
            return Err(CodegenError::invariant(at, "variadic signature without parameters"));
        };
        let rest = call.args.get(fixed..).unwrap_or_default();
        if call.ellipsis {
            let spread = rest
                .first()
                .ok_or_else(|| CodegenError::invariant(at, "spread call without a spread argument"))?;
            args.push(self.render_expr(spread)?);
        } else {
            let elem = self
                .types
                .elem(slice)
                .ok_or_else(|| CodegenError::invariant(at, "variadic parameter is not a slice"))?;
            let items = rest
                .iter()
                .map(|arg| self.value_for(elem, arg))
                .collect::<Result<Vec<_>>>()?;
            let elem = self.render_type(elem, at)?;
            args.push(format!("go.variadic(task, {elem}, .{{ {} }})", items.join(", ")));
        }
        Ok(args)
    }

    /// Callee and receiver argument of a method call.
    fn method_callee(&mut self, selector: &SelectorExpr, at: &Location) -> Result<(Callee, String)> {
        let (receiver, receiver_ty) = self.promoted(selector, at)?;
        if self.types.is_interface(receiver_ty) {
            if has_call(&selector.target) {
                return Err(CodegenError::unsupported(at, "interface method call on a computed receiver"));
            }
            let method = field_name(&selector.field.name);
            return Ok((
                Callee::Direct(format!("{receiver}.itab.?.{method}")),
                format!("{receiver}.address"),
            ));
        }
        let on_pointer = self.types.is_pointer(receiver_ty);
        let named = self.types.deref(receiver_ty);
        let TypeKind::Named {
            package,
            name,
            methods,
            ..
        } = self.types.kind(named)
        else {
            return Err(CodegenError::unsupported(
                at,
                format!("method on {}", self.types.display(receiver_ty)),
            ));
        };
        let wants_pointer = methods
            .iter()
            .find(|method| method.name == selector.field.name)
            .map_or(on_pointer, |method| method.pointer_receiver);
        let callee = format!(
            "{}{}",
            self.package_prefix(package.as_deref()),
            dotted(&[name, &selector.field.name])
        );
        let receiver = match (wants_pointer, on_pointer) {
            (true, false) => {
                let zig = self.render_type(named, at)?;
                let address = if selector.path.len() > 1 {
                    format!("&{receiver}")
                } else {
                    self.place_address(&selector.target)?
                };
                format!("go.pointer({zig}).to({address})")
            }
            (false, true) => format!("{receiver}.address.?.*"),
            _ => receiver,
        };
        Ok((Callee::Direct(callee), receiver))
    }

    /// `T(x)`; conversions to interfaces box the value.
    fn conversion(&mut self, expr: &Expr, call: &CallExpr) -> Result<String> {
        let at = &expr.location;
        let target = self.type_of(expr)?;
        let [arg] = call.args.as_slice() else {
            return Err(CodegenError::invariant(at, "conversion takes exactly one argument"));
        };
        if self.types.is_interface(target) {
            return self.value_for(target, arg);
        }
        let zig = self.render_type(target, at)?;
        let value = self.render_typed_operand(arg)?;
        Ok(format!("go.convert({zig}, task, {value})"))
    }
}

/// Whether evaluating the expression runs a call, so it cannot be repeated.
fn has_call(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call(_) | ExprKind::Receive(_) => true,
        ExprKind::Paren(inner) | ExprKind::Deref(inner) => has_call(inner),
        ExprKind::Selector(selector) => has_call(&selector.target),
        ExprKind::Index { target, index } => has_call(target) || has_call(index),
        ExprKind::Binary { lhs, rhs, .. } => has_call(lhs) || has_call(rhs),
        ExprKind::Unary { operand, .. } => has_call(operand),
        _ => false,
    }
}
