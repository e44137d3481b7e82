use gz_core::ir::{Expr, ExprKind, LiteralKind};
use gz_core::types::BasicKind;
use gz_core::{CodegenError, ConstValue, Result, TypeId, TypeKind};
use itertools::Itertools;

use super::utils::{dotted, field_name, render_float, string_literal};
use super::ZigEmitter;

impl ZigEmitter<'_> {
    /// Spelling of a constant resolved by the type checker.
    pub(super) fn render_constant(&self, value: &ConstValue, ty: Option<TypeId>) -> String {
        match value {
            ConstValue::Bool(value) => value.to_string(),
            ConstValue::Int(value) => value.to_string(),
            ConstValue::Uint(value) => value.to_string(),
            ConstValue::Float(value) => render_float(*value),
            ConstValue::String(value) => string_literal(value),
            ConstValue::Complex(re, im) => {
                let complex = match ty.and_then(|ty| self.types.basic(ty)) {
                    Some(BasicKind::Complex64) => "complex64",
                    _ => "complex128",
                };
                format!("go.{complex}.init({}, {})", render_float(*re), render_float(*im))
            }
        }
    }

    /// A constant with its Go type made explicit, for positions where Zig
    /// would otherwise see a `comptime_int` or a string literal.
    pub(super) fn render_typed_operand(&mut self, expr: &Expr) -> Result<String> {
        match (&expr.typed.constant, expr.ty()) {
            (Some(value), Some(ty)) if self.types.basic(ty).is_some() => {
                let zig = self.render_type(ty, &expr.location)?;
                Ok(format!("@as({zig}, {})", self.render_constant(value, Some(ty))))
            }
            _ => self.render_expr(expr),
        }
    }

    /// Literal fallback for nodes the checker left without a constant.
    pub(super) fn render_literal(&self, expr: &Expr, kind: LiteralKind, raw: &str) -> Result<String> {
        match kind {
            LiteralKind::Int | LiteralKind::Float if !raw.starts_with('0') || raw == "0" || raw.contains('.') => {
                Ok(raw.to_string())
            }
            _ => Err(CodegenError::invariant(
                &expr.location,
                format!("literal {raw} has no resolved value"),
            )),
        }
    }

    /// The value stored into a slot of type `slot`, boxing concrete values
    /// that flow into interfaces.
    pub(super) fn value_for(&mut self, slot: TypeId, expr: &Expr) -> Result<String> {
        let at = &expr.location;
        if let ExprKind::Composite { ty: None, elements } = &expr.unparen().kind {
            return self.elided_composite(slot, elements, at);
        }
        if !self.types.is_interface(slot) {
            return self.render_expr(expr);
        }
        if matches!(expr.unparen().kind, ExprKind::Nil) {
            return Ok(".{}".to_string());
        }
        let value_ty = self.type_of(expr)?;
        if self.types.is_nil(value_ty) {
            return Ok(".{}".to_string());
        }
        if self.types.is_interface(value_ty) {
            return if value_ty == slot {
                self.render_expr(expr)
            } else if self.types.is_empty_interface(slot) {
                Ok(format!("go.any.erase({})", self.render_expr(expr)?))
            } else {
                Err(CodegenError::unsupported(
                    at,
                    format!(
                        "conversion from {} to {}",
                        self.types.display(value_ty),
                        self.types.display(slot)
                    ),
                ))
            };
        }
        self.box_interface(slot, value_ty, expr)
    }

    fn box_interface(&mut self, slot: TypeId, value_ty: TypeId, expr: &Expr) -> Result<String> {
        let at = &expr.location;
        let value = self.render_typed_operand(expr)?;
        let concrete = self.render_type(value_ty, at)?;
        let rtype = self.rtype_ref(value_ty, at)?;
        if self.types.is_empty_interface(slot) {
            return Ok(format!("go.any.make(task, {concrete}, {rtype}, {value})"));
        }
        let iface = self.render_type(slot, at)?;
        let named = self.types.deref(value_ty);
        let TypeKind::Named { package, name, .. } = self.types.kind(named) else {
            return Err(CodegenError::unsupported(
                at,
                format!("{} used as {}", self.types.display(value_ty), self.types.display(slot)),
            ));
        };
        let declaring = package.clone().unwrap_or_else(|| self.package.name.clone());
        let prefix = self.package_prefix(Some(&declaring));
        let entries = self
            .types
            .methods(slot)
            .iter()
            .map(|method| {
                format!(
                    ".{} = &{prefix}{}",
                    field_name(&method.name),
                    dotted(&[&declaring, name, &method.name, "(itfc)"])
                )
            })
            .join(", ");
        Ok(format!("{iface}.make(task, {concrete}, {rtype}, {value}, &.{{ {entries} }})"))
    }

    /// Initializer of a package variable that Zig can evaluate at compile
    /// time, if there is one.
    pub(super) fn static_value(&mut self, ty: TypeId, expr: &Expr) -> Result<Option<String>> {
        let at = &expr.location;
        if let Some(value) = &expr.typed.constant {
            if self.types.is_interface(ty) {
                return Ok(None);
            }
            return Ok(Some(self.render_constant(value, Some(ty))));
        }
        if matches!(expr.unparen().kind, ExprKind::Nil) {
            return Ok(Some(".{}".to_string()));
        }
        let ExprKind::Composite { elements, .. } = &expr.unparen().kind else {
            return Ok(None);
        };
        if elements.iter().any(|element| element.typed.constant.is_none()) {
            return Ok(None);
        }
        let values = elements
            .iter()
            .filter_map(|element| element.typed.constant.as_ref().map(|value| (value, element.ty())))
            .map(|(value, ty)| self.render_constant(value, ty))
            .collect::<Vec<_>>();
        let zig = self.render_type(ty, at)?;
        let rendered = match self.types.underlying_kind(ty) {
            TypeKind::Slice { .. } => format!("{zig}.literal({}, .{{ {} }})", values.len(), values.join(", ")),
            TypeKind::Array { len, elem } => {
                let elem = self.render_type(*elem, at)?;
                format!("go.array({elem}, {len}, .{{ {} }})", values.join(", "))
            }
            _ => return Ok(None),
        };
        Ok(Some(rendered))
    }
}
