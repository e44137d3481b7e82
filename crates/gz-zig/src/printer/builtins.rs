use gz_core::ir::{CallExpr, Expr};
use gz_core::{CodegenError, Result, TypeKind};

use super::ZigEmitter;

/// Builtins that produce no value.
pub(super) const VOID_BUILTINS: &[&str] = &["clear", "close", "delete", "panic", "print", "println"];

/// Builtins whose call can be deferred, evaluating the arguments first.
pub(super) const DEFERRABLE_BUILTINS: &[&str] = VOID_BUILTINS;

impl ZigEmitter<'_> {
    pub(super) fn builtin(&mut self, expr: &Expr, name: &str, call: &CallExpr) -> Result<String> {
        self.builtin_with(expr, name, call, None)
    }

    /// Lowers a builtin call. With `packed`, arguments are read from that
    /// tuple instead of being evaluated in place.
    pub(super) fn builtin_with(&mut self, expr: &Expr, name: &str, call: &CallExpr, packed: Option<&str>) -> Result<String> {
        let at = &expr.location;
        let args = &call.args;
        let arg = |this: &mut Self, index: usize| -> Result<String> {
            match packed {
                Some(tuple) => Ok(format!("{tuple}[{index}]")),
                None => {
                    let arg = args
                        .get(index)
                        .ok_or_else(|| CodegenError::invariant(at, format!("{name} is missing argument {index}")))?;
                    this.render_expr(arg)
                }
            }
        };
        let rendered = match name {
            "len" | "cap" => format!("go.{name}({})", arg(self, 0)?),
            "append" => {
                let slice = args
                    .first()
                    .ok_or_else(|| CodegenError::invariant(at, "append without a slice"))?;
                let target = arg(self, 0)?;
                let elem = self
                    .types
                    .elem(self.type_of(slice)?)
                    .ok_or_else(|| CodegenError::invariant(at, "append to a non-slice"))?;
                if call.ellipsis {
                    format!("{target}.extend(task, {})", arg(self, 1)?)
                } else if args.len() == 1 {
                    target
                } else {
                    let items = args[1..]
                        .iter()
                        .map(|item| self.value_for(elem, item))
                        .collect::<Result<Vec<_>>>()?;
                    format!("{target}.append(task, .{{ {} }})", items.join(", "))
                }
            }
            "copy" => format!("go.copy({}, {})", arg(self, 0)?, arg(self, 1)?),
            "clear" => format!("{}.clear()", arg(self, 0)?),
            "delete" => format!("{}.delete({})", arg(self, 0)?, arg(self, 1)?),
            "close" => format!("{}.close(task)", arg(self, 0)?),
            "panic" => {
                let value = match packed {
                    Some(tuple) => format!("{tuple}[0]"),
                    None => {
                        let value = args
                            .first()
                            .ok_or_else(|| CodegenError::invariant(at, "panic without a value"))?;
                        self.render_typed_operand(value)?
                    }
                };
                format!("go.panic(task, {value})")
            }
            "print" | "println" => {
                let values = match packed {
                    Some(tuple) => tuple.to_string(),
                    None => {
                        let values = args
                            .iter()
                            .map(|value| self.render_typed_operand(value))
                            .collect::<Result<Vec<_>>>()?;
                        format!(".{{ {} }}", values.join(", "))
                    }
                };
                format!("go.{name}({values})")
            }
            "new" => {
                let ty = self.type_of(args.first().ok_or_else(|| CodegenError::invariant(at, "new without a type"))?)?;
                let zig = self.render_type(ty, at)?;
                format!("go.pointer({zig}).new(task, go.zero({zig}))")
            }
            "make" => {
                let ty = self.type_of(args.first().ok_or_else(|| CodegenError::invariant(at, "make without a type"))?)?;
                let zig = self.render_type(ty, at)?;
                match self.types.underlying_kind(ty) {
                    TypeKind::Slice { .. } => {
                        let len = arg(self, 1)?;
                        let cap = if args.len() > 2 { arg(self, 2)? } else { len.clone() };
                        format!("{zig}.make(task, {len}, {cap})")
                    }
                    TypeKind::Map { .. } => format!("{zig}.make(task)"),
                    TypeKind::Chan { .. } => {
                        let cap = if args.len() > 1 { arg(self, 1)? } else { "0".to_string() };
                        format!("{zig}.make(task, {cap})")
                    }
                    _ => return Err(CodegenError::unsupported(at, format!("make of {}", self.types.display(ty)))),
                }
            }
            "min" | "max" => {
                let values = (0..args.len()).map(|index| arg(self, index)).collect::<Result<Vec<_>>>()?;
                let numeric = expr.ty().is_some_and(|ty| !self.types.is_string(ty));
                match values.as_slice() {
                    [single] => single.clone(),
                    _ if numeric => format!("@{name}({})", values.join(", ")),
                    _ => format!("go.{name}(.{{ {} }})", values.join(", ")),
                }
            }
            "complex" => format!("go.complex128.init({}, {})", arg(self, 0)?, arg(self, 1)?),
            "real" => format!("{}.re", arg(self, 0)?),
            "imag" => format!("{}.im", arg(self, 0)?),
            other => return Err(CodegenError::unsupported(at, format!("builtin {other}"))),
        };
        Ok(rendered)
    }
}
