use gz_core::ir::Expr;
use gz_core::types::{BasicKind, Field};
use gz_core::{CodegenError, Location, Result, TypeId, TypeKind};
use itertools::Itertools;

use super::utils::{field_name, zig_name};
use super::ZigEmitter;

impl ZigEmitter<'_> {
    /// Resolved type of an expression; generation cannot proceed without one.
    pub(super) fn type_of(&self, expr: &Expr) -> Result<TypeId> {
        expr.ty().filter(|ty| self.types.contains(*ty)).ok_or_else(|| {
            CodegenError::invariant(
                &expr.location,
                format!("{} has no resolved type", expr.kind.describe()),
            )
        })
    }

    pub(super) fn render_type(&self, id: TypeId, at: &Location) -> Result<String> {
        if !self.types.contains(id) {
            return Err(CodegenError::invariant(at, format!("reference to missing type #{}", id.0)));
        }
        let rendered = match self.types.kind(id) {
            TypeKind::Basic { basic } => self.render_basic(*basic, at)?.to_string(),
            TypeKind::Named { package, name, .. } => self.named_type(package.as_deref(), name),
            TypeKind::Pointer { elem } => format!("go.pointer({})", self.render_type(*elem, at)?),
            TypeKind::Array { len, elem } => format!("[{len}]{}", self.render_type(*elem, at)?),
            TypeKind::Slice { elem } => format!("go.slice({})", self.render_type(*elem, at)?),
            TypeKind::Map { key, value } => {
                if self.types.is_string(*key) {
                    format!("go.smap({})", self.render_type(*value, at)?)
                } else {
                    format!(
                        "go.map({}, {})",
                        self.render_type(*key, at)?,
                        self.render_type(*value, at)?
                    )
                }
            }
            TypeKind::Chan { elem, .. } => format!("go.chan({})", self.render_type(*elem, at)?),
            TypeKind::Signature { .. } => format!("go.func({})", self.render_fn_type(id, at)?),
            TypeKind::Interface { methods } => {
                if !methods.is_empty() {
                    return Err(CodegenError::unsupported(at, "interface type literal with methods"));
                }
                "go.any".to_string()
            }
            TypeKind::Struct { fields } => format!("struct {{ {} }}", self.render_fields(fields, at)?.join(" ")),
            TypeKind::Tuple { elems } => self.render_results(elems, at)?,
            TypeKind::Param { name } => {
                return Err(CodegenError::unsupported(at, format!("type parameter {name}")));
            }
        };
        Ok(rendered)
    }

    pub(super) fn render_basic(&self, basic: BasicKind, at: &Location) -> Result<&'static str> {
        let rendered = match basic {
            BasicKind::Bool | BasicKind::UntypedBool => "bool",
            BasicKind::Int | BasicKind::UntypedInt => "isize",
            BasicKind::Int8 => "i8",
            BasicKind::Int16 => "i16",
            BasicKind::Int32 | BasicKind::UntypedRune => "i32",
            BasicKind::Int64 => "i64",
            BasicKind::Uint | BasicKind::Uintptr => "usize",
            BasicKind::Uint8 => "u8",
            BasicKind::Uint16 => "u16",
            BasicKind::Uint32 => "u32",
            BasicKind::Uint64 => "u64",
            BasicKind::Float32 => "f32",
            BasicKind::Float64 | BasicKind::UntypedFloat => "f64",
            BasicKind::Complex64 => "go.complex64",
            BasicKind::Complex128 => "go.complex128",
            BasicKind::String | BasicKind::UntypedString => "go.string",
            BasicKind::UnsafePointer => return Err(CodegenError::unsupported(at, "unsafe.Pointer")),
            BasicKind::UntypedNil | BasicKind::Invalid => {
                return Err(CodegenError::invariant(at, format!("{} has no runtime type", basic.name())));
            }
        };
        Ok(rendered)
    }

    pub(super) fn named_type(&self, package: Option<&str>, name: &str) -> String {
        match package {
            None => match name {
                "error" => "go.@\"error\"".to_string(),
                "any" => "go.any".to_string(),
                other => format!("go.{}", zig_name(other)),
            },
            Some(package) => format!("{}{}", self.package_prefix(Some(package)), zig_name(name)),
        }
    }

    /// Struct fields with their zero values as defaults.
    pub(super) fn render_fields(&self, fields: &[Field], at: &Location) -> Result<Vec<String>> {
        fields
            .iter()
            .map(|field| {
                let ty = self.render_type(field.ty, at)?;
                Ok(format!("{}: {ty} = go.zero({ty}),", field_name(&field.name)))
            })
            .collect()
    }

    /// Parameter and result types of a function type.
    pub(super) fn signature_parts(&self, id: TypeId, at: &Location) -> Result<(Vec<TypeId>, Vec<TypeId>, bool)> {
        match self.types.underlying_kind(id) {
            TypeKind::Signature {
                params,
                results,
                variadic,
                ..
            } => Ok((params.clone(), results.clone(), *variadic)),
            _ => Err(CodegenError::invariant(
                at,
                format!("{} is not a function type", self.types.display(id)),
            )),
        }
    }

    /// `void`, the single result type, or a tuple type for several results.
    pub(super) fn render_results(&self, results: &[TypeId], at: &Location) -> Result<String> {
        match results {
            [] => Ok("void".to_string()),
            [single] => self.render_type(*single, at),
            many => Ok(format!(
                "struct {{ {} }}",
                many.iter()
                    .map(|ty| self.render_type(*ty, at))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ")
            )),
        }
    }

    /// The Zig function type behind a `go.func` value: handle, closure
    /// context, then the Go parameters.
    pub(super) fn render_fn_type(&self, signature: TypeId, at: &Location) -> Result<String> {
        self.render_erased_fn(signature, "?*const anyopaque", at)
    }

    /// The Zig function type of an interface method table entry.
    pub(super) fn render_method_fn(&self, signature: TypeId, at: &Location) -> Result<String> {
        self.render_erased_fn(signature, "?*anyopaque", at)
    }

    fn render_erased_fn(&self, signature: TypeId, context: &str, at: &Location) -> Result<String> {
        let (params, results, _) = self.signature_parts(signature, at)?;
        let params = params
            .iter()
            .map(|param| self.render_type(*param, at))
            .collect::<Result<Vec<_>>>()?;
        let leading = ["?*go.routine".to_string(), context.to_string()];
        Ok(format!(
            "fn ({}) {}",
            leading.iter().chain(&params).join(", "),
            self.render_results(&results, at)?
        ))
    }

    /// Address of the reflection descriptor of a type.
    pub(super) fn rtype_ref(&self, id: TypeId, at: &Location) -> Result<String> {
        match self.types.kind(id) {
            TypeKind::Basic { basic } => {
                self.render_basic(*basic, at)?;
                let name = match basic {
                    BasicKind::UntypedBool => "bool",
                    BasicKind::UntypedInt => "int",
                    BasicKind::UntypedRune => "int32",
                    BasicKind::UntypedFloat => "float64",
                    BasicKind::UntypedString => "string",
                    other => other.name(),
                };
                Ok(format!("&go.rtypes.{}", field_name(name)))
            }
            TypeKind::Named { package: None, name, .. } if name == "error" => Ok("&go.rtypes.@\"error\"".to_string()),
            TypeKind::Named {
                package: Some(package),
                name,
                ..
            } => Ok(format!(
                "&{}{}",
                self.package_prefix(Some(package)),
                super::utils::dotted(&[name, "(type)"])
            )),
            _ => Ok(format!("go.rtypeOf({})", self.render_type(id, at)?)),
        }
    }

    /// Tag of `go.rkind` describing the structure of a type.
    pub(super) fn rkind(&self, id: TypeId) -> String {
        let name = match self.types.underlying_kind(id) {
            TypeKind::Basic { basic } => match basic {
                BasicKind::UntypedBool => "bool",
                BasicKind::UntypedInt => "int",
                BasicKind::UntypedRune => "int32",
                BasicKind::UntypedFloat => "float64",
                BasicKind::UntypedString => "string",
                BasicKind::UnsafePointer => "unsafe_pointer",
                other => other.name(),
            },
            TypeKind::Named { .. } | TypeKind::Param { .. } | TypeKind::Tuple { .. } => "invalid",
            TypeKind::Pointer { .. } => "pointer",
            TypeKind::Array { .. } => "array",
            TypeKind::Slice { .. } => "slice",
            TypeKind::Map { .. } => "map",
            TypeKind::Chan { .. } => "chan",
            TypeKind::Signature { .. } => "func",
            TypeKind::Interface { .. } => "interface",
            TypeKind::Struct { .. } => "struct",
        };
        format!(".{}", field_name(name))
    }
}
