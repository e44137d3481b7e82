//! Resolved types, as computed by the host type checker.
//!
//! The table is an arena: every distinct type the host saw in a package gets
//! one slot, and IR nodes refer to slots through [`TypeId`]. The loader
//! validates every id before the IR is built, so lookups here index directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedString,
    UntypedNil,
    Invalid,
}

impl BasicKind {
    /// Go spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
            BasicKind::Invalid => "invalid type",
        }
    }

    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, BasicKind::UntypedInt | BasicKind::UntypedRune)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BasicKind::Int | BasicKind::Int8 | BasicKind::Int16 | BasicKind::Int32 | BasicKind::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat)
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub embedded: bool,
}

impl Field {
    pub fn exported(&self) -> bool {
        is_exported(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: TypeId,
    /// Declared on `*T` rather than `T`.
    #[serde(default)]
    pub pointer_receiver: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Basic {
        basic: BasicKind,
    },
    Named {
        /// Name of the declaring package, `None` for universe types like `error`.
        #[serde(default)]
        package: Option<String>,
        name: String,
        underlying: TypeId,
        #[serde(default)]
        methods: Vec<Method>,
    },
    Pointer {
        elem: TypeId,
    },
    Array {
        len: u64,
        elem: TypeId,
    },
    Slice {
        elem: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: TypeId,
    },
    Signature {
        #[serde(default)]
        params: Vec<TypeId>,
        #[serde(default)]
        results: Vec<TypeId>,
        #[serde(default)]
        variadic: bool,
        #[serde(default)]
        recv: Option<TypeId>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<Method>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    Tuple {
        elems: Vec<TypeId>,
    },
    /// An uninstantiated type parameter.
    Param {
        name: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    /// Returns the id of an existing identical entry, or appends one.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        match self.kinds.iter().position(|existing| *existing == kind) {
            Some(index) => TypeId(index as u32),
            None => self.push(kind),
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.index() < self.kinds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| (TypeId(index as u32), kind))
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    /// Every type id a kind refers to, used to validate host input.
    pub fn references(kind: &TypeKind) -> Vec<TypeId> {
        match kind {
            TypeKind::Basic { .. } | TypeKind::Param { .. } => Vec::new(),
            TypeKind::Named {
                underlying, methods, ..
            } => std::iter::once(*underlying)
                .chain(methods.iter().map(|method| method.signature))
                .collect(),
            TypeKind::Pointer { elem }
            | TypeKind::Array { elem, .. }
            | TypeKind::Slice { elem }
            | TypeKind::Chan { elem, .. } => vec![*elem],
            TypeKind::Map { key, value } => vec![*key, *value],
            TypeKind::Signature {
                params,
                results,
                recv,
                ..
            } => params
                .iter()
                .chain(results.iter())
                .chain(recv.iter())
                .copied()
                .collect(),
            TypeKind::Interface { methods } => methods.iter().map(|method| method.signature).collect(),
            TypeKind::Struct { fields } => fields.iter().map(|field| field.ty).collect(),
            TypeKind::Tuple { elems } => elems.clone(),
        }
    }

    /// Follows named types down to their structural definition.
    pub fn underlying(&self, mut id: TypeId) -> TypeId {
        // Named chains are bounded by the table size; anything longer is a cycle.
        for _ in 0..=self.kinds.len() {
            match self.kind(id) {
                TypeKind::Named { underlying, .. } if *underlying != id => id = *underlying,
                _ => return id,
            }
        }
        id
    }

    pub fn underlying_kind(&self, id: TypeId) -> &TypeKind {
        self.kind(self.underlying(id))
    }

    pub fn basic(&self, id: TypeId) -> Option<BasicKind> {
        match self.underlying_kind(id) {
            TypeKind::Basic { basic } => Some(*basic),
            _ => None,
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(self.underlying_kind(id), TypeKind::Interface { .. })
    }

    pub fn is_empty_interface(&self, id: TypeId) -> bool {
        matches!(self.underlying_kind(id), TypeKind::Interface { methods } if methods.is_empty())
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.underlying_kind(id), TypeKind::Pointer { .. })
    }

    pub fn is_string(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_string)
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_integer)
    }

    pub fn is_signed(&self, id: TypeId) -> bool {
        self.basic(id)
            .is_some_and(|basic| basic.is_signed() || matches!(basic, BasicKind::UntypedInt | BasicKind::UntypedRune))
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_float)
    }

    pub fn is_nil(&self, id: TypeId) -> bool {
        self.basic(id) == Some(BasicKind::UntypedNil)
    }

    /// Element type of pointers, arrays, slices, channels and map values.
    pub fn elem(&self, id: TypeId) -> Option<TypeId> {
        match self.underlying_kind(id) {
            TypeKind::Pointer { elem }
            | TypeKind::Array { elem, .. }
            | TypeKind::Slice { elem }
            | TypeKind::Chan { elem, .. } => Some(*elem),
            TypeKind::Map { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Strips one level of pointer, if any.
    pub fn deref(&self, id: TypeId) -> TypeId {
        match self.underlying_kind(id) {
            TypeKind::Pointer { elem } => *elem,
            _ => id,
        }
    }

    /// Methods declared on a named type, or required by an interface.
    pub fn methods(&self, id: TypeId) -> &[Method] {
        match self.kind(id) {
            TypeKind::Named { methods, underlying, .. } => match self.kind(*underlying) {
                TypeKind::Interface { methods } => methods,
                _ => methods,
            },
            TypeKind::Interface { methods } => methods,
            _ => &[],
        }
    }

    pub fn fields(&self, id: TypeId) -> &[Field] {
        match self.underlying_kind(id) {
            TypeKind::Struct { fields } => fields,
            _ => &[],
        }
    }

    pub fn display(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_display(id, &mut out, 0);
        out
    }

    fn write_display(&self, id: TypeId, out: &mut String, depth: usize) {
        if depth > self.kinds.len() {
            out.push_str("...");
            return;
        }
        let depth = depth + 1;
        match self.kind(id) {
            TypeKind::Basic { basic } => out.push_str(basic.name()),
            TypeKind::Named { package, name, .. } => {
                if let Some(package) = package {
                    out.push_str(package);
                    out.push('.');
                }
                out.push_str(name);
            }
            TypeKind::Pointer { elem } => {
                out.push('*');
                self.write_display(*elem, out, depth);
            }
            TypeKind::Array { len, elem } => {
                out.push_str(&format!("[{len}]"));
                self.write_display(*elem, out, depth);
            }
            TypeKind::Slice { elem } => {
                out.push_str("[]");
                self.write_display(*elem, out, depth);
            }
            TypeKind::Map { key, value } => {
                out.push_str("map[");
                self.write_display(*key, out, depth);
                out.push(']');
                self.write_display(*value, out, depth);
            }
            TypeKind::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.write_display(*elem, out, depth);
            }
            TypeKind::Signature {
                params,
                results,
                variadic,
                ..
            } => {
                out.push_str("func(");
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    if *variadic && index + 1 == params.len() {
                        out.push_str("...");
                        let elem = self.elem(*param).unwrap_or(*param);
                        self.write_display(elem, out, depth);
                    } else {
                        self.write_display(*param, out, depth);
                    }
                }
                out.push(')');
                match results.len() {
                    0 => {}
                    1 => {
                        out.push(' ');
                        self.write_display(results[0], out, depth);
                    }
                    _ => {
                        out.push_str(" (");
                        self.write_list(results, out, depth);
                        out.push(')');
                    }
                }
            }
            TypeKind::Interface { methods } => {
                if methods.is_empty() {
                    out.push_str("interface {}");
                } else {
                    out.push_str("interface { ");
                    for method in methods {
                        out.push_str(&method.name);
                        out.push_str("(); ");
                    }
                    out.push('}');
                }
            }
            TypeKind::Struct { fields } => {
                out.push_str("struct{");
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    self.write_display(field.ty, out, depth);
                }
                out.push('}');
            }
            TypeKind::Tuple { elems } => {
                out.push('(');
                self.write_list(elems, out, depth);
                out.push(')');
            }
            TypeKind::Param { name } => out.push_str(name),
        }
    }

    fn write_list(&self, ids: &[TypeId], out: &mut String, depth: usize) {
        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_display(*id, out, depth);
        }
    }
}

/// Go's export rule: the name starts with an upper case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn displays_go_type_strings() {
        let mut table = TypeTable::new();
        let empty = table.push(TypeKind::Struct { fields: vec![] });
        let t = table.push(TypeKind::Named {
            package: Some("testing".into()),
            name: "T".into(),
            underlying: empty,
            methods: vec![],
        });
        let ptr = table.push(TypeKind::Pointer { elem: t });
        let int = table.push(TypeKind::Basic { basic: BasicKind::Int });
        let string = table.push(TypeKind::Basic { basic: BasicKind::String });
        let map = table.push(TypeKind::Map { key: string, value: int });
        let slice = table.push(TypeKind::Slice { elem: int });
        let sig = table.push(TypeKind::Signature {
            params: vec![string, slice],
            results: vec![int],
            variadic: true,
            recv: None,
        });

        assert_eq!(table.display(ptr), "*testing.T");
        assert_eq!(table.display(map), "map[string]int");
        assert_eq!(table.display(sig), "func(string, ...int) int");
        assert!(table.is_pointer(ptr));
        assert_eq!(table.deref(ptr), t);
        assert_eq!(table.underlying(t), empty);
    }

    #[test]
    fn deserializes_tagged_kinds() {
        let table: TypeTable = serde_json::from_str(
            r#"[
                {"kind": "basic", "basic": "int"},
                {"kind": "slice", "elem": 0},
                {"kind": "chan", "elem": 0}
            ]"#,
        )
        .expect("type table");
        assert_eq!(table.len(), 3);
        assert_eq!(table.elem(TypeId(1)), Some(TypeId(0)));
        assert_eq!(table.kind(TypeId(2)), &TypeKind::Chan { dir: ChanDir::Both, elem: TypeId(0) });
    }
}
