use gz_core::ir::visit::{walk_block, VariableUses};
use gz_core::ir::{Definition, Field, Function, FunctionDefinition, Identifier, TypeDefinition, ValueDefinition};
use gz_core::{CodegenError, EscapeState, Location, Result, TypeId, TypeKind};
use itertools::Itertools;

use super::utils::{dotted, field_name, quote, string_literal, zig_name};
use super::{FunctionScope, ZigEmitter};

/// Calling convention of an emitted function body.
pub(super) enum FunctionKind<'a> {
    /// A package function or method.
    Plain,
    /// The program entry point.
    Main,
    /// The `call` of a hoisted function literal, unpacking its captures
    /// from the context pointer.
    Closure { captures: &'a [Identifier] },
}

const PROLOGUE: [&str; 2] = [
    "var owned: go.routine = undefined;",
    "const task = go.routine.enter(inherited, &owned);",
];

impl ZigEmitter<'_> {
    pub(super) fn emit_definition(&mut self, def: &Definition) -> Result<()> {
        if let Some(doc) = def.doc() {
            self.push_doc(doc);
        }
        match def {
            Definition::Type(def) => self.emit_type_definition(def, true),
            Definition::Constant(def) => self.emit_constants(def),
            Definition::Variable(def) => self.emit_globals(def),
            Definition::Function(def) => self.emit_function_definition(def),
        }
    }

    fn push_doc(&mut self, doc: &str) {
        for line in doc.trim_end().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.push_line("///");
            } else {
                self.push_line(&format!("/// {line}"));
            }
        }
    }

    /// Qualified Go name used in reflection descriptors.
    fn go_name(&self, name: &str) -> String {
        format!("{}.{name}", self.package.name)
    }

    pub(super) fn emit_type_definition(&mut self, def: &TypeDefinition, public: bool) -> Result<()> {
        let at = &def.location;
        if !def.type_params.is_empty() {
            return Err(CodegenError::unsupported(at, format!("generic type {}", def.name.name)));
        }
        let visibility = if public { "pub " } else { "" };
        let name = zig_name(&def.name.name);
        let named = def
            .name
            .typed
            .ty
            .ok_or_else(|| CodegenError::invariant(at, format!("type {} has no resolved type", def.name.name)))?;
        if def.alias {
            let aliased = self.render_type(named, at)?;
            self.push_line(&format!("{visibility}const {name} = {aliased};"));
            return Ok(());
        }
        let underlying = self.types.underlying(named);
        match self.types.kind(underlying) {
            TypeKind::Struct { fields } => {
                let fields = self.render_fields(fields, at)?;
                self.push_line(&format!("{visibility}const {name} = struct {{"));
                self.indent += 1;
                for field in &fields {
                    self.push_line(field);
                }
                self.indent -= 1;
                self.push_line("};");
            }
            TypeKind::Interface { methods } if !methods.is_empty() => {
                let entries = methods
                    .iter()
                    .map(|method| {
                        Ok(format!(
                            "{}: *const {},",
                            field_name(&method.name),
                            self.render_method_fn(method.signature, at)?
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.push_line(&format!("{visibility}const {name} = go.interface(struct {{"));
                self.indent += 1;
                for entry in &entries {
                    self.push_line(entry);
                }
                self.indent -= 1;
                self.push_line("});");
            }
            _ => {
                let rendered = self.render_type(underlying, at)?;
                self.push_line(&format!("{visibility}const {name} = {rendered};"));
            }
        }
        self.emit_rtype(&def.name.name, named, visibility, at)
    }

    /// Reflection descriptor `@"T.(type)"` of a defined type.
    fn emit_rtype(&mut self, name: &str, named: TypeId, visibility: &str, at: &Location) -> Result<()> {
        let zig = zig_name(name);
        let fields = self
            .types
            .fields(named)
            .iter()
            .map(|field| {
                let ty = self.render_type(field.ty, at)?;
                Ok(format!(
                    ".{{ .name = {}, .type = {}, .offset = @offsetOf({zig}, {}), .size = @sizeOf({ty}), .exported = {}, .embedded = {} }},",
                    string_literal(&field.name),
                    self.rtype_ref(field.ty, at)?,
                    string_literal(&field.name),
                    field.exported(),
                    field.embedded
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        self.push_line(&format!("{visibility}const {} = go.rtype{{", dotted(&[name, "(type)"])));
        self.indent += 1;
        self.push_line(&format!(".name = {},", string_literal(&self.go_name(name))));
        self.push_line(&format!(".kind = {},", self.rkind(named)));
        self.push_line(&format!(".size = @sizeOf({zig}),"));
        self.push_line(&format!(".equal = go.equality({zig}),"));
        self.push_line(&format!(".hash = go.hashing({zig}),"));
        if !fields.is_empty() {
            self.push_line(".fields = &.{");
            self.indent += 1;
            for field in &fields {
                self.push_line(field);
            }
            self.indent -= 1;
            self.push_line("},");
        }
        self.indent -= 1;
        self.push_line("};");
        Ok(())
    }

    fn emit_constants(&mut self, def: &ValueDefinition) -> Result<()> {
        for (index, name) in def.names.iter().enumerate() {
            if name.is_blank() {
                continue;
            }
            let value = name
                .typed
                .constant
                .as_ref()
                .or_else(|| def.values.get(index).and_then(|value| value.typed.constant.as_ref()))
                .ok_or_else(|| CodegenError::invariant(&name.location, format!("constant {} has no value", name.name)))?;
            let rendered = self.render_constant(value, name.typed.ty);
            let typed = name
                .typed
                .ty
                .filter(|ty| self.types.basic(*ty).is_some_and(|basic| !basic.is_untyped()));
            match typed {
                Some(ty) => {
                    let zig = self.render_type(ty, &name.location)?;
                    self.push_line(&format!("pub const {}: {zig} = {rendered};", zig_name(&name.name)));
                }
                None => self.push_line(&format!("pub const {} = {rendered};", zig_name(&name.name))),
            }
        }
        Ok(())
    }

    /// Runs `emit` in the scope of `package.init`, where `task` is bound.
    fn in_init_scope<T>(&mut self, emit: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(FunctionScope::default());
        let result = emit(self);
        self.scopes.pop();
        result
    }

    fn emit_globals(&mut self, def: &ValueDefinition) -> Result<()> {
        let spread = def.values.len() == 1 && def.names.len() > 1;
        for (index, name) in def.names.iter().enumerate() {
            let value = if spread { None } else { def.values.get(index) };
            if name.is_blank() {
                if let Some(value) = value {
                    let value = self.in_init_scope(|this| this.render_expr(value))?;
                    self.init.push(format!("_ = {value};"));
                }
                continue;
            }
            let at = &name.location;
            let ty = name
                .typed
                .ty
                .ok_or_else(|| CodegenError::invariant(at, format!("{} has no resolved type", name.name)))?;
            let zig = self.render_type(ty, at)?;
            let global = zig_name(&name.name);
            let initial = match value {
                Some(value) => self.static_value(ty, value)?,
                None => None,
            };
            let dynamic = value.is_some() && initial.is_none();
            let initial = initial.unwrap_or_else(|| format!("go.zero({zig})"));
            self.push_line(&format!("pub var {global}: {zig} = {initial};"));
            if let (true, Some(value)) = (dynamic, value) {
                let value = self.in_init_scope(|this| this.value_for(ty, value))?;
                self.init.push(format!("{global} = {value};"));
            }
            self.push_line(&format!(
                "pub const {} = go.rvalue{{ .name = {}, .type = {}, .size = @sizeOf({zig}) }};",
                dotted(&[&name.name, "(var)"]),
                string_literal(&self.go_name(&name.name)),
                self.rtype_ref(ty, at)?
            ));
        }
        if spread {
            let value = &def.values[0];
            let rendered = self.in_init_scope(|this| this.render_expr(value))?;
            let tuple = self.fresh("tuple");
            self.init.push(format!("const {tuple} = {rendered};"));
            for (index, name) in def.names.iter().enumerate().filter(|(_, name)| !name.is_blank()) {
                self.init.push(format!("{} = {tuple}[{index}];", zig_name(&name.name)));
            }
        }
        Ok(())
    }

    fn emit_function_definition(&mut self, def: &FunctionDefinition) -> Result<()> {
        let at = &def.location;
        let name = &def.name.name;
        if def.func.body.is_none() {
            return Err(CodegenError::unsupported(at, format!("function {name} without a body")));
        }
        if !def.func.signature.type_params.is_empty() {
            return Err(CodegenError::unsupported(at, format!("generic function {name}")));
        }
        let receiver_type = match &def.receiver {
            Some(receiver) => Some(self.receiver_type(receiver, at)?),
            None => None,
        };
        let is_main = self.package.name == "main" && receiver_type.is_none() && name == "main";
        let is_init = receiver_type.is_none() && name == "init";
        let (zig, descriptor) = match &receiver_type {
            Some((type_name, _)) => (dotted(&[type_name, name]), Some(dotted(&[type_name, name, "(func)"]))),
            None if is_init => (self.fresh("init"), None),
            None => (zig_name(name), Some(dotted(&[name, "(func)"]))),
        };
        if is_main {
            self.emit_function("pub fn main", None, &def.func, FunctionKind::Main)?;
        } else {
            let visibility = if is_init { "" } else { "pub " };
            self.emit_function(
                &format!("{visibility}fn {zig}"),
                def.receiver.as_ref(),
                &def.func,
                FunctionKind::Plain,
            )?;
        }
        if is_init {
            self.init_calls.push(format!("{zig}(task);"));
        }
        if let Some(descriptor) = descriptor {
            let go_name = match &receiver_type {
                Some((type_name, _)) => self.go_name(&format!("{type_name}.{name}")),
                None => self.go_name(name),
            };
            self.push_line(&format!(
                "pub const {descriptor} = go.rfunc{{ .name = {}, .address = @ptrCast(&{zig}) }};",
                string_literal(&go_name)
            ));
        }
        if let Some((type_name, pointer)) = &receiver_type {
            self.emit_shim(type_name, *pointer, def, &zig)?;
        }
        if def.is_test {
            self.emit_test(name, &zig);
        }
        Ok(())
    }

    /// Name of the receiver's base type and whether it is received by pointer.
    fn receiver_type(&self, receiver: &Field, at: &Location) -> Result<(String, bool)> {
        let ty = receiver
            .ty
            .typed
            .ty
            .ok_or_else(|| CodegenError::invariant(at, "receiver has no resolved type"))?;
        let pointer = self.types.is_pointer(ty);
        match self.types.kind(self.types.deref(ty)) {
            TypeKind::Named { name, .. } => Ok((name.clone(), pointer)),
            _ => Err(CodegenError::invariant(at, "receiver base is not a defined type")),
        }
    }

    /// Method-table entry `@"pkg.T.M.(itfc)"` that restores the receiver
    /// from the erased address an interface holds.
    fn emit_shim(&mut self, type_name: &str, pointer: bool, def: &FunctionDefinition, method: &str) -> Result<()> {
        let at = &def.location;
        let signature = def
            .func
            .signature
            .typed
            .ty
            .ok_or_else(|| CodegenError::invariant(at, "method has no resolved signature"))?;
        let (params, results, _) = self.signature_parts(signature, at)?;
        let args = (0..params.len()).map(|index| quote(&format!("arg.{index}"))).collect::<Vec<_>>();
        let declared = params
            .iter()
            .zip(&args)
            .map(|(param, arg)| Ok(format!(", {arg}: {}", self.render_type(*param, at)?)))
            .collect::<Result<String>>()?;
        let returns = self.render_results(&results, at)?;
        let zig_type = zig_name(type_name);
        let receiver = if pointer {
            format!("go.pointer({zig_type}).to(recv)")
        } else {
            "recv.*".to_string()
        };
        let shim = dotted(&[&self.package.name, type_name, &def.name.name, "(itfc)"]);
        self.push_blank_line();
        self.push_line(&format!(
            "pub fn {shim}(inherited: ?*go.routine, address: ?*anyopaque{declared}) {returns} {{"
        ));
        self.indent += 1;
        self.push_line(&format!("const recv: *{zig_type} = @ptrCast(@alignCast(address.?));"));
        let call_args = ["inherited".to_string(), receiver].into_iter().chain(args).join(", ");
        self.push_line(&format!("return {method}({call_args});"));
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    /// A Zig `test` block driving a Go test function.
    fn emit_test(&mut self, name: &str, function: &str) {
        self.push_blank_line();
        self.push_line(&format!("test {} {{", string_literal(name)));
        self.indent += 1;
        self.push_line("var owned: go.routine = undefined;");
        self.push_line("const task = go.routine.enter(null, &owned);");
        self.push_line("defer task.exit();");
        self.push_line("@\"package.init\"(task);");
        self.push_line(&format!("var t = go.testing.T{{ .name = {} }};", string_literal(name)));
        self.push_line(&format!("{function}(task, go.pointer(go.testing.T).to(&t));"));
        self.push_line("try t.verdict();");
        self.indent -= 1;
        self.push_line("}");
    }

    /// Emits a function: routine prologue, parameter boxing, named results
    /// and the body.
    pub(super) fn emit_function(
        &mut self,
        decl: &str,
        receiver: Option<&Field>,
        func: &Function,
        kind: FunctionKind<'_>,
    ) -> Result<()> {
        let at = &func.location;
        let body = func
            .body
            .as_ref()
            .ok_or_else(|| CodegenError::unsupported(at, "function without a body"))?;
        let signature = func
            .signature
            .typed
            .ty
            .ok_or_else(|| CodegenError::invariant(at, "function has no resolved signature"))?;
        let (params, results, _) = self.signature_parts(signature, at)?;
        let mut uses = VariableUses::default();
        walk_block(&mut uses, body);

        let mut header = Vec::new();
        let mut prelude = Vec::new();
        match &kind {
            FunctionKind::Main => {}
            FunctionKind::Plain => header.push("inherited: ?*go.routine".to_string()),
            FunctionKind::Closure { .. } => {
                header.push("inherited: ?*go.routine".to_string());
                header.push("context: ?*const anyopaque".to_string());
            }
        }

        if let Some(receiver) = receiver {
            let ty = receiver
                .ty
                .typed
                .ty
                .ok_or_else(|| CodegenError::invariant(at, "receiver has no resolved type"))?;
            match receiver.names.first() {
                Some(name) => self.parameter(name, ty, &uses, &mut header, &mut prelude)?,
                None => header.push(format!("_: {}", self.render_type(ty, at)?)),
            }
        }
        let mut types = params.iter();
        for field in &func.signature.params {
            let count = field.names.len().max(1);
            for position in 0..count {
                let ty = *types
                    .next()
                    .ok_or_else(|| CodegenError::invariant(&field.location, "more parameters than the signature has"))?;
                match field.names.get(position) {
                    Some(name) => self.parameter(name, ty, &uses, &mut header, &mut prelude)?,
                    None => header.push(format!("_: {}", self.render_type(ty, &field.location)?)),
                }
            }
        }

        let returns = self.render_results(&results, at)?;
        match &kind {
            FunctionKind::Main => self.push_line(&format!("{decl}() void {{")),
            _ => self.push_line(&format!("{decl}({}) {returns} {{", header.join(", "))),
        }
        self.indent += 1;
        if let FunctionKind::Closure { captures } = &kind {
            if captures.is_empty() {
                self.push_line("_ = context;");
            } else {
                self.push_line("const env: *const @This() = @ptrCast(@alignCast(context.?));");
                for capture in captures.iter() {
                    let local = self.local_name(capture);
                    self.push_line(&format!("const {local} = env.{local};"));
                }
            }
        }
        match &kind {
            FunctionKind::Main => {
                self.push_line("var owned: go.routine = undefined;");
                self.push_line("const task = go.routine.enter(null, &owned);");
                self.push_line("defer task.exit();");
                self.push_line("@\"package.init\"(task);");
            }
            _ => {
                for line in PROLOGUE {
                    self.push_line(line);
                }
                self.push_line("defer if (inherited == null) task.exit();");
            }
        }
        for line in &prelude {
            self.push_line(line);
        }
        let named_results = func
            .signature
            .results
            .iter()
            .flat_map(|field| field.names.iter())
            .cloned()
            .collect::<Vec<_>>();
        for name in &named_results {
            self.declare_local(name, None)?;
        }

        self.scopes.push(FunctionScope {
            results,
            named_results,
            ..FunctionScope::default()
        });
        let emitted = self.emit_block(body);
        self.scopes.pop();
        emitted?;
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    /// Declares one parameter. Escaping parameters arrive under a suffixed
    /// name and are copied into managed storage.
    fn parameter(
        &mut self,
        name: &Identifier,
        ty: TypeId,
        uses: &VariableUses,
        header: &mut Vec<String>,
        prelude: &mut Vec<String>,
    ) -> Result<()> {
        let zig = self.render_type(ty, &name.location)?;
        if name.is_blank() {
            header.push(format!("_: {zig}"));
            return Ok(());
        }
        let local = self.local_name(name);
        match name.escape() {
            EscapeState::NoEscape => {
                header.push(format!("{local}: {zig}"));
                if !name.binding.is_some_and(|binding| uses.uses.contains(&binding)) {
                    prelude.push(format!("_ = {local};"));
                }
            }
            state => {
                let arg = self.suffixed_name(name, "arg");
                let store = if state == EscapeState::SharedEscape { "share" } else { "malloc" };
                header.push(format!("{arg}: {zig}"));
                prelude.push(format!("const {local} = task.{store}({zig}, {arg});"));
            }
        }
        Ok(())
    }

    /// `package.init`: imported packages first, then dynamic package
    /// variables, then Go `init` functions.
    pub(super) fn emit_package_init(&mut self) {
        let imports = self
            .package
            .imports
            .iter()
            .filter(|import| !self.options.deny.is_denied(&import.path))
            .map(|import| zig_name(&import.name))
            .sorted()
            .dedup()
            .collect::<Vec<_>>();
        self.push_blank_line();
        self.push_line("var @\"package.initialized\": bool = false;");
        self.push_blank_line();
        self.push_line("pub fn @\"package.init\"(inherited: ?*go.routine) void {");
        self.indent += 1;
        self.push_line("if (@\"package.initialized\") return;");
        self.push_line("@\"package.initialized\" = true;");
        for line in PROLOGUE {
            self.push_line(line);
        }
        self.push_line("defer if (inherited == null) task.exit();");
        for import in imports {
            self.push_line(&format!("{import}.@\"package.init\"(task);"));
        }
        for line in std::mem::take(&mut self.init) {
            self.push_line(&line);
        }
        for call in std::mem::take(&mut self.init_calls) {
            self.push_line(&call);
        }
        self.indent -= 1;
        self.push_line("}");
    }
}
