//! Hand-built IR for tests, so that analysis and generation can be exercised
//! without a host toolchain.

use crate::id::{NodeId, NodeIdGen};
use crate::ir::*;
use crate::location::Location;
use crate::types::{BasicKind, TypeId, TypeKind, TypeTable};
use crate::value::ConstValue;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Binding {
    id: NodeId,
    ty: TypeId,
    global: bool,
    shadow: u32,
}

pub struct Fixture {
    pub ids: NodeIdGen,
    pub types: TypeTable,
    package: String,
    file: Arc<str>,
    line: u32,
    bindings: HashMap<String, Binding>,
    declared: HashMap<String, u32>,
    test: bool,
}

impl Fixture {
    pub fn new(package: &str) -> Self {
        Self {
            ids: NodeIdGen::new(),
            types: TypeTable::new(),
            package: package.to_string(),
            file: Arc::from(format!("{package}.go")),
            line: 1,
            bindings: HashMap::new(),
            declared: HashMap::new(),
            test: false,
        }
    }

    pub fn test_mode(mut self) -> Self {
        self.test = true;
        self
    }

    pub fn location(&mut self) -> Location {
        self.line += 1;
        Location::new(self.file.clone(), self.line, 1)
    }

    pub fn basic(&mut self, basic: BasicKind) -> TypeId {
        self.types.intern(TypeKind::Basic { basic })
    }

    pub fn int(&mut self) -> TypeId {
        self.basic(BasicKind::Int)
    }

    pub fn string(&mut self) -> TypeId {
        self.basic(BasicKind::String)
    }

    pub fn bool(&mut self) -> TypeId {
        self.basic(BasicKind::Bool)
    }

    pub fn ty(&mut self, kind: TypeKind) -> TypeId {
        self.types.intern(kind)
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.ty(TypeKind::Pointer { elem })
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.ty(TypeKind::Slice { elem })
    }

    pub fn chan(&mut self, elem: TypeId) -> TypeId {
        self.ty(TypeKind::Chan {
            dir: Default::default(),
            elem,
        })
    }

    pub fn signature(&mut self, params: Vec<TypeId>, results: Vec<TypeId>) -> TypeId {
        self.ty(TypeKind::Signature {
            params,
            results,
            variadic: false,
            recv: None,
        })
    }

    pub fn named(&mut self, name: &str, underlying: TypeId) -> TypeId {
        self.types.push(TypeKind::Named {
            package: Some(self.package.clone()),
            name: name.to_string(),
            underlying,
            methods: Vec::new(),
        })
    }

    fn ident(&mut self, name: &str, ty: TypeId, binding: Option<Binding>, declares: bool) -> Identifier {
        Identifier {
            id: self.ids.next(),
            location: self.location(),
            typed: Typed::of(ty),
            name: name.to_string(),
            binding: binding.map(|binding| binding.id),
            declares,
            shadow: binding.map(|binding| binding.shadow).unwrap_or_default(),
            global: binding.is_some_and(|binding| binding.global),
            method: false,
            package: None,
            escapes: Default::default(),
        }
    }

    fn bind(&mut self, name: &str, ty: TypeId, global: bool) -> Identifier {
        let count = self.declared.entry(name.to_string()).or_default();
        let binding = Binding {
            id: self.ids.next(),
            ty,
            global,
            shadow: *count,
        };
        *count += 1;
        self.bindings.insert(name.to_string(), binding);
        self.ident(name, ty, Some(binding), true)
    }

    /// Introduces a new local binding and returns its declaring occurrence.
    pub fn declare(&mut self, name: &str, ty: TypeId) -> Identifier {
        self.bind(name, ty, false)
    }

    pub fn declare_global(&mut self, name: &str, ty: TypeId) -> Identifier {
        self.bind(name, ty, true)
    }

    pub fn binding(&self, name: &str) -> NodeId {
        self.bindings[name].id
    }

    pub fn expr(&mut self, ty: Option<TypeId>, kind: ExprKind) -> Expr {
        Expr {
            id: self.ids.next(),
            location: self.location(),
            typed: Typed {
                ty,
                constant: None,
            },
            kind,
        }
    }

    /// A use of the latest binding with this name.
    pub fn var(&mut self, name: &str) -> Expr {
        let binding = self.bindings[name];
        let ident = self.ident(name, binding.ty, Some(binding), false);
        self.expr(Some(binding.ty), ExprKind::Variable(ident))
    }

    pub fn func_ref(&mut self, name: &str) -> Expr {
        let binding = self.bindings[name];
        let ident = self.ident(name, binding.ty, Some(binding), false);
        self.expr(Some(binding.ty), ExprKind::Function(ident))
    }

    pub fn int_lit(&mut self, value: i64) -> Expr {
        let ty = self.int();
        let mut expr = self.expr(
            Some(ty),
            ExprKind::Literal(Literal {
                kind: LiteralKind::Int,
                raw: value.to_string(),
            }),
        );
        expr.typed.constant = Some(ConstValue::Int(value));
        expr
    }

    pub fn string_lit(&mut self, value: &str) -> Expr {
        let ty = self.string();
        let mut expr = self.expr(
            Some(ty),
            ExprKind::Literal(Literal {
                kind: LiteralKind::String,
                raw: format!("{value:?}"),
            }),
        );
        expr.typed.constant = Some(ConstValue::String(value.to_string()));
        expr
    }

    pub fn type_expr(&mut self, ty: TypeId) -> TypeExpr {
        let name = self.types.display(ty);
        let ident = self.ident(&name, ty, None, false);
        TypeExpr {
            id: self.ids.next(),
            location: self.location(),
            typed: Typed::of(ty),
            kind: TypeExprKind::Named {
                package: None,
                name: ident,
            },
        }
    }

    pub fn paren(&mut self, inner: Expr) -> Expr {
        self.expr(inner.ty(), ExprKind::Paren(Box::new(inner)))
    }

    pub fn address_of(&mut self, operand: Expr) -> Expr {
        let elem = operand.ty().unwrap_or(TypeId(0));
        let ty = self.pointer(elem);
        self.expr(
            Some(ty),
            ExprKind::Unary {
                op: UnaryOp::Address,
                operand: Box::new(operand),
            },
        )
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let ty = if op.is_comparison() { Some(self.bool()) } else { lhs.ty() };
        self.expr(
            ty,
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        )
    }

    pub fn field(&mut self, target: Expr, name: &str, index: usize, ty: TypeId) -> Expr {
        let field = self.ident(name, ty, None, false);
        self.expr(
            Some(ty),
            ExprKind::Selector(SelectorExpr {
                target: Box::new(target),
                field,
                kind: SelectionKind::Field,
                path: vec![index],
                indirect: false,
            }),
        )
    }

    pub fn index(&mut self, target: Expr, index: Expr, ty: TypeId) -> Expr {
        self.expr(
            Some(ty),
            ExprKind::Index {
                target: Box::new(target),
                index: Box::new(index),
            },
        )
    }

    pub fn call(&mut self, callee: Expr, args: Vec<Expr>, result: Option<TypeId>) -> Expr {
        self.expr(
            result,
            ExprKind::Call(CallExpr {
                callee: Box::new(callee),
                args,
                ellipsis: false,
            }),
        )
    }

    pub fn builtin_call(&mut self, name: &str, args: Vec<Expr>, result: Option<TypeId>) -> Expr {
        let signature = self.signature(Vec::new(), Vec::new());
        let ident = self.ident(name, signature, None, false);
        let callee = self.expr(Some(signature), ExprKind::Builtin(ident));
        self.call(callee, args, result)
    }

    pub fn type_operand(&mut self, ty: TypeId) -> Expr {
        let ty_expr = self.type_expr(ty);
        self.expr(Some(ty), ExprKind::Type(ty_expr))
    }

    pub fn receive(&mut self, channel: Expr) -> Expr {
        let ty = channel.ty().and_then(|ty| self.types.elem(ty));
        self.expr(ty, ExprKind::Receive(Box::new(channel)))
    }

    pub fn composite(&mut self, ty: TypeId, elements: Vec<Expr>) -> Expr {
        let ty_expr = self.type_expr(ty);
        self.expr(
            Some(ty),
            ExprKind::Composite {
                ty: Some(ty_expr),
                elements,
            },
        )
    }

    pub fn key_value(&mut self, key: Expr, value: Expr) -> Expr {
        self.expr(
            value.ty(),
            ExprKind::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    pub fn param(&mut self, name: &str, ty: TypeId) -> Field {
        let ident = self.declare(name, ty);
        let ty_expr = self.type_expr(ty);
        Field {
            location: self.location(),
            names: vec![ident],
            ty: ty_expr,
            tag: None,
        }
    }

    fn signature_node(&mut self, params: Vec<Field>, results: Vec<TypeId>) -> Signature {
        let param_types = params.iter().map(|field| field.ty.typed.ty.unwrap_or(TypeId(0))).collect();
        let ty = self.signature(param_types, results.clone());
        let results = results
            .into_iter()
            .map(|result| {
                let ty_expr = self.type_expr(result);
                Field {
                    location: self.location(),
                    names: Vec::new(),
                    ty: ty_expr,
                    tag: None,
                }
            })
            .collect();
        Signature {
            location: self.location(),
            typed: Typed::of(ty),
            type_params: Vec::new(),
            params,
            results,
        }
    }

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        Block {
            location: self.location(),
            stmts,
        }
    }

    pub fn func_lit(&mut self, params: Vec<Field>, results: Vec<TypeId>, body: Vec<Stmt>) -> Expr {
        let signature = self.signature_node(params, results);
        let ty = signature.typed.ty;
        let body = self.block(body);
        let location = self.location();
        self.expr(
            ty,
            ExprKind::FunctionLit(Function {
                location,
                signature,
                body: Some(body),
            }),
        )
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            location: self.location(),
            kind,
        }
    }

    /// `name := value`
    pub fn define(&mut self, name: &str, value: Expr) -> Stmt {
        let ty = value.ty().unwrap_or(TypeId(0));
        let ident = self.declare(name, ty);
        let target = self.expr(Some(ty), ExprKind::Variable(ident));
        self.stmt(StmtKind::Assign(AssignStmt {
            lhs: vec![target],
            op: AssignOp::Define,
            rhs: vec![value],
        }))
    }

    pub fn assign(&mut self, lhs: Expr, rhs: Expr) -> Stmt {
        self.stmt(StmtKind::Assign(AssignStmt {
            lhs: vec![lhs],
            op: AssignOp::Assign,
            rhs: vec![rhs],
        }))
    }

    pub fn send(&mut self, channel: Expr, value: Expr) -> Stmt {
        self.stmt(StmtKind::Send { channel, value })
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn ret(&mut self, values: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(values))
    }

    /// Declares a package function; call before building its body so the
    /// body can refer to it.
    pub fn declare_function(&mut self, name: &str, params: &[TypeId], results: &[TypeId]) -> Identifier {
        let ty = self.signature(params.to_vec(), results.to_vec());
        self.bind(name, ty, true)
    }

    /// Like `declare_function`, with the last parameter taking `...T`.
    pub fn declare_variadic(&mut self, name: &str, params: &[TypeId], results: &[TypeId]) -> Identifier {
        let ty = self.ty(TypeKind::Signature {
            params: params.to_vec(),
            results: results.to_vec(),
            variadic: true,
            recv: None,
        });
        self.bind(name, ty, true)
    }

    /// A statement label; labels have no type.
    pub fn label(&mut self, name: &str) -> Identifier {
        let mut ident = self.ident(name, TypeId(0), None, true);
        ident.typed = Typed::default();
        ident
    }

    /// `type name underlying` for a type made with `named`.
    pub fn type_definition(&mut self, name: &str, named: TypeId) -> Definition {
        let ident = self.ident(name, named, None, true);
        let underlying = self.types.underlying(named);
        let ty = self.type_expr(underlying);
        Definition::Type(TypeDefinition {
            location: self.location(),
            doc: None,
            name: ident,
            alias: false,
            type_params: Vec::new(),
            ty,
        })
    }

    pub fn function(
        &mut self,
        name: Identifier,
        params: Vec<Field>,
        results: Vec<TypeId>,
        body: Vec<Stmt>,
    ) -> Definition {
        Definition::Function(self.function_definition(name, params, results, body))
    }

    /// A method; unlike functions, methods are not bound in package scope.
    pub fn method(
        &mut self,
        receiver: Field,
        name: &str,
        params: Vec<Field>,
        results: Vec<TypeId>,
        body: Vec<Stmt>,
    ) -> Definition {
        let param_types = params.iter().map(|field| field.ty.typed.ty.unwrap_or(TypeId(0))).collect();
        let ty = self.signature(param_types, results.clone());
        let mut ident = self.ident(name, ty, None, true);
        ident.method = true;
        let mut def = self.function_definition(ident, params, results, body);
        def.receiver = Some(receiver);
        Definition::Function(def)
    }

    fn function_definition(
        &mut self,
        name: Identifier,
        params: Vec<Field>,
        results: Vec<TypeId>,
        body: Vec<Stmt>,
    ) -> FunctionDefinition {
        let signature = self.signature_node(params, results);
        let body = self.block(body);
        let location = self.location();
        let is_test = self.test
            && name.name.starts_with("Test")
            && signature.params.len() == 1
            && signature.params[0]
                .ty
                .typed
                .ty
                .is_some_and(|ty| self.types.display(ty) == "*testing.T");
        FunctionDefinition {
            location: location.clone(),
            doc: None,
            name,
            receiver: None,
            func: Function {
                location,
                signature,
                body: Some(body),
            },
            is_test,
        }
    }

    pub fn global_var(&mut self, name: &str, ty: TypeId, value: Option<Expr>) -> Definition {
        let ident = self.declare_global(name, ty);
        let ty_expr = self.type_expr(ty);
        Definition::Variable(ValueDefinition {
            location: self.location(),
            doc: None,
            names: vec![ident],
            ty: Some(ty_expr),
            values: value.into_iter().collect(),
        })
    }

    pub fn finish(self, definitions: Vec<Definition>) -> Package {
        Package {
            name: self.package.clone(),
            path: self.package.clone(),
            test: self.test,
            files: vec![File {
                path: self.file.clone(),
                doc: None,
                imports: Vec::new(),
                definitions,
            }],
            types: self.types,
            imports: Vec::new(),
            node_count: self.ids.count(),
        }
    }
}
