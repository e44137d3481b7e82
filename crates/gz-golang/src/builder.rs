//! Host AST to IR translation.
//!
//! Strictly a mapping: every host node becomes exactly one IR node with its
//! location and resolved type attached. The only decisions taken here are
//! the ones the host already made (identifier categories, whether an
//! expression denotes a type) and recognising package test entry points.

use crate::error::{LoadError, Result};
use crate::host::*;
use gz_core::ir::*;
use gz_core::types::TypeTable;
use gz_core::{Location, NodeId, NodeIdGen};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the IR for one host package dump.
pub fn build_package(host: HostPackage, test: bool) -> Result<Package> {
    let HostPackage {
        name,
        path,
        imports,
        types,
        files,
        ..
    } = host;
    validate_types(&types, &path)?;

    let mut builder = IrBuilder::new(&name, &types, test);
    let files = files
        .into_iter()
        .map(|file| builder.build_file(file))
        .collect::<Result<Vec<_>>>()?;
    let node_count = builder.ids.count();
    debug!(package = %path, files = files.len(), nodes = node_count, "built package IR");

    let mut imports = imports
        .into_iter()
        .map(|import| ImportedPackage {
            path: import.path,
            name: import.name,
        })
        .collect::<Vec<_>>();
    imports.sort();
    imports.dedup();

    Ok(Package {
        name,
        path,
        test,
        files,
        types,
        imports,
        node_count,
    })
}

fn validate_types(types: &TypeTable, path: &str) -> Result<()> {
    for (id, kind) in types.iter() {
        if let Some(missing) = TypeTable::references(kind)
            .into_iter()
            .find(|reference| !types.contains(*reference))
        {
            return Err(LoadError::malformed(
                &Location::new(Arc::from(path), 0, 0),
                format!("type #{} refers to missing type #{}", id.0, missing.0),
            ));
        }
    }
    Ok(())
}

struct IrBuilder<'a> {
    ids: NodeIdGen,
    objects: HashMap<u64, NodeId>,
    types: &'a TypeTable,
    package: String,
    test: bool,
    file: Arc<str>,
}

impl<'a> IrBuilder<'a> {
    fn new(package: &str, types: &'a TypeTable, test: bool) -> Self {
        Self {
            ids: NodeIdGen::new(),
            objects: HashMap::new(),
            types,
            package: package.to_string(),
            test,
            file: Arc::from(""),
        }
    }

    fn location(&self, pos: Pos) -> Location {
        Location::new(self.file.clone(), pos.line, pos.column)
    }

    fn typed(&self, tv: &TypeAndValue, location: &Location) -> Result<Typed> {
        if let Some(ty) = tv.ty {
            if !self.types.contains(ty) {
                return Err(LoadError::malformed(
                    location,
                    format!("reference to missing type #{}", ty.0),
                ));
            }
        }
        Ok(Typed {
            ty: tv.ty,
            constant: tv.value.clone(),
        })
    }

    fn object(&mut self, id: u64) -> NodeId {
        let ids = &mut self.ids;
        *self.objects.entry(id).or_insert_with(|| ids.next())
    }

    fn identifier(&mut self, ident: HostIdent) -> Result<Identifier> {
        let location = self.location(ident.pos);
        let typed = self.typed(&ident.tv, &location)?;
        let (binding, shadow, global, method, package) = match &ident.obj {
            Some(obj) => (
                Some(self.object(obj.id)),
                obj.shadow,
                obj.global,
                obj.method,
                obj.package.clone().filter(|package| *package != self.package),
            ),
            None => (None, 0, false, false, None),
        };
        Ok(Identifier {
            id: self.ids.next(),
            location,
            typed,
            name: ident.name,
            binding,
            declares: ident.def,
            shadow,
            global,
            method,
            package,
            escapes: Default::default(),
        })
    }

    fn expr(&mut self, location: Location, typed: Typed, kind: ExprKind) -> Expr {
        Expr {
            id: self.ids.next(),
            location,
            typed,
            kind,
        }
    }

    fn build_file(&mut self, file: HostFile) -> Result<File> {
        self.file = Arc::from(file.path.as_str());
        let imports = file
            .imports
            .into_iter()
            .map(|import| Import {
                location: self.location(import.pos),
                rename: import.name,
                path: import.path,
            })
            .collect();
        let mut definitions = Vec::new();
        for decl in file.decls {
            match decl {
                HostDecl::Func(func) => definitions.push(self.build_func_decl(func)?),
                HostDecl::Gen(gen) => definitions.extend(self.build_gen_decl(gen)?),
            }
        }
        Ok(File {
            path: self.file.clone(),
            doc: file.doc,
            imports,
            definitions,
        })
    }

    fn build_gen_decl(&mut self, decl: HostGenDecl) -> Result<Vec<Definition>> {
        let mut definitions = Vec::new();
        for spec in decl.specs {
            match spec {
                HostSpec::Import(_) => {}
                HostSpec::Value {
                    pos,
                    doc,
                    names,
                    ty,
                    values,
                } => {
                    let def = ValueDefinition {
                        location: self.location(pos),
                        doc: doc.or_else(|| decl.doc.clone()),
                        names: names
                            .into_iter()
                            .map(|name| self.identifier(name))
                            .collect::<Result<_>>()?,
                        ty: ty.map(|ty| self.build_type(ty)).transpose()?,
                        values: values
                            .into_iter()
                            .map(|value| self.build_expr(value))
                            .collect::<Result<_>>()?,
                    };
                    definitions.push(match decl.token {
                        GenToken::Const => Definition::Constant(def),
                        _ => Definition::Variable(def),
                    });
                }
                HostSpec::Type {
                    pos,
                    doc,
                    name,
                    assign,
                    type_params,
                    ty,
                } => {
                    definitions.push(Definition::Type(TypeDefinition {
                        location: self.location(pos),
                        doc: doc.or_else(|| decl.doc.clone()),
                        name: self.identifier(name)?,
                        alias: assign,
                        type_params: type_params
                            .into_iter()
                            .map(|field| self.build_field(field))
                            .collect::<Result<_>>()?,
                        ty: self.build_type(ty)?,
                    }));
                }
            }
        }
        Ok(definitions)
    }

    fn build_func_decl(&mut self, decl: HostFuncDecl) -> Result<Definition> {
        let location = self.location(decl.pos);
        let receiver = decl.recv.map(|recv| self.build_field(recv)).transpose()?;
        let name = self.identifier(decl.name)?;
        let func = self.build_function(decl.pos, decl.ty, decl.body)?;
        let is_test = self.test && receiver.is_none() && self.is_test_entry(&name, &func.signature);
        Ok(Definition::Function(FunctionDefinition {
            location,
            doc: decl.doc,
            name,
            receiver,
            func,
            is_test,
        }))
    }

    /// `func TestXxx(t *testing.T)`
    fn is_test_entry(&self, name: &Identifier, signature: &Signature) -> bool {
        if !name.name.starts_with("Test") || !signature.results.is_empty() {
            return false;
        }
        let [param] = signature.params.as_slice() else {
            return false;
        };
        param.names.len() <= 1
            && param
                .ty
                .typed
                .ty
                .is_some_and(|ty| self.types.display(ty) == "*testing.T")
    }

    fn build_function(&mut self, pos: Pos, ty: HostFuncType, body: Option<HostBlock>) -> Result<Function> {
        Ok(Function {
            location: self.location(pos),
            signature: self.build_signature(ty)?,
            body: body.map(|body| self.build_block(body)).transpose()?,
        })
    }

    fn build_signature(&mut self, ty: HostFuncType) -> Result<Signature> {
        let location = self.location(ty.pos);
        let typed = self.typed(&ty.tv, &location)?;
        Ok(Signature {
            location,
            typed,
            type_params: self.build_fields(ty.type_params)?,
            params: self.build_fields(ty.params)?,
            results: self.build_fields(ty.results)?,
        })
    }

    fn build_fields(&mut self, fields: Vec<HostField>) -> Result<Vec<Field>> {
        fields.into_iter().map(|field| self.build_field(field)).collect()
    }

    fn build_field(&mut self, field: HostField) -> Result<Field> {
        Ok(Field {
            location: self.location(field.pos),
            names: field
                .names
                .into_iter()
                .map(|name| self.identifier(name))
                .collect::<Result<_>>()?,
            ty: self.build_type(field.ty)?,
            tag: field.tag,
        })
    }

    fn build_block(&mut self, block: HostBlock) -> Result<Block> {
        Ok(Block {
            location: self.location(block.pos),
            stmts: block
                .stmts
                .into_iter()
                .map(|stmt| self.build_stmt(stmt))
                .collect::<Result<_>>()?,
        })
    }

    fn build_boxed_stmt(&mut self, stmt: Option<Box<HostStmt>>) -> Result<Option<Box<Stmt>>> {
        stmt.map(|stmt| self.build_stmt(*stmt).map(Box::new)).transpose()
    }

    fn build_exprs(&mut self, exprs: Vec<HostExpr>) -> Result<Vec<Expr>> {
        exprs.into_iter().map(|expr| self.build_expr(expr)).collect()
    }

    fn build_clauses(&mut self, clauses: Vec<HostCaseClause>) -> Result<Vec<CaseClause>> {
        clauses
            .into_iter()
            .map(|clause| -> Result<CaseClause> {
                Ok(CaseClause {
                    location: self.location(clause.pos),
                    values: self.build_exprs(clause.list)?,
                    body: clause
                        .body
                        .into_iter()
                        .map(|stmt| self.build_stmt(stmt))
                        .collect::<Result<_>>()?,
                })
            })
            .collect()
    }

    fn build_stmt(&mut self, stmt: HostStmt) -> Result<Stmt> {
        let location = self.location(stmt.pos());
        let kind = match stmt {
            HostStmt::Decl { decl, .. } => StmtKind::Declaration(self.build_gen_decl(decl)?),
            HostStmt::Empty { .. } => StmtKind::Empty,
            HostStmt::Labeled { label, stmt, .. } => StmtKind::Label {
                label: self.identifier(label)?,
                stmt: Box::new(self.build_stmt(*stmt)?),
            },
            HostStmt::Expr { x, .. } => StmtKind::Expr(self.build_expr(x)?),
            HostStmt::Send { chan, value, .. } => StmtKind::Send {
                channel: self.build_expr(chan)?,
                value: self.build_expr(value)?,
            },
            HostStmt::IncDec { x, inc, .. } => StmtKind::IncDec {
                target: self.build_expr(x)?,
                increment: inc,
            },
            HostStmt::Assign { lhs, tok, rhs, .. } => StmtKind::Assign(AssignStmt {
                lhs: self.build_exprs(lhs)?,
                op: assign_op(&tok).ok_or_else(|| {
                    LoadError::malformed(&location, format!("unknown assignment token `{tok}`"))
                })?,
                rhs: self.build_exprs(rhs)?,
            }),
            HostStmt::Go { call, .. } => StmtKind::Go(self.build_expr(call)?),
            HostStmt::Defer { call, .. } => StmtKind::Defer(self.build_expr(call)?),
            HostStmt::Return { results, .. } => StmtKind::Return(self.build_exprs(results)?),
            HostStmt::Branch { tok, label, .. } => StmtKind::Branch {
                kind: match tok.as_str() {
                    "break" => BranchKind::Break,
                    "continue" => BranchKind::Continue,
                    "goto" => BranchKind::Goto,
                    "fallthrough" => BranchKind::Fallthrough,
                    other => {
                        return Err(LoadError::malformed(
                            &location,
                            format!("unknown branch token `{other}`"),
                        ))
                    }
                },
                label: label.map(|label| self.identifier(label)).transpose()?,
            },
            HostStmt::Block(block) => StmtKind::Block(self.build_block(block)?),
            HostStmt::If {
                init,
                cond,
                body,
                otherwise,
                ..
            } => StmtKind::If(IfStmt {
                init: self.build_boxed_stmt(init)?,
                cond: self.build_expr(cond)?,
                then: self.build_block(body)?,
                otherwise: self.build_boxed_stmt(otherwise)?,
            }),
            HostStmt::Switch { init, tag, body, .. } => StmtKind::Switch(SwitchStmt {
                init: self.build_boxed_stmt(init)?,
                tag: tag.map(|tag| self.build_expr(tag)).transpose()?,
                clauses: self.build_clauses(body)?,
            }),
            HostStmt::TypeSwitch {
                init, assign, body, ..
            } => {
                let (binding, subject) = match *assign {
                    HostStmt::Assign { mut lhs, mut rhs, .. } if lhs.len() == 1 && rhs.len() == 1 => {
                        let binding = match lhs.remove(0) {
                            HostExpr::Ident(ident) => Some(self.identifier(ident)?),
                            _ => None,
                        };
                        (binding, rhs.remove(0))
                    }
                    HostStmt::Expr { x, .. } => (None, x),
                    _ => {
                        return Err(LoadError::malformed(&location, "type switch guard"));
                    }
                };
                let subject = match subject {
                    HostExpr::TypeAssert { x, .. } => *x,
                    other => other,
                };
                StmtKind::TypeSwitch(TypeSwitchStmt {
                    init: self.build_boxed_stmt(init)?,
                    binding,
                    subject: self.build_expr(subject)?,
                    clauses: self.build_clauses(body)?,
                })
            }
            HostStmt::Select { body, .. } => StmtKind::Select(SelectStmt {
                clauses: body
                    .into_iter()
                    .map(|clause| -> Result<CommClause> {
                        Ok(CommClause {
                            location: self.location(clause.pos),
                            comm: self.build_boxed_stmt(clause.comm)?,
                            body: clause
                                .body
                                .into_iter()
                                .map(|stmt| self.build_stmt(stmt))
                                .collect::<Result<_>>()?,
                        })
                    })
                    .collect::<Result<_>>()?,
            }),
            HostStmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => StmtKind::For(ForStmt {
                init: self.build_boxed_stmt(init)?,
                cond: cond.map(|cond| self.build_expr(cond)).transpose()?,
                post: self.build_boxed_stmt(post)?,
                body: self.build_block(body)?,
            }),
            HostStmt::Range {
                key,
                value,
                tok,
                x,
                body,
                ..
            } => StmtKind::Range(RangeStmt {
                key: key.map(|key| self.build_expr(key)).transpose()?,
                value: value.map(|value| self.build_expr(value)).transpose()?,
                define: tok == ":=",
                subject: self.build_expr(x)?,
                body: self.build_block(body)?,
            }),
        };
        Ok(Stmt { location, kind })
    }

    fn build_boxed_expr(&mut self, expr: Option<Box<HostExpr>>) -> Result<Option<Box<Expr>>> {
        expr.map(|expr| self.build_expr(*expr).map(Box::new)).transpose()
    }

    fn build_expr(&mut self, expr: HostExpr) -> Result<Expr> {
        let location = self.location(expr.pos());
        let typed = self.typed(expr.tv(), &location)?;
        let denotes_type = expr.tv().is_type
            || matches!(
                expr,
                HostExpr::ArrayType { .. }
                    | HostExpr::StructType { .. }
                    | HostExpr::FuncType(_)
                    | HostExpr::InterfaceType { .. }
                    | HostExpr::MapType { .. }
                    | HostExpr::ChanType { .. }
                    | HostExpr::Ident(HostIdent {
                        obj: Some(HostObject {
                            kind: ObjectKind::TypeName,
                            ..
                        }),
                        ..
                    })
            );
        if denotes_type {
            let ty = self.build_type(expr)?;
            return Ok(self.expr(location, typed, ExprKind::Type(ty)));
        }

        let kind = match expr {
            HostExpr::Ident(ident) => {
                let kind = ident.obj.as_ref().map(|obj| obj.kind);
                let ident = self.identifier(ident)?;
                match kind {
                    Some(ObjectKind::Const) => ExprKind::Constant(ident),
                    Some(ObjectKind::Func) => ExprKind::Function(ident),
                    Some(ObjectKind::PkgName) => ExprKind::Package(ident),
                    Some(ObjectKind::Builtin) => ExprKind::Builtin(ident),
                    Some(ObjectKind::Nil) => ExprKind::Nil,
                    Some(ObjectKind::Var | ObjectKind::Label | ObjectKind::TypeName) | None => {
                        ExprKind::Variable(ident)
                    }
                }
            }
            HostExpr::BasicLit { lit, value, .. } => ExprKind::Literal(Literal {
                kind: match lit.as_str() {
                    "INT" => LiteralKind::Int,
                    "FLOAT" => LiteralKind::Float,
                    "IMAG" => LiteralKind::Imag,
                    "CHAR" => LiteralKind::Char,
                    "STRING" => LiteralKind::String,
                    other => {
                        return Err(LoadError::malformed(
                            &location,
                            format!("unknown literal kind `{other}`"),
                        ))
                    }
                },
                raw: value,
            }),
            HostExpr::CompositeLit { ty, elts, .. } => ExprKind::Composite {
                ty: ty.map(|ty| self.build_type(*ty)).transpose()?,
                elements: self.build_exprs(elts)?,
            },
            HostExpr::FuncLit { pos, ty, body, .. } => {
                ExprKind::FunctionLit(self.build_function(pos, ty, Some(body))?)
            }
            HostExpr::Paren { x, .. } => ExprKind::Paren(Box::new(self.build_expr(*x)?)),
            HostExpr::Selector {
                x, sel, selection, ..
            } => {
                let (kind, path, indirect) = match selection {
                    None => (SelectionKind::Qualified, Vec::new(), false),
                    Some(selection) => (
                        match selection.kind {
                            HostSelectionKind::Field => SelectionKind::Field,
                            HostSelectionKind::Method => SelectionKind::Method,
                            HostSelectionKind::MethodExpr => SelectionKind::MethodExpr,
                        },
                        selection.index,
                        selection.indirect,
                    ),
                };
                ExprKind::Selector(SelectorExpr {
                    target: Box::new(self.build_expr(*x)?),
                    field: self.identifier(sel)?,
                    kind,
                    path,
                    indirect,
                })
            }
            HostExpr::Index { x, index, .. } => ExprKind::Index {
                target: Box::new(self.build_expr(*x)?),
                index: Box::new(self.build_expr(*index)?),
            },
            HostExpr::IndexList { x, indices, .. } => ExprKind::Indices {
                target: Box::new(self.build_expr(*x)?),
                indices: self.build_exprs(indices)?,
            },
            HostExpr::Slice {
                x, low, high, max, ..
            } => ExprKind::Slice {
                target: Box::new(self.build_expr(*x)?),
                low: self.build_boxed_expr(low)?,
                high: self.build_boxed_expr(high)?,
                max: self.build_boxed_expr(max)?,
            },
            HostExpr::TypeAssert { x, ty, .. } => ExprKind::TypeAssertion {
                target: Box::new(self.build_expr(*x)?),
                ty: ty.map(|ty| self.build_type(*ty)).transpose()?,
            },
            HostExpr::Call {
                fun, args, ellipsis, ..
            } => ExprKind::Call(CallExpr {
                callee: Box::new(self.build_expr(*fun)?),
                args: self.build_exprs(args)?,
                ellipsis,
            }),
            HostExpr::Star { x, .. } => ExprKind::Deref(Box::new(self.build_expr(*x)?)),
            HostExpr::Unary { op, x, .. } => {
                let operand = Box::new(self.build_expr(*x)?);
                match op.as_str() {
                    "<-" => ExprKind::Receive(operand),
                    "-" => ExprKind::Unary { op: UnaryOp::Neg, operand },
                    "+" => ExprKind::Unary { op: UnaryOp::Plus, operand },
                    "!" => ExprKind::Unary { op: UnaryOp::Not, operand },
                    "^" => ExprKind::Unary {
                        op: UnaryOp::Complement,
                        operand,
                    },
                    "&" => ExprKind::Unary {
                        op: UnaryOp::Address,
                        operand,
                    },
                    other => {
                        return Err(LoadError::malformed(
                            &location,
                            format!("unknown unary operator `{other}`"),
                        ))
                    }
                }
            }
            HostExpr::Binary { op, x, y, .. } => ExprKind::Binary {
                op: binary_op(&op).ok_or_else(|| {
                    LoadError::malformed(&location, format!("unknown binary operator `{op}`"))
                })?,
                lhs: Box::new(self.build_expr(*x)?),
                rhs: Box::new(self.build_expr(*y)?),
            },
            HostExpr::KeyValue { key, value, .. } => ExprKind::KeyValue {
                key: Box::new(self.build_expr(*key)?),
                value: Box::new(self.build_expr(*value)?),
            },
            HostExpr::Ellipsis { .. } => {
                warn!(%location, "ellipsis outside of a parameter list");
                return Err(LoadError::malformed(&location, "stray ellipsis"));
            }
            HostExpr::ArrayType { .. }
            | HostExpr::StructType { .. }
            | HostExpr::FuncType(_)
            | HostExpr::InterfaceType { .. }
            | HostExpr::MapType { .. }
            | HostExpr::ChanType { .. } => {
                return Err(LoadError::malformed(&location, "type in expression position"))
            }
        };
        Ok(self.expr(location, typed, kind))
    }

    fn build_type(&mut self, expr: HostExpr) -> Result<TypeExpr> {
        let location = self.location(expr.pos());
        let typed = self.typed(expr.tv(), &location)?;
        let kind = match expr {
            HostExpr::Ident(ident) => {
                let package = ident
                    .obj
                    .as_ref()
                    .and_then(|obj| obj.package.clone())
                    .filter(|package| *package != self.package);
                TypeExprKind::Named {
                    package,
                    name: self.identifier(ident)?,
                }
            }
            HostExpr::Selector { x, sel, .. } => {
                let package = match *x {
                    HostExpr::Ident(ident) => ident.name,
                    other => {
                        return Err(LoadError::malformed(
                            &self.location(other.pos()),
                            "qualified type name",
                        ))
                    }
                };
                TypeExprKind::Named {
                    package: Some(package),
                    name: self.identifier(sel)?,
                }
            }
            HostExpr::Paren { x, .. } => return self.build_type(*x),
            HostExpr::Star { x, .. } => TypeExprKind::Pointer(Box::new(self.build_type(*x)?)),
            HostExpr::ArrayType { len, elt, .. } => {
                let elem = Box::new(self.build_type(*elt)?);
                match len {
                    None => TypeExprKind::Slice(elem),
                    // `[...]T` carries its length in the resolved type only.
                    Some(len) if matches!(*len, HostExpr::Ellipsis { .. }) => TypeExprKind::Array { len: None, elem },
                    Some(len) => TypeExprKind::Array {
                        len: Some(Box::new(self.build_expr(*len)?)),
                        elem,
                    },
                }
            }
            HostExpr::MapType { key, value, .. } => TypeExprKind::Map {
                key: Box::new(self.build_type(*key)?),
                value: Box::new(self.build_type(*value)?),
            },
            HostExpr::ChanType { dir, value, .. } => TypeExprKind::Chan {
                dir,
                elem: Box::new(self.build_type(*value)?),
            },
            HostExpr::FuncType(func) => TypeExprKind::Function(Box::new(self.build_signature(func)?)),
            HostExpr::InterfaceType { methods, .. } => TypeExprKind::Interface(self.build_fields(methods)?),
            HostExpr::StructType { fields, .. } => TypeExprKind::Struct(self.build_fields(fields)?),
            HostExpr::Ellipsis { elt: Some(elt), .. } => {
                TypeExprKind::Variadic(Box::new(self.build_type(*elt)?))
            }
            HostExpr::Index { x, index, .. } => TypeExprKind::Instance {
                base: Box::new(self.build_type(*x)?),
                args: vec![self.build_type(*index)?],
            },
            HostExpr::IndexList { x, indices, .. } => TypeExprKind::Instance {
                base: Box::new(self.build_type(*x)?),
                args: indices
                    .into_iter()
                    .map(|index| self.build_type(index))
                    .collect::<Result<_>>()?,
            },
            _ => return Err(LoadError::malformed(&location, "expected a type expression")),
        };
        Ok(TypeExpr {
            id: self.ids.next(),
            location,
            typed,
            kind,
        })
    }
}

fn assign_op(tok: &str) -> Option<AssignOp> {
    Some(match tok {
        "=" => AssignOp::Assign,
        ":=" => AssignOp::Define,
        "+=" => AssignOp::Add,
        "-=" => AssignOp::Sub,
        "*=" => AssignOp::Mul,
        "/=" => AssignOp::Div,
        "%=" => AssignOp::Rem,
        "&=" => AssignOp::And,
        "|=" => AssignOp::Or,
        "^=" => AssignOp::Xor,
        "<<=" => AssignOp::Shl,
        ">>=" => AssignOp::Shr,
        "&^=" => AssignOp::AndNot,
        _ => return None,
    })
}

fn binary_op(op: &str) -> Option<BinaryOp> {
    Some(match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Rem,
        "&" => BinaryOp::And,
        "|" => BinaryOp::Or,
        "^" => BinaryOp::Xor,
        "<<" => BinaryOp::Shl,
        ">>" => BinaryOp::Shr,
        "&^" => BinaryOp::AndNot,
        "&&" => BinaryOp::LogicalAnd,
        "||" => BinaryOp::LogicalOr,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        _ => return None,
    })
}
