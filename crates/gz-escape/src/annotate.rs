use crate::resolve::Resolver;
use gz_core::ir::visit::{walk_definition, walk_expr, walk_function, walk_package, Visitor};
use gz_core::ir::*;
use gz_core::{EscapeState, Location, NodeId};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub struct EscapeEntry {
    pub name: String,
    pub location: Location,
    pub state: EscapeState,
}

impl Display for EscapeEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {}", self.location, self.name, self.state)
    }
}

/// Verdicts of the local variables of one package, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EscapeReport {
    pub entries: Vec<EscapeEntry>,
}

impl EscapeReport {
    pub fn get(&self, name: &str) -> Option<EscapeState> {
        self.entries.iter().find(|entry| entry.name == name).map(|entry| entry.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EscapeEntry> {
        self.entries.iter()
    }
}

struct Annotator<'r, 'g> {
    resolver: &'r mut Resolver<'g>,
    locals: BTreeMap<NodeId, EscapeEntry>,
}

impl Annotator<'_, '_> {
    fn record(&mut self, ident: &Identifier) {
        if ident.global || ident.is_blank() {
            return;
        }
        let Some(binding) = ident.binding else { return };
        let state = self.resolver.resolve(binding);
        self.locals.entry(binding).or_insert_with(|| EscapeEntry {
            name: ident.name.clone(),
            location: ident.location.clone(),
            state,
        });
    }
}

impl Visitor for Annotator<'_, '_> {
    fn visit_identifier(&mut self, ident: &Identifier) {
        if let Some(binding) = ident.binding {
            let state = self.resolver.resolve(binding);
            // A cell that is already filled keeps its first verdict.
            let _ = ident.escapes.set(state);
        }
    }

    fn visit_definition(&mut self, def: &Definition) {
        match def {
            Definition::Variable(def) => {
                for name in def.names.iter().filter(|name| name.declares) {
                    self.record(name);
                }
            }
            Definition::Function(def) => {
                if let Some(receiver) = &def.receiver {
                    for name in &receiver.names {
                        self.record(name);
                    }
                }
            }
            Definition::Type(_) | Definition::Constant(_) => {}
        }
        walk_definition(self, def)
    }

    fn visit_function(&mut self, func: &Function) {
        for field in func.signature.params.iter().chain(&func.signature.results) {
            for name in &field.names {
                self.record(name);
            }
        }
        walk_function(self, func)
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Variable(ident) = &expr.kind {
            if ident.declares {
                self.record(ident);
            }
        }
        walk_expr(self, expr)
    }
}

/// Writes the resolved verdict into every identifier that refers to a
/// binding and reports the verdicts of local variables.
pub fn annotate(package: &Package, resolver: &mut Resolver<'_>) -> EscapeReport {
    let mut annotator = Annotator {
        resolver,
        locals: BTreeMap::new(),
    };
    walk_package(&mut annotator, package);
    let mut entries: Vec<_> = annotator.locals.into_values().collect();
    entries.sort_by(|a, b| {
        (&a.location.file, a.location.line, a.location.column).cmp(&(&b.location.file, b.location.line, b.location.column))
    });
    EscapeReport { entries }
}

