//! Escape analysis over the typed IR.
//!
//! Every local binding is classified as no-escape (stays in its frame),
//! heap-escape (boxed in the owning task's allocator) or shared-escape
//! (boxed in storage other tasks may reach). The analysis runs in three
//! steps: [`RelationGraph::build`] records deciding verdicts and buddy
//! edges, [`Resolver`] computes the maximum verdict reachable from a node,
//! and [`annotate`] stores the result in each identifier for the generator.

mod annotate;
mod graph;
mod resolve;

pub use annotate::{annotate, EscapeEntry, EscapeReport};
pub use graph::{Relation, RelationGraph};
pub use resolve::Resolver;

use gz_core::ir::Package;
use gz_core::tracing::debug;

/// Classifies every binding of the package and records the verdicts in its
/// identifiers.
pub fn analyze(package: &Package) -> EscapeReport {
    let graph = RelationGraph::build(package);
    debug!("escape graph for {}: {} nodes", package.path, graph.len());
    let mut resolver = Resolver::new(&graph);
    let report = annotate(package, &mut resolver);
    debug!(
        "escape analysis for {}: {} locals, {} boxed",
        package.path,
        report.entries.len(),
        report.iter().filter(|entry| entry.state.is_boxed()).count()
    );
    report
}

#[cfg(test)]
mod tests;
