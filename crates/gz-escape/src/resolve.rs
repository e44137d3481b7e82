use crate::graph::RelationGraph;
use gz_core::{EscapeState, NodeId};
use std::collections::HashSet;

/// On-demand resolution of the escape verdict of a node: the maximum verdict
/// reachable through buddy edges.
pub struct Resolver<'g> {
    graph: &'g RelationGraph,
    memo: Vec<Option<EscapeState>>,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g RelationGraph) -> Self {
        Self {
            graph,
            memo: vec![None; graph.len()],
        }
    }

    pub fn resolve(&mut self, id: NodeId) -> EscapeState {
        if let Some(state) = self.memoized(id) {
            return state;
        }
        let mut visited = HashSet::new();
        let state = self.walk(id, &mut visited);
        // Every visited node lies in the same component, so it shares the
        // verdict, even when the walk stopped early on `SharedEscape`.
        for node in visited {
            if let Some(slot) = self.memo.get_mut(node.index()) {
                *slot = Some(state);
            }
        }
        state
    }

    fn memoized(&self, id: NodeId) -> Option<EscapeState> {
        self.memo.get(id.index()).copied().flatten()
    }

    fn walk(&self, start: NodeId, visited: &mut HashSet<NodeId>) -> EscapeState {
        let mut stack = vec![start];
        let mut state = EscapeState::NoEscape;
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            state = state.join(self.memoized(node).unwrap_or_else(|| self.graph.verdict(node)));
            if state == EscapeState::SharedEscape {
                break;
            }
            stack.extend(
                self.graph
                    .buddies(node)
                    .iter()
                    .filter(|buddy| !visited.contains(buddy)),
            );
        }
        state
    }
}
