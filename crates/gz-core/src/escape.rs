//! The escape lattice.
//!
//! Every locally defined value is classified into one of three states,
//! ordered `NoEscape < HeapEscape < SharedEscape`. Classification only ever
//! moves up the lattice.

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeState {
    /// Lives in the frame of the function that declares it.
    #[default]
    NoEscape,
    /// Outlives its frame: boxed in the owning task's allocator.
    HeapEscape,
    /// Reachable from more than one task: boxed in shared storage.
    SharedEscape,
}

impl EscapeState {
    pub fn join(self, other: EscapeState) -> EscapeState {
        self.max(other)
    }

    pub fn is_boxed(self) -> bool {
        self != EscapeState::NoEscape
    }
}

impl Display for EscapeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EscapeState::NoEscape => "no-escape",
            EscapeState::HeapEscape => "heap-escape",
            EscapeState::SharedEscape => "shared-escape",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_monotonic() {
        use EscapeState::*;
        assert_eq!(NoEscape.join(HeapEscape), HeapEscape);
        assert_eq!(SharedEscape.join(HeapEscape), SharedEscape);
        assert_eq!(NoEscape.join(NoEscape), NoEscape);
        assert!(!NoEscape.is_boxed());
        assert!(HeapEscape.is_boxed());
    }
}
