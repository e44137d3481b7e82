//! Core data model shared by every gozig stage: the typed IR a loaded Go
//! package is lowered into, the resolved type table that backs it, source
//! locations, the escape lattice and the error taxonomy.

pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod id;
pub mod ir;
pub mod location;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use tracing;

pub use error::{CodegenError, Result};
pub use escape::EscapeState;
pub use id::{NodeId, NodeIdGen};
pub use location::Location;
pub use types::{TypeId, TypeKind, TypeTable};
pub use value::ConstValue;
