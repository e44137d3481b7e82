//! Go support for gozig: talks to the host type-checking toolchain and turns
//! its resolved package dumps into the gozig IR.

pub mod builder;
pub mod error;
pub mod frontend;
pub mod host;
pub mod toolchain;

pub use builder::build_package;
pub use error::{LoadError, LoadFailure};
pub use frontend::{DenyList, GoFrontend, LoadedProgram};
pub use toolchain::{CommandToolchain, HostToolchain, SnapshotToolchain};

#[cfg(test)]
mod tests;
