//! Command implementations for the gozig CLI

pub mod build;

pub use build::{build_command, test_command, BuildArgs, BuildSummary};
