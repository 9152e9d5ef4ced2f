//! Fixtures shared by relocate's integration tests

pub mod workspace;

pub use workspace::TestWorkspace;
