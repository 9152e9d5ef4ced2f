//! Services for coordinating a move operation

pub mod file_io;
pub mod move_service;
pub mod mover;
pub mod project;
pub mod report;
pub mod transform_runner;

pub use move_service::{MoveOptions, MoveService};
pub use mover::move_paths;
pub use project::{find_all_paths_categorized, find_project_root, ProjectFiles};
pub use report::{ChangedFile, FileFailure, MoveReport};
pub use transform_runner::{TransformRunner, TransformSummary};
