pub mod services;

// Re-export commonly used types at crate root for convenience
pub use services::{
    find_all_paths_categorized, find_project_root, MoveOptions, MoveReport, MoveService,
    ProjectFiles,
};
