//! Move planning and import specifier rewriting
//!
//! Data flows in one direction:
//!
//! ```text
//! MoveRequest --validate/create_move_paths--> PathMap
//!             --expand_directory_paths-------> PathMap (files only)
//!             --ImportUpdater (per literal)--> new specifier text
//! ```
//!
//! Nothing here parses source files or mutates the filesystem; those are the
//! `SpecifierRewriter` implementations and the services crate.

pub mod expand;
pub mod move_plan;
pub mod path_map;
pub mod path_style;
pub mod resolver;
pub mod rewriter;
pub mod updater;

pub use expand::expand_directory_paths;
pub use move_plan::{create_move_paths, validate};
pub use path_map::{MoveRequest, PathMap};
pub use path_style::{match_path_style, normalize_specifier, relative_specifier};
pub use resolver::{FsProbe, ModuleProbe, ModuleResolver, UnresolvedImport};
pub use rewriter::{apply_edits, FileRewrite, QuoteStyle, SpecifierEdit, SpecifierRewriter};
pub use updater::{ImportUpdater, RewriteContext};
