//! JavaScript/TypeScript support for relocate
//!
//! Two `SpecifierRewriter` implementations:
//! - [`JsSpecifierRewriter`] parses sources with swc and rewrites the path
//!   literal of every import-like construct
//! - [`TextSpecifierRewriter`] scans any other text file for quoted relative
//!   paths

mod classifier;
mod js;
mod parser;
mod text;

pub use js::JsSpecifierRewriter;
pub use text::TextSpecifierRewriter;
