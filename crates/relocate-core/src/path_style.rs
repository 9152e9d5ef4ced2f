//! Keeping the author's specifier style when a path is recomputed
//!
//! ```text
//! -> import x from '../a';
//! <- import x from '../b';        // and not '../b.js'
//!
//! -> import x from '../a/index';
//! <- import x from '../b/index';  // and not '../b'
//! ```

use relocate_foundation::paths::{extension, normalize_path, to_slash};
use std::path::Path;

/// Basename a module loader falls back to inside a directory
pub const INDEX_BASENAME: &str = "index";

/// Shape `candidate` like `reference`.
///
/// A reference with an extension keeps the candidate as is. Without one the
/// candidate loses its extension, and an `index` file collapses to its
/// directory unless the reference spelled `index` out too.
pub fn match_path_style(candidate: &str, reference: &str) -> String {
    if extension(reference).is_some() {
        return candidate.to_string();
    }

    let reference_basename = Path::new(reference)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let candidate_path = Path::new(candidate);
    let candidate_stem = candidate_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let candidate_dir = match candidate_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    if candidate_stem == INDEX_BASENAME && reference_basename != INDEX_BASENAME {
        return to_slash(candidate_dir);
    }

    to_slash(&normalize_path(&candidate_dir.join(candidate_stem)))
}

/// Make sure a specifier starts with `.` or `/`, e.g. `a.js` -> `./a.js`
pub fn normalize_specifier(specifier: &str) -> String {
    if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
        return specifier.to_string();
    }
    format!("./{specifier}")
}

/// Relative specifier from the directory of `from_file` to `target`, styled
/// after `reference`.
///
/// ```text
/// from_file: /p/folder/a.js
/// target:    /p/b.js
/// reference: ./folder/a
/// -> ../b
/// ```
pub fn relative_specifier(from_file: &Path, target: &Path, reference: &str) -> String {
    let from_dir = from_file.parent().unwrap_or(from_file);
    let relative =
        pathdiff::diff_paths(target, from_dir).unwrap_or_else(|| target.to_path_buf());
    normalize_specifier(&match_path_style(&to_slash(&relative), reference))
}
