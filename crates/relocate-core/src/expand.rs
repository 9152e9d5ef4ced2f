//! Directory expansion of a move plan

use ignore::WalkBuilder;
use relocate_foundation::{RelocateError, RelocateResult, IGNORED_DIRECTORIES};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::path_map::PathMap;

/// Every file below `dir`, skipping dependency and VCS directories.
///
/// Hidden files and files a `.gitignore` would hide are included: moving a
/// directory moves all of it.
fn descendant_files(dir: &Path) -> RelocateResult<Vec<PathBuf>> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| IGNORED_DIRECTORIES.contains(&name))
                    .unwrap_or(false))
        })
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| RelocateError::io_message(dir, format!("Walk error: {e}")))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Replace every directory entry of `paths` by one entry per descendant file.
///
/// `{src/dir: dst/dir}` becomes `{src/dir/rel: dst/dir/rel}` for each file
/// below `src/dir`. File entries pass through unchanged, so a plan without
/// directories comes back equal to its input.
pub fn expand_directory_paths(paths: &PathMap) -> RelocateResult<PathMap> {
    let mut expanded = PathMap::new();
    for (source, target) in paths.iter() {
        if !source.is_dir() {
            expanded.insert(source.to_path_buf(), target.to_path_buf());
            continue;
        }

        let files = descendant_files(source)?;
        debug!(
            directory = %source.display(),
            files = files.len(),
            "Expanding directory"
        );
        for file in files {
            let relative = file.strip_prefix(source).map_err(|_| {
                RelocateError::internal(format!(
                    "{} is not below {}",
                    file.display(),
                    source.display()
                ))
            })?;
            expanded.insert(file.clone(), target.join(relative));
        }
    }
    Ok(expanded)
}
