//! Physically relocating files and directories once rewriting is done

use relocate_core::PathMap;
use relocate_foundation::{RelocateError, RelocateResult};
use std::path::Path;
use tracing::{debug, info, warn};

use super::report::FileFailure;

/// Rename a single entry, creating the destination's parent directories.
///
/// Files fall back to copy and delete when a rename is refused, e.g. across
/// filesystems. Directories must be renamable as a whole.
async fn move_entry(source: &Path, target: &Path) -> RelocateResult<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RelocateError::io(parent, e))?;
    }

    match tokio::fs::rename(source, target).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            let metadata = tokio::fs::metadata(source)
                .await
                .map_err(|e| RelocateError::io(source, e))?;
            if metadata.is_dir() {
                return Err(RelocateError::io(source, rename_err));
            }
            debug!(
                source = %source.display(),
                error = %rename_err,
                "Rename failed, copying instead"
            );
            tokio::fs::copy(source, target)
                .await
                .map_err(|e| RelocateError::io(target, e))?;
            tokio::fs::remove_file(source)
                .await
                .map_err(|e| RelocateError::io(source, e))?;
            Ok(())
        }
    }
}

/// Move every entry of `plan`, which must be the unexpanded plan so that
/// directories move in one piece.
///
/// Entries are moved in order and independently; a failed entry is recorded
/// and the rest are still attempted.
pub async fn move_paths(plan: &PathMap) -> Vec<FileFailure> {
    let mut failures = Vec::new();
    for (source, target) in plan.iter() {
        if source == target {
            continue;
        }
        match move_entry(source, target).await {
            Ok(()) => info!(
                source = %source.display(),
                target = %target.display(),
                "Moved"
            ),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Failed to move");
                failures.push(FileFailure::new(source, &e));
            }
        }
    }
    failures
}
