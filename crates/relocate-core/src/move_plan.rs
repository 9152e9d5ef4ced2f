//! Move plan builder
//!
//! Turns a `MoveRequest` into the absolute `PathMap` every later stage reads.
//! `validate` runs first and rejects requests that would overwrite or lose
//! data; `create_move_paths` assumes it passed.

use relocate_foundation::{ProjectContext, ValidationError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::path_map::{MoveRequest, PathMap};

/// Destination of a source placed inside `target_dir`
fn placed_inside(source: &Path, target_dir: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => target_dir.join(name),
        None => target_dir.to_path_buf(),
    }
}

/// Whether a request moves a single source onto an exact destination, as
/// opposed to placing sources inside the target directory.
fn is_exact_destination(request: &MoveRequest, target: &Path) -> bool {
    request.source_paths.len() == 1 && !target.is_dir()
}

/// Absolute (source, destination) pairs in request order
fn destinations(request: &MoveRequest, ctx: &ProjectContext) -> Vec<(PathBuf, PathBuf)> {
    let target = ctx.absolute(&request.target_path);
    let exact = is_exact_destination(request, &target);
    request
        .source_paths
        .iter()
        .map(|source| {
            let source = ctx.absolute(source);
            let destination = if exact {
                target.clone()
            } else {
                placed_inside(&source, &target)
            };
            (source, destination)
        })
        .collect()
}

/// Reject requests that cannot be carried out safely.
///
/// Nothing has been rewritten or moved when this fails.
pub fn validate(request: &MoveRequest, ctx: &ProjectContext) -> Result<(), ValidationError> {
    if request.source_paths.is_empty() || request.target_path.as_os_str().is_empty() {
        return Err(ValidationError::MissingPaths);
    }

    for source in &request.source_paths {
        let absolute = ctx.absolute(source);
        if !absolute.exists() {
            return Err(ValidationError::SourceNotFound { path: source.clone() });
        }
    }

    let target = ctx.absolute(&request.target_path);
    if request.source_paths.len() == 1 {
        if target.exists() && !target.is_dir() {
            return Err(ValidationError::TargetExists {
                path: request.target_path.clone(),
            });
        }
    } else if !target.exists() {
        return Err(ValidationError::TargetMissing {
            path: request.target_path.clone(),
        });
    } else if !target.is_dir() {
        return Err(ValidationError::TargetNotDirectory {
            path: request.target_path.clone(),
        });
    }

    let mut seen: HashMap<PathBuf, PathBuf> = HashMap::new();
    for (source, destination) in destinations(request, ctx) {
        if source.is_dir() && destination.starts_with(&source) {
            return Err(ValidationError::TargetInsideSource {
                source_path: source,
                target: destination,
            });
        }

        if let Some(first) = seen.get(&destination) {
            return Err(ValidationError::DuplicateDestination {
                first: first.clone(),
                second: source,
                target: destination,
            });
        }

        if destination != source && destination.exists() {
            return Err(ValidationError::TargetExists { path: destination });
        }

        seen.insert(destination, source);
    }

    Ok(())
}

/// Build the absolute move plan for an already validated request.
///
/// A single source whose target is not an existing directory lands exactly on
/// the target. Everything else is placed inside the target as
/// `target/basename(source)`.
pub fn create_move_paths(request: &MoveRequest, ctx: &ProjectContext) -> PathMap {
    let map: PathMap = destinations(request, ctx).into_iter().collect();
    debug!(entries = map.len(), "Created move plan");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_single_file_to_new_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        let ctx = ProjectContext::new(dir.path());
        let request = MoveRequest::new(["a.js"], "b.js");

        validate(&request, &ctx).unwrap();
        let map = create_move_paths(&request, &ctx);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&dir.path().join("a.js")), Some(dir.path().join("b.js").as_path()));
    }

    #[test]
    fn test_single_file_into_existing_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        fs::create_dir(dir.path().join("lib")).unwrap();
        let ctx = ProjectContext::new(dir.path());
        let request = MoveRequest::new(["a.js"], "lib");

        validate(&request, &ctx).unwrap();
        let map = create_move_paths(&request, &ctx);

        assert_eq!(
            map.get(&dir.path().join("a.js")),
            Some(dir.path().join("lib/a.js").as_path())
        );
    }

    #[test]
    fn test_multiple_sources_into_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "src/b.ts");
        fs::create_dir(dir.path().join("lib")).unwrap();
        let ctx = ProjectContext::new(dir.path());
        let request = MoveRequest::new(["a.js", "src/b.ts"], "lib");

        validate(&request, &ctx).unwrap();
        let map = create_move_paths(&request, &ctx);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&dir.path().join("src/b.ts")),
            Some(dir.path().join("lib/b.ts").as_path())
        );
    }

    #[test]
    fn test_directory_source_keeps_its_name_inside_existing_target() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "mod/index.js");
        fs::create_dir(dir.path().join("pkg")).unwrap();
        let ctx = ProjectContext::new(dir.path());
        let request = MoveRequest::new(["mod"], "pkg");

        let map = create_move_paths(&request, &ctx);
        assert_eq!(
            map.get(&dir.path().join("mod")),
            Some(dir.path().join("pkg/mod").as_path())
        );
    }

    #[test]
    fn test_relative_paths_use_cwd() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.js");
        let ctx = ProjectContext::new(dir.path()).with_cwd(dir.path().join("src"));
        let request = MoveRequest::new(["./a.js"], "../b.js");

        validate(&request, &ctx).unwrap();
        let map = create_move_paths(&request, &ctx);
        assert_eq!(
            map.get(&dir.path().join("src/a.js")),
            Some(dir.path().join("b.js").as_path())
        );
    }

    #[test]
    fn test_rejects_missing_source() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["nope.js"], "b.js"), &ctx).unwrap_err();
        assert_eq!(err, ValidationError::SourceNotFound { path: "nope.js".into() });
    }

    #[test]
    fn test_rejects_existing_file_target() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "b.js");
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["a.js"], "b.js"), &ctx).unwrap_err();
        assert_eq!(err, ValidationError::TargetExists { path: "b.js".into() });
    }

    #[test]
    fn test_rejects_missing_directory_for_multiple_sources() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "b.js");
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["a.js", "b.js"], "lib"), &ctx).unwrap_err();
        assert_eq!(err, ValidationError::TargetMissing { path: "lib".into() });
    }

    #[test]
    fn test_rejects_file_target_for_multiple_sources() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "b.js");
        touch(dir.path(), "c.js");
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["a.js", "b.js"], "c.js"), &ctx).unwrap_err();
        assert_eq!(err, ValidationError::TargetNotDirectory { path: "c.js".into() });
    }

    #[test]
    fn test_rejects_move_into_itself() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "mod/index.js");
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["mod"], "mod/inner"), &ctx).unwrap_err();
        assert!(matches!(err, ValidationError::TargetInsideSource { .. }));
    }

    #[test]
    fn test_rejects_colliding_basenames() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "x/a.js");
        touch(dir.path(), "y/a.js");
        fs::create_dir(dir.path().join("lib")).unwrap();
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["x/a.js", "y/a.js"], "lib"), &ctx).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateDestination { .. }));
    }

    #[test]
    fn test_rejects_occupied_slot_in_target_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "lib/a.js");
        let ctx = ProjectContext::new(dir.path());
        let err = validate(&MoveRequest::new(["a.js"], "lib"), &ctx).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TargetExists { path: dir.path().join("lib/a.js") }
        );
    }

    proptest! {
        #[test]
        fn prop_sources_land_under_target_directory(
            names in proptest::collection::btree_set("[a-z]{1,8}\\.js", 1..6),
        ) {
            let ctx = ProjectContext::new("/project");
            let request = MoveRequest::new(names.iter().map(|n| format!("src/{n}")), "/project/dest");
            let map = create_move_paths(&request, &ctx);

            prop_assert_eq!(map.len(), names.len());
            for name in &names {
                let source = PathBuf::from(format!("/project/src/{name}"));
                let expected = if names.len() == 1 {
                    PathBuf::from("/project/dest")
                } else {
                    PathBuf::from(format!("/project/dest/{name}"))
                };
                prop_assert_eq!(map.get(&source), Some(expected.as_path()));
            }
        }
    }
}
