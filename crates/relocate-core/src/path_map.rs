//! The move plan shared by every stage of an operation

use relocate_foundation::paths::normalize_path;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// User input: what to move and where, not yet resolved to absolute form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub source_paths: Vec<PathBuf>,
    pub target_path: PathBuf,
}

impl MoveRequest {
    pub fn new<I, P>(source_paths: I, target_path: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source_paths: source_paths.into_iter().map(Into::into).collect(),
            target_path: target_path.into(),
        }
    }

    /// Split a positional argument list whose last element is the target
    pub fn from_args<I, P>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: Vec<PathBuf> = args.into_iter().map(Into::into).collect();
        let target_path = paths.pop()?;
        if paths.is_empty() {
            return None;
        }
        Some(Self {
            source_paths: paths,
            target_path,
        })
    }
}

/// Absolute source path -> absolute destination path.
///
/// Built once per operation and only read afterwards. Ordering is by source
/// path so iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PathMap {
    entries: BTreeMap<PathBuf, PathBuf>,
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, source: PathBuf, target: PathBuf) {
        debug_assert!(source.is_absolute(), "source {} is not absolute", source.display());
        debug_assert!(target.is_absolute(), "target {} is not absolute", target.display());
        self.entries
            .insert(normalize_path(&source), normalize_path(&target));
    }

    /// Destination of `source`, if it is moving
    pub fn get(&self, source: &Path) -> Option<&Path> {
        self.entries.get(source).map(PathBuf::as_path)
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.entries.contains_key(source)
    }

    /// Where `path` lives once the move is done
    pub fn final_location<'a>(&'a self, path: &'a Path) -> &'a Path {
        self.get(path).unwrap_or(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .map(|(source, target)| (source.as_path(), target.as_path()))
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, T> FromIterator<(S, T)> for PathMap
where
    S: Into<PathBuf>,
    T: Into<PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut map = PathMap::new();
        for (source, target) in iter {
            map.insert(source.into(), target.into());
        }
        map
    }
}

impl IntoIterator for PathMap {
    type Item = (PathBuf, PathBuf);
    type IntoIter = btree_map::IntoIter<PathBuf, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
