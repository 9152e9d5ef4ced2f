//! Project discovery: where the project starts and which files it holds

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use relocate_foundation::{
    Diagnostic, DiagnosticKind, DiagnosticSink, ProjectContext, RelocateError, RelocateResult,
    IGNORED_DIRECTORIES,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PROJECT_MARKER: &str = "package.json";

/// Nearest ancestor of `start` (inclusive) holding a `package.json`.
///
/// Falls back to `start` itself, reporting a `ProjectRootFallback`
/// diagnostic.
pub fn find_project_root(start: &Path, sink: &dyn DiagnosticSink) -> PathBuf {
    if let Some(root) = start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).is_file())
    {
        info!(root = %root.display(), "Detected project root");
        return root.to_path_buf();
    }

    sink.report(Diagnostic::info(
        DiagnosticKind::ProjectRootFallback,
        start,
        format!(
            "No {PROJECT_MARKER} found above {}, using it as the project root",
            start.display()
        ),
    ));
    start.to_path_buf()
}

/// Every project file, split by whether it is parsed as source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectFiles {
    pub sources: Vec<PathBuf>,
    pub others: Vec<PathBuf>,
}

impl ProjectFiles {
    pub fn len(&self) -> usize {
        self.sources.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.others.is_empty()
    }

    /// Make sure `path` is scanned, even if enumeration filtered it out
    pub fn include(&mut self, path: &Path, ctx: &ProjectContext) {
        let bucket = if ctx.is_source_file(path) {
            &mut self.sources
        } else {
            &mut self.others
        };
        if let Err(index) = bucket.binary_search_by(|p| p.as_path().cmp(path)) {
            bucket.insert(index, path.to_path_buf());
        }
    }
}

fn ignore_matcher(ctx: &ProjectContext) -> RelocateResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(&ctx.root);
    for pattern in &ctx.ignore_patterns {
        builder.add_line(None, pattern).map_err(|e| {
            RelocateError::config(format!("Invalid ignore pattern '{}': {}", pattern, e))
        })?;
    }
    builder
        .build()
        .map_err(|e| RelocateError::config(format!("Failed to build ignore matcher: {}", e)))
}

fn is_ignored_directory(name: &str) -> bool {
    IGNORED_DIRECTORIES.contains(&name)
}

/// Walk the project root and categorize every file.
///
/// `node_modules`, `.git` and `.hg` are never entered. Ignore patterns use
/// gitignore syntax relative to the root. With `respect_gitignore`, files
/// hidden by `.gitignore` files are skipped as well. Both lists are sorted.
pub fn find_all_paths_categorized(
    ctx: &ProjectContext,
    respect_gitignore: bool,
) -> RelocateResult<ProjectFiles> {
    let matcher = ignore_matcher(ctx)?;
    let root = ctx.root.clone();

    let walker = WalkBuilder::new(&ctx.root)
        .standard_filters(false)
        .hidden(false)
        .git_ignore(respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if entry.path() == root {
                return true;
            }
            if is_dir
                && entry
                    .file_name()
                    .to_str()
                    .map(is_ignored_directory)
                    .unwrap_or(false)
            {
                return false;
            }
            !matcher.matched(entry.path(), is_dir).is_ignore()
        })
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = ProjectFiles::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.into_path();
        if ctx.is_source_file(&path) {
            files.sources.push(path);
        } else {
            files.others.push(path);
        }
    }

    files.sources.sort();
    files.others.sort();
    debug!(
        sources = files.sources.len(),
        others = files.others.len(),
        "Enumerated project files"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relocate_foundation::CollectingSink;
    use relocate_test_support::TestWorkspace;

    fn relative(ws: &TestWorkspace, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(ws.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_finds_nearest_package_json() {
        let ws = TestWorkspace::with_package_json("demo");
        ws.create_directory("src/deep");
        let sink = CollectingSink::new();

        let root = find_project_root(&ws.absolute_path("src/deep"), &sink);

        assert_eq!(root, ws.path());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_falls_back_to_start_directory() {
        let ws = TestWorkspace::new();
        ws.create_directory("src");
        let sink = CollectingSink::new();
        let start = ws.absolute_path("src");

        // a package.json above the temp dir would be found first
        if start.ancestors().any(|d| d.join(PROJECT_MARKER).is_file()) {
            return;
        }
        let root = find_project_root(&start, &sink);

        assert_eq!(root, start);
        let reported = sink.take();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].kind, DiagnosticKind::ProjectRootFallback);
    }

    #[test]
    fn test_categorizes_and_skips_dependency_directories() {
        let ws = TestWorkspace::with_package_json("demo");
        ws.create_file("src/a.js", "");
        ws.create_file("src/b.tsx", "");
        ws.create_file("README.md", "");
        ws.create_file(".eslintrc", "");
        ws.create_file("node_modules/dep/index.js", "");
        ws.create_file(".git/config", "");

        let ctx = ProjectContext::new(ws.path());
        let files = find_all_paths_categorized(&ctx, false).unwrap();

        assert_eq!(relative(&ws, &files.sources), vec!["src/a.js", "src/b.tsx"]);
        assert_eq!(
            relative(&ws, &files.others),
            vec![".eslintrc", "README.md", "package.json"]
        );
    }

    #[test]
    fn test_applies_ignore_patterns() {
        let ws = TestWorkspace::new();
        ws.create_file("src/a.js", "");
        ws.create_file("dist/bundle.js", "");
        ws.create_file("src/a.test.js", "");
        ws.create_file("notes.txt", "");

        let ctx = ProjectContext::new(ws.path())
            .with_ignore_patterns(["dist/", "*.test.js", "/notes.txt"]);
        let files = find_all_paths_categorized(&ctx, false).unwrap();

        assert_eq!(relative(&ws, &files.sources), vec!["src/a.js"]);
        assert!(files.others.is_empty());
    }

    #[test]
    fn test_gitignore_only_when_asked() {
        let ws = TestWorkspace::new();
        ws.create_file(".gitignore", "generated/\n");
        ws.create_file("generated/out.js", "");
        ws.create_file("src/a.js", "");
        let ctx = ProjectContext::new(ws.path());

        let all = find_all_paths_categorized(&ctx, false).unwrap();
        let filtered = find_all_paths_categorized(&ctx, true).unwrap();

        assert_eq!(relative(&ws, &all.sources), vec!["generated/out.js", "src/a.js"]);
        assert_eq!(relative(&ws, &filtered.sources), vec!["src/a.js"]);
    }

    #[test]
    fn test_include_keeps_lists_sorted_and_unique() {
        let ctx = ProjectContext::new("/p");
        let mut files = ProjectFiles {
            sources: vec![PathBuf::from("/p/a.js"), PathBuf::from("/p/c.js")],
            others: Vec::new(),
        };
        files.include(Path::new("/p/b.js"), &ctx);
        files.include(Path::new("/p/a.js"), &ctx);
        files.include(Path::new("/p/logo.svg"), &ctx);

        assert_eq!(
            files.sources,
            vec![
                PathBuf::from("/p/a.js"),
                PathBuf::from("/p/b.js"),
                PathBuf::from("/p/c.js")
            ]
        );
        assert_eq!(files.others, vec![PathBuf::from("/p/logo.svg")]);
        assert_eq!(files.len(), 4);
    }
}
