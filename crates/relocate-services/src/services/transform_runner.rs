//! Concurrent per-file rewriting
//!
//! Every project file is independent of the others once the `PathMap` is
//! final, so files are read, rewritten and written in parallel. A file either
//! gets its complete new content or is left untouched.

use relocate_core::{
    FsProbe, ImportUpdater, PathMap, RewriteContext, SpecifierEdit, SpecifierRewriter,
};
use relocate_foundation::{DiagnosticSink, RelocateError, RelocateResult};
use relocate_lang_js::{JsSpecifierRewriter, TextSpecifierRewriter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::file_io::{read_text, write_atomic};
use super::project::ProjectFiles;
use super::report::{ChangedFile, FileFailure};

/// How the specifiers of a file are located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    /// Parsed, every import-like literal considered
    Source,
    /// Scanned for quoted relative paths
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub files_scanned: usize,
    pub changed: Vec<ChangedFile>,
    pub failures: Vec<FileFailure>,
}

enum FileOutcome {
    Unchanged,
    Skipped,
    Changed(ChangedFile),
}

/// Shared, read-only state of one transform pass
struct TransformState {
    updater: ImportUpdater<FsProbe>,
    js: JsSpecifierRewriter,
    text: TextSpecifierRewriter,
    path_map: PathMap,
    sink: Arc<dyn DiagnosticSink>,
}

impl TransformState {
    fn rewriter(&self, kind: FileKind) -> &dyn SpecifierRewriter {
        match kind {
            FileKind::Source => &self.js,
            FileKind::Text => &self.text,
        }
    }

    /// Rewrite one file's content. Pure apart from resolver probes.
    fn rewrite(
        &self,
        path: &Path,
        kind: FileKind,
        source: &str,
        dry_run: bool,
    ) -> RelocateResult<Vec<SpecifierEdit>> {
        let ctx = RewriteContext::new(path, &self.path_map);
        let update = |specifier: &str| match kind {
            FileKind::Source => self.updater.update_source_path(&ctx, specifier),
            FileKind::Text => self.updater.update_text_path(&ctx, specifier),
        };
        let rewriter = self.rewriter(kind);
        debug!(file = %path.display(), rewriter = rewriter.name(), "Scanning file");
        let rewrite = rewriter.rewrite(path, source, &update, self.sink.as_ref())?;

        if !rewrite.is_changed() {
            return Ok(Vec::new());
        }
        if !dry_run {
            write_atomic(path, &rewrite.content)?;
        }
        Ok(rewrite.edits)
    }
}

/// Failure entry for a task that panicked or was cancelled
fn join_failure(tasks: &HashMap<Id, PathBuf>, err: JoinError) -> FileFailure {
    let path = tasks.get(&err.id()).cloned().unwrap_or_default();
    error!(file = %path.display(), error = %err, "Task join error");
    FileFailure {
        path,
        error: err.to_string(),
    }
}

pub struct TransformRunner {
    state: Arc<TransformState>,
    concurrency: usize,
    dry_run: bool,
}

impl TransformRunner {
    pub fn new(
        updater: ImportUpdater<FsProbe>,
        js: JsSpecifierRewriter,
        path_map: PathMap,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            state: Arc::new(TransformState {
                updater,
                js,
                text: TextSpecifierRewriter::new(),
                path_map,
                sink,
            }),
            concurrency: 1,
            dry_run: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Compute rewrites without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    async fn process(
        state: Arc<TransformState>,
        path: PathBuf,
        kind: FileKind,
        dry_run: bool,
    ) -> RelocateResult<FileOutcome> {
        let Some(source) = read_text(&path).await? else {
            return Ok(FileOutcome::Skipped);
        };

        let file = path.clone();
        let edits = tokio::task::spawn_blocking(move || state.rewrite(&file, kind, &source, dry_run))
            .await
            .map_err(|e| RelocateError::internal(format!("Rewrite task failed: {}", e)))??;

        if edits.is_empty() {
            return Ok(FileOutcome::Unchanged);
        }
        info!(
            file = %path.display(),
            rewrites = edits.len(),
            "Rewrote specifiers"
        );
        Ok(FileOutcome::Changed(ChangedFile {
            path,
            rewrites: edits,
        }))
    }

    /// Rewrite every file in `files`. Failures are collected per file and
    /// never stop the other files.
    pub async fn run(&self, files: &ProjectFiles) -> TransformSummary {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        let mut tasks: HashMap<Id, PathBuf> = HashMap::new();

        let queue = files
            .sources
            .iter()
            .map(|p| (p, FileKind::Source))
            .chain(files.others.iter().map(|p| (p, FileKind::Text)));

        for (path, kind) in queue {
            let path = path.clone();
            let state = self.state.clone();
            let semaphore = semaphore.clone();
            let dry_run = self.dry_run;
            let task_path = path.clone();
            let handle = join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let outcome = Self::process(state, task_path.clone(), kind, dry_run).await;
                (task_path, outcome)
            });
            tasks.insert(handle.id(), path);
        }

        let mut summary = TransformSummary::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(FileOutcome::Skipped))) => {}
                Ok((_, Ok(FileOutcome::Unchanged))) => summary.files_scanned += 1,
                Ok((_, Ok(FileOutcome::Changed(changed)))) => {
                    summary.files_scanned += 1;
                    summary.changed.push(changed);
                }
                Ok((path, Err(e))) => {
                    warn!(file = %path.display(), error = %e, "Failed to update file");
                    summary.failures.push(FileFailure::new(path, &e));
                }
                Err(e) => summary.failures.push(join_failure(&tasks, e)),
            }
        }

        summary.changed.sort_by(|a, b| a.path.cmp(&b.path));
        summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            scanned = summary.files_scanned,
            changed = summary.changed.len(),
            failed = summary.failures.len(),
            "Transform finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relocate_core::ModuleResolver;
    use relocate_foundation::{CollectingSink, ProjectContext};
    use relocate_test_support::TestWorkspace;

    fn runner(ws: &TestWorkspace, path_map: PathMap, sink: Arc<CollectingSink>) -> TransformRunner {
        let ctx = ProjectContext::new(ws.path());
        let updater = ImportUpdater::from_context(
            ModuleResolver::new(FsProbe::from_context(&ctx), sink.clone()),
            &ctx,
        );
        TransformRunner::new(updater, JsSpecifierRewriter::new(), path_map, sink).with_concurrency(4)
    }

    fn files(ws: &TestWorkspace, sources: &[&str], others: &[&str]) -> ProjectFiles {
        ProjectFiles {
            sources: sources.iter().map(|p| ws.absolute_path(p)).collect(),
            others: others.iter().map(|p| ws.absolute_path(p)).collect(),
        }
    }

    #[tokio::test]
    async fn test_rewrites_sources_and_text_files() {
        let ws = TestWorkspace::new();
        ws.create_file("a.js", "module.exports = 1;\n");
        ws.create_file("modules.js", "const a = require('./a');\n");
        ws.create_file("README.md", "Entry point: \"./a.js\"\n");
        ws.create_binary_file("logo.png", &[0x89, b'P', b'N', b'G', 0, 1]);
        let path_map: PathMap = [(ws.absolute_path("a.js"), ws.absolute_path("b.js"))]
            .into_iter()
            .collect();
        let sink = Arc::new(CollectingSink::new());

        let summary = runner(&ws, path_map, sink)
            .run(&files(&ws, &["a.js", "modules.js"], &["README.md", "logo.png"]))
            .await;

        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.changed.len(), 2);
        assert!(summary.failures.is_empty());
        assert_eq!(ws.read_file("modules.js"), "const a = require('./b');\n");
        assert_eq!(ws.read_file("README.md"), "Entry point: \"./b.js\"\n");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let ws = TestWorkspace::new();
        ws.create_file("a.js", "");
        ws.create_file("modules.js", "import a from './a';\n");
        let path_map: PathMap = [(ws.absolute_path("a.js"), ws.absolute_path("lib/a.js"))]
            .into_iter()
            .collect();

        let summary = runner(&ws, path_map, Arc::new(CollectingSink::new()))
            .with_dry_run(true)
            .run(&files(&ws, &["a.js", "modules.js"], &[]))
            .await;

        assert_eq!(summary.changed.len(), 1);
        assert_eq!(summary.changed[0].rewrites[0].new_specifier, "./lib/a");
        assert_eq!(ws.read_file("modules.js"), "import a from './a';\n");
    }

    #[tokio::test]
    async fn test_dry_run_holds_after_the_runner_is_configured() {
        let ws = TestWorkspace::new();
        ws.create_file("a.js", "");
        ws.create_file("modules.js", "require('./a');\n");
        let path_map: PathMap = [(ws.absolute_path("a.js"), ws.absolute_path("b.js"))]
            .into_iter()
            .collect();
        let runner = runner(&ws, path_map, Arc::new(CollectingSink::new()));
        let shared = runner.state.clone();

        let summary = runner
            .with_dry_run(true)
            .run(&files(&ws, &["modules.js"], &[]))
            .await;

        drop(shared);
        assert_eq!(summary.changed.len(), 1);
        assert_eq!(ws.read_file("modules.js"), "require('./a');\n");
    }

    #[tokio::test]
    async fn test_panicked_task_names_its_file() {
        let mut join_set = JoinSet::<()>::new();
        let mut tasks = HashMap::new();
        let handle = join_set.spawn(async { panic!("rewriter exploded") });
        tasks.insert(handle.id(), PathBuf::from("/p/a.js"));

        let err = join_set.join_next().await.unwrap().unwrap_err();
        let failure = join_failure(&tasks, err);

        assert_eq!(failure.path, PathBuf::from("/p/a.js"));
        assert!(failure.error.contains("panic"));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_file() {
        let ws = TestWorkspace::new();
        ws.create_file("a.js", "");
        ws.create_file("broken.js", "import from from from;\nrequire('./a');\n");
        ws.create_file("ok.js", "require('./a');\n");
        let path_map: PathMap = [(ws.absolute_path("a.js"), ws.absolute_path("b.js"))]
            .into_iter()
            .collect();

        let summary = runner(&ws, path_map, Arc::new(CollectingSink::new()))
            .run(&files(&ws, &["a.js", "broken.js", "missing.js", "ok.js"], &[]))
            .await;

        let failed: Vec<_> = summary.failures.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            failed,
            vec![ws.absolute_path("broken.js"), ws.absolute_path("missing.js")]
        );
        assert_eq!(ws.read_file("ok.js"), "require('./b');\n");
        assert_eq!(ws.read_file("broken.js"), "import from from from;\nrequire('./a');\n");
    }
}
