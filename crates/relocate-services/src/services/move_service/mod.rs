//! Move service
//!
//! Drives one move operation end to end:
//!
//! 1. validate the request (fatal errors stop here, nothing touched)
//! 2. build the move plan and expand directories into per-file entries
//! 3. enumerate the project, making sure every moving file is scanned
//! 4. rewrite specifiers in every file concurrently
//! 5. move the files and directories
//!
//! Rewriting happens before moving so every file is still at the location
//! the plan was computed from.

use relocate_config::TransformConfig;
use relocate_core::{
    create_move_paths, expand_directory_paths, validate, FsProbe, ImportUpdater, ModuleResolver,
    MoveRequest, QuoteStyle,
};
use relocate_foundation::{CollectingSink, DiagnosticSink, ProjectContext, RelocateResult};
use relocate_lang_js::JsSpecifierRewriter;
use std::sync::Arc;
use tracing::{debug, info};

use super::mover::move_paths;
use super::project::find_all_paths_categorized;
use super::report::MoveReport;
use super::transform_runner::TransformRunner;

/// Knobs of a single move operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOptions {
    pub quote: QuoteStyle,
    pub permissive_require: bool,
    pub concurrency: usize,
    pub respect_gitignore: bool,
    /// Compute everything, write and move nothing
    pub dry_run: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}

impl MoveOptions {
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            quote: config.quote,
            permissive_require: config.permissive_require,
            concurrency: config.concurrency,
            respect_gitignore: config.respect_gitignore,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

pub struct MoveService {
    ctx: ProjectContext,
    options: MoveOptions,
}

impl MoveService {
    pub fn new(ctx: ProjectContext, options: MoveOptions) -> Self {
        Self { ctx, options }
    }

    pub fn context(&self) -> &ProjectContext {
        &self.ctx
    }

    /// Run the whole operation.
    ///
    /// Returns `Err` only for fatal problems found before anything was
    /// written: validation, configuration and enumeration failures. Problems
    /// with individual files end up in `MoveReport::failures`.
    pub async fn execute(&self, request: &MoveRequest) -> RelocateResult<MoveReport> {
        validate(request, &self.ctx)?;

        let plan = create_move_paths(request, &self.ctx);
        let path_map = expand_directory_paths(&plan)?;
        info!(
            sources = plan.len(),
            files = path_map.len(),
            dry_run = self.options.dry_run,
            "Planned move"
        );

        let mut files = find_all_paths_categorized(&self.ctx, self.options.respect_gitignore)?;
        for source in path_map.sources() {
            files.include(source, &self.ctx);
        }
        debug!(files = files.len(), "Scanning project files");

        let sink = Arc::new(CollectingSink::echoing());
        let diagnostics: Arc<dyn DiagnosticSink> = sink.clone();
        let updater = ImportUpdater::from_context(
            ModuleResolver::new(FsProbe::from_context(&self.ctx), diagnostics.clone()),
            &self.ctx,
        );
        let js = JsSpecifierRewriter::new()
            .with_quote_style(self.options.quote)
            .with_permissive_require(self.options.permissive_require);

        let summary = TransformRunner::new(updater, js, path_map.clone(), diagnostics)
            .with_concurrency(self.options.concurrency)
            .with_dry_run(self.options.dry_run)
            .run(&files)
            .await;

        let mut failures = summary.failures;
        if !self.options.dry_run {
            failures.extend(move_paths(&plan).await);
        }

        let mut diagnostics = sink.take();
        diagnostics.sort_by_key(|d| (d.file.clone(), d.location.map(|l| (l.line, l.column))));

        let rewrites = summary.changed.iter().map(|c| c.rewrites.len()).sum();
        info!(
            scanned = summary.files_scanned,
            changed = summary.changed.len(),
            rewrites,
            failures = failures.len(),
            "Move finished"
        );

        Ok(MoveReport {
            path_map,
            files_scanned: summary.files_scanned,
            files_changed: summary.changed,
            rewrites,
            failures,
            diagnostics,
            dry_run: self.options.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relocate_config::TransformConfig;

    #[test]
    fn test_options_follow_config() {
        let config = TransformConfig {
            quote: QuoteStyle::Double,
            permissive_require: true,
            concurrency: 3,
            ..TransformConfig::default()
        };
        let options = MoveOptions::from_config(&config).with_dry_run(true);

        assert_eq!(options.quote, QuoteStyle::Double);
        assert!(options.permissive_require);
        assert_eq!(options.concurrency, 3);
        assert!(!options.respect_gitignore);
        assert!(options.dry_run);
    }
}
