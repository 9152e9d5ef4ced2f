//! Import reference updater
//!
//! Decides, for one specifier found in one file, whether the move touches it
//! and what it should read afterwards. The order of the checks matters:
//!
//! ```text
//! absolute           -> untouched
//! bare (no leading .) -> untouched
//! foreign extension  -> untouched
//! scanned file moves -> re-anchor at its new location (target remapped too)
//! target moves       -> point at the target's new location
//! otherwise          -> untouched
//! ```

use relocate_foundation::paths::extension;
use relocate_foundation::ProjectContext;
use std::path::Path;
use tracing::debug;

use crate::path_map::PathMap;
use crate::path_style::relative_specifier;
use crate::resolver::{FsProbe, ModuleProbe, ModuleResolver};

/// Everything the updater needs to know about the file under scan
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub current_file_path: &'a Path,
    pub path_map: &'a PathMap,
}

impl<'a> RewriteContext<'a> {
    pub fn new(current_file_path: &'a Path, path_map: &'a PathMap) -> Self {
        Self {
            current_file_path,
            path_map,
        }
    }
}

/// How loudly a failed resolution is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reporting {
    Warn,
    Quiet,
}

pub struct ImportUpdater<P = FsProbe> {
    resolver: ModuleResolver<P>,
    extensions: Vec<String>,
}

impl<P: ModuleProbe> ImportUpdater<P> {
    pub fn new(resolver: ModuleResolver<P>, extensions: Vec<String>) -> Self {
        Self {
            resolver,
            extensions,
        }
    }

    pub fn from_context(resolver: ModuleResolver<P>, ctx: &ProjectContext) -> Self {
        Self::new(resolver, ctx.extensions.clone())
    }

    /// New text for a specifier found in a parsed source file.
    ///
    /// Never fails: anything that cannot be decided comes back unchanged.
    pub fn update_source_path(&self, ctx: &RewriteContext<'_>, specifier: &str) -> String {
        self.update(ctx, specifier, Reporting::Warn)
    }

    /// Same decision for a quoted path found by the plain text scanner.
    /// Unresolvable paths are expected there and are not reported.
    pub fn update_text_path(&self, ctx: &RewriteContext<'_>, specifier: &str) -> String {
        self.update(ctx, specifier, Reporting::Quiet)
    }

    fn update(&self, ctx: &RewriteContext<'_>, specifier: &str, reporting: Reporting) -> String {
        let file = ctx.current_file_path;

        if Path::new(specifier).is_absolute() {
            debug!(
                file = %file.display(),
                specifier = %specifier,
                "Ignoring absolute path"
            );
            return specifier.to_string();
        }

        if !specifier.starts_with('.') {
            return specifier.to_string();
        }

        if let Some(ext) = extension(specifier) {
            if !self.extensions.iter().any(|e| e == ext) {
                return specifier.to_string();
            }
        }

        let resolved = match reporting {
            Reporting::Warn => self.resolver.resolve(file, specifier),
            Reporting::Quiet => self.resolver.resolve_quietly(file, specifier),
        };

        let updated = if let Some(new_own_path) = ctx.path_map.get(file) {
            let target = ctx.path_map.final_location(&resolved);
            relative_specifier(new_own_path, target, specifier)
        } else if let Some(new_target) = ctx.path_map.get(&resolved) {
            relative_specifier(file, new_target, specifier)
        } else {
            return specifier.to_string();
        };

        if updated != specifier {
            debug!(
                file = %file.display(),
                old = %specifier,
                new = %updated,
                "Updating specifier"
            );
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MockModuleProbe;
    use proptest::prelude::*;
    use relocate_foundation::{CollectingSink, DiagnosticKind};
    use std::path::PathBuf;
    use std::sync::Arc;

    const EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx"];

    /// Probe that treats every candidate as existing, appending `.js` to
    /// extension-less paths.
    fn permissive_probe() -> MockModuleProbe {
        let mut probe = MockModuleProbe::new();
        probe.expect_probe().returning(|p| {
            if p.extension().is_some() {
                Some(p.to_path_buf())
            } else {
                Some(p.with_extension("js"))
            }
        });
        probe
    }

    fn updater_with(probe: MockModuleProbe, sink: Arc<CollectingSink>) -> ImportUpdater<MockModuleProbe> {
        ImportUpdater::new(
            ModuleResolver::new(probe, sink),
            EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn updater() -> ImportUpdater<MockModuleProbe> {
        updater_with(permissive_probe(), Arc::new(CollectingSink::new()))
    }

    fn map(entries: &[(&str, &str)]) -> PathMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_rewrites_reference_to_moved_file() {
        let updater = updater();
        let paths = map(&[("/p/a.js", "/p/b.js")]);
        let ctx = RewriteContext::new(Path::new("/p/modules.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./a.js"), "./b.js");
        assert_eq!(updater.update_source_path(&ctx, "./a"), "./b");
    }

    #[test]
    fn test_leaves_bare_absolute_and_unrelated_specifiers() {
        let updater = updater();
        let paths = map(&[("/p/a.js", "/p/b.js")]);
        let ctx = RewriteContext::new(Path::new("/p/modules.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "lodash"), "lodash");
        assert_eq!(updater.update_source_path(&ctx, "/abs/path.js"), "/abs/path.js");
        assert_eq!(updater.update_source_path(&ctx, "./c"), "./c");
    }

    #[test]
    fn test_foreign_extension_is_untouched_and_not_resolved() {
        let mut probe = MockModuleProbe::new();
        probe.expect_probe().never();
        let updater = updater_with(probe, Arc::new(CollectingSink::new()));
        let paths = map(&[("/p/logo.png", "/p/assets/logo.png")]);
        let ctx = RewriteContext::new(Path::new("/p/modules.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./logo.png"), "./logo.png");
    }

    #[test]
    fn test_moving_file_reanchors_its_own_imports() {
        let updater = updater();
        let paths = map(&[("/p/a.js", "/p/folder/a.js")]);
        let ctx = RewriteContext::new(Path::new("/p/a.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./b"), "../b");
        assert_eq!(updater.update_source_path(&ctx, "./lib/c.js"), "../lib/c.js");
    }

    #[test]
    fn test_moving_file_follows_a_moving_target() {
        let updater = updater();
        let paths = map(&[("/p/a.js", "/p/x/a.js"), ("/p/b.js", "/p/y/b.js")]);
        let ctx = RewriteContext::new(Path::new("/p/a.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./b"), "../y/b");
    }

    #[test]
    fn test_directory_move_keeps_relative_shape() {
        let updater = updater();
        let paths = map(&[
            ("/p/source/a2.js", "/p/target/a2.js"),
            ("/p/source/level/a1.js", "/p/target/level/a1.js"),
        ]);
        let ctx = RewriteContext::new(Path::new("/p/source/level/a1.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "../a2"), "../a2");
    }

    #[test]
    fn test_collapses_index_unless_spelled_out() {
        let mut probe = MockModuleProbe::new();
        probe
            .expect_probe()
            .returning(|p| match p.to_str() {
                Some("/p/mod") | Some("/p/mod/index") => Some(PathBuf::from("/p/mod/index.js")),
                _ => None,
            });
        let updater = updater_with(probe, Arc::new(CollectingSink::new()));
        let paths = map(&[("/p/mod/index.js", "/p/mod2/index.js")]);
        let ctx = RewriteContext::new(Path::new("/p/modules.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./mod"), "./mod2");
        assert_eq!(updater.update_source_path(&ctx, "./mod/index"), "./mod2/index");
    }

    #[test]
    fn test_round_trip_restores_original_text() {
        let updater = updater();
        let there = map(&[("/p/a.js", "/p/b.js")]);
        let back = map(&[("/p/b.js", "/p/a.js")]);
        let file = Path::new("/p/modules.js");

        for original in ["./a", "./a.js"] {
            let moved = updater.update_source_path(&RewriteContext::new(file, &there), original);
            let restored = updater.update_source_path(&RewriteContext::new(file, &back), &moved);
            assert_eq!(restored, original);
        }
    }

    #[test]
    fn test_unresolved_specifier_is_reported_and_kept() {
        let mut probe = MockModuleProbe::new();
        probe.expect_probe().returning(|_| None);
        let sink = Arc::new(CollectingSink::new());
        let updater = updater_with(probe, sink.clone());
        let paths = map(&[("/p/a.js", "/p/b.js")]);
        let ctx = RewriteContext::new(Path::new("/p/modules.js"), &paths);

        assert_eq!(updater.update_source_path(&ctx, "./missing"), "./missing");
        let reported = sink.take();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].kind, DiagnosticKind::UnresolvedImport);
    }

    #[test]
    fn test_text_paths_are_resolved_quietly() {
        let mut probe = MockModuleProbe::new();
        probe.expect_probe().returning(|_| None);
        let sink = Arc::new(CollectingSink::new());
        let updater = updater_with(probe, sink.clone());
        let paths = map(&[("/p/a.js", "/p/b.js")]);
        let ctx = RewriteContext::new(Path::new("/p/README.md"), &paths);

        // the naive join still matches the plan
        assert_eq!(updater.update_text_path(&ctx, "./a.js"), "./b.js");
        assert_eq!(updater.update_text_path(&ctx, "./nothing"), "./nothing");
        assert!(sink.is_empty());
    }

    proptest! {
        #[test]
        fn prop_bare_and_absolute_specifiers_are_fixed_points(
            bare in "[a-z@][a-z0-9_/-]{0,20}",
            absolute in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}(\\.js)?",
        ) {
            let mut probe = MockModuleProbe::new();
            probe.expect_probe().never();
            let updater = updater_with(probe, Arc::new(CollectingSink::new()));
            let paths = map(&[("/p/a.js", "/p/b.js")]);
            let ctx = RewriteContext::new(Path::new("/p/a.js"), &paths);

            for specifier in [bare.as_str(), absolute.as_str()] {
                let once = updater.update_source_path(&ctx, specifier);
                prop_assert_eq!(&once, specifier);
                prop_assert_eq!(updater.update_source_path(&ctx, &once), once.clone());
            }
        }
    }
}
