//! Command line entry point for relocate

use anyhow::Context;
use clap::Parser;
use relocate_config::{logging, AppConfig};
use relocate_core::{MoveRequest, QuoteStyle};
use relocate_foundation::{paths::absolutize, CollectingSink, DiagnosticSink, TracingSink};
use relocate_services::{find_project_root, MoveOptions, MoveReport, MoveService};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Exit code when some files could not be rewritten or moved
const EXIT_PARTIAL_FAILURE: u8 = 2;

/// Move files and directories and rewrite every relative import that
/// points at them.
#[derive(Parser, Debug)]
#[command(name = "relocate")]
#[command(about = "Move JavaScript/TypeScript modules and update the imports that reference them")]
#[command(version)]
struct Cli {
    /// Files or directories to move, followed by the destination
    #[arg(required = true, num_args = 2.., value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Skip files matching this gitignore-style pattern (repeatable)
    #[arg(long = "ignore-pattern", value_name = "PATTERN")]
    ignore_patterns: Vec<String>,

    /// Quote used for rewritten string literals: preserve, single or double
    #[arg(long)]
    quote: Option<QuoteStyle>,

    /// Also rewrite `global.require(...)` and `globalThis.require(...)`
    #[arg(long)]
    permissive_require: bool,

    /// Show what would change without writing or moving anything
    #[arg(long)]
    dry_run: bool,

    /// Project root (defaults to the nearest directory holding package.json)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/.relocate.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Number of files rewritten at the same time
    #[arg(long)]
    concurrency: Option<usize>,
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn print_text_report(report: &MoveReport, root: &Path) {
    let verb = if report.dry_run { "Would move" } else { "Moved" };
    println!("{} {} file(s)", verb, report.path_map.len());
    for (source, target) in report.path_map.iter() {
        println!(
            "  {} -> {}",
            display_relative(source, root),
            display_relative(target, root)
        );
    }

    println!(
        "{} {} specifier(s) in {} file(s), {} file(s) scanned",
        if report.dry_run { "Would rewrite" } else { "Rewrote" },
        report.rewrites,
        report.files_changed.len(),
        report.files_scanned
    );
    for changed in &report.files_changed {
        for edit in &changed.rewrites {
            println!(
                "  {}:{}  {} -> {}",
                display_relative(&changed.path, root),
                edit.line,
                edit.old_specifier,
                edit.new_specifier
            );
        }
    }

    if !report.diagnostics.is_empty() {
        println!("\n⚠️  Warnings:");
        for diagnostic in &report.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    if report.has_failures() {
        eprintln!("\n❌ Failed files:");
        for failure in &report.failures {
            eprintln!(
                "  {}: {}",
                display_relative(&failure.path, root),
                failure.error
            );
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;

    let root_diagnostics = CollectingSink::new();
    let root = match &cli.root {
        Some(root) => absolutize(&cwd, root),
        None => find_project_root(&cwd, &root_diagnostics),
    };

    let mut config = AppConfig::load(&root, cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.transform.ignore_patterns.extend(cli.ignore_patterns);
    if let Some(quote) = cli.quote {
        config.transform.quote = quote;
    }
    if cli.permissive_require {
        config.transform.permissive_require = true;
    }
    if let Some(concurrency) = cli.concurrency {
        config.transform.concurrency = concurrency;
    }
    config.validate()?;

    logging::initialize(&config);
    for diagnostic in root_diagnostics.take() {
        TracingSink.report(diagnostic);
    }
    debug!(root = %root.display(), cwd = %cwd.display(), "Starting relocate");

    let request = MoveRequest::from_args(cli.paths)
        .context("Expected at least one source followed by a target")?;
    let ctx = config.project_context(&root, &cwd);
    let options = MoveOptions::from_config(&config.transform).with_dry_run(cli.dry_run);

    let report = MoveService::new(ctx, options).execute(&request).await?;

    match cli.format.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => print_text_report(&report, &root),
    }

    if report.has_failures() {
        Ok(ExitCode::from(EXIT_PARTIAL_FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
