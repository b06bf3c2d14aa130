use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use mfds_cli::config::{FileConfig, REGISTRY_ENV_VAR};
use mfds_cli::output::{OutputFormat, write_report, write_unmatched};
use mfds_core::{RunSummary, Translations, compute_aggregates, english_keys, reconcile};
use mfds_ingest::{Registry, read_input_rows, read_translations};

use crate::cli::{IngredientArgs, KeysArgs, OutputFormatArg, RunArgs};
use crate::summary::{group_table, print_run_summary};

pub fn run_reconcile(args: &RunArgs, config: &FileConfig) -> Result<RunSummary> {
    let span = info_span!("run", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let options = config.reconcile_options();
    let registry = load_registry(args.registry.as_deref(), config)?;
    let rows = read_input_rows(&args.input)
        .with_context(|| format!("read input: {}", args.input.display()))?;
    let translations = match &args.translations {
        Some(path) => read_translations(path)
            .with_context(|| format!("read translations: {}", path.display()))?,
        None => Translations::new(),
    };

    let progress = progress_bar(!args.no_progress);
    let report = reconcile(
        &rows,
        &registry,
        registry.records(),
        &translations,
        &options,
        |done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        },
    );
    progress.finish_and_clear();

    let format = match args.format {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
    };
    write_report(&report, format, args.output.as_deref())?;
    if let Some(path) = &args.unmatched {
        write_unmatched(&report.unmatched_rows, format, path)?;
    }

    info!(
        rows = report.summary.rows,
        matched = report.summary.matched,
        unmatched = report.summary.unmatched_total(),
        duration_ms = start.elapsed().as_millis(),
        "reconciliation complete"
    );
    print_run_summary(&report.summary, &registry);
    Ok(report.summary)
}

pub fn run_keys(args: &KeysArgs, config: &FileConfig) -> Result<()> {
    let options = config.reconcile_options();
    let rows = read_input_rows(&args.input)
        .with_context(|| format!("read input: {}", args.input.display()))?;
    for key in english_keys(&rows, &options.cleaner) {
        println!("{key}");
    }
    Ok(())
}

pub fn run_ingredient(args: &IngredientArgs, config: &FileConfig) -> Result<()> {
    let registry = load_registry(args.registry.as_deref(), config)?;
    let found = registry.search_by_ingredient(&args.query);
    if found.is_empty() {
        println!("No registry records mention \"{}\".", args.query);
        return Ok(());
    }

    // Statistics always cover the whole pool, not just the search hits.
    let aggregates = compute_aggregates(&[], registry.records());
    let keys: BTreeSet<String> = found
        .iter()
        .map(|candidate| aggregates.group_key(candidate))
        .filter(|key| !key.is_empty())
        .collect();
    println!(
        "{} record(s) matched \"{}\" across {} ingredient group(s)",
        found.len(),
        args.query,
        keys.len()
    );
    let groups = keys.iter().filter_map(|key| aggregates.get(key));
    println!("{}", group_table(groups));
    Ok(())
}

fn load_registry(flag: Option<&Path>, config: &FileConfig) -> Result<Registry> {
    let path = resolve_registry(flag, config)?;
    Registry::load(&path).with_context(|| format!("load registry: {}", path.display()))
}

fn resolve_registry(flag: Option<&Path>, config: &FileConfig) -> Result<PathBuf> {
    config
        .registry_path(flag, std::env::var_os(REGISTRY_ENV_VAR))
        .ok_or_else(|| {
            anyhow!(
                "no registry given: pass --registry, set {REGISTRY_ENV_VAR}, \
                 or set registry.path in the config file"
            )
        })
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} keys",
    ) {
        bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    bar
}
