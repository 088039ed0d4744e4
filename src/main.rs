/*!
 * Command-line interface for ctxpack
 */

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctxpack::config::{Args, Config};
use ctxpack::report::{GenerationReport, ModelTokens, ReportFormat, Reporter};
use ctxpack::scanner::Scanner;
use ctxpack::selection::SelectionModel;
use ctxpack::tokenizer::create_tokenizer;
use ctxpack::writer::ContextWriter;
use ctxpack::CtxError;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "ctxpack", &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_args(args);
    init_logging(config.verbose);
    config.validate()?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} ⏱️  {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📂 Scanning");
    let progress = Arc::new(progress);

    let start_time = Instant::now();

    let scanner = Scanner::new(config.clone(), Arc::clone(&progress));
    let scan = scanner.scan()?;
    if !scan.is_complete() {
        warn!(diagnostic = %scan.diagnostic, "scan did not complete normally");
    }

    let mut selection = SelectionModel::new(scan.entries);
    if !config.only_paths.is_empty() {
        selection.select_only(config.only_paths.as_slice())?;
    }
    for path in &config.exclude_paths {
        selection.toggle(path, false)?;
    }

    if config.list {
        progress.finish_and_clear();
        if config.json {
            let listing =
                serde_json::to_string_pretty(selection.entries()).map_err(CtxError::from)?;
            println!("{}", listing);
        } else {
            let reporter = Reporter::new(ReportFormat::ConsoleTable);
            println!("{}", reporter.entries_table(selection.entries()));
            println!("{}", scan.diagnostic);
        }
        return Ok(());
    }

    progress.set_prefix("📝 Generating");
    let writer = ContextWriter::new(config.clone(), Arc::clone(&progress));
    let generation = writer.generate(
        &config.target_dir,
        selection.entries(),
        config.base_name.as_deref(),
    );
    progress.finish_and_clear();
    println!("{}", scan.diagnostic);

    let generation = generation?;
    let mut report = GenerationReport::new(&generation, start_time.elapsed());

    if let Some(model) = config.model {
        match create_tokenizer(model).and_then(|tokenizer| {
            let tokens = tokenizer.count_tokens(&generation.document)?;
            Ok((tokens, tokenizer.model_context_window()))
        }) {
            Ok((tokens, context_window)) => {
                report.model_tokens = Some(ModelTokens {
                    model,
                    tokens,
                    context_window,
                })
            }
            Err(e) => warn!(%model, error = %e, "token counting failed"),
        }
    }

    println!("{}", generation.message);
    Reporter::new(ReportFormat::ConsoleTable).print_report(&report);

    Ok(())
}

/// Log to stderr, honoring RUST_LOG when set
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "ctxpack=debug" } else { "ctxpack=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
