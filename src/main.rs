use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use build_gh_pages::config::{split_unknown_options, Cli, Config};
use build_gh_pages::error::PublishError;
use build_gh_pages::publisher::publish;
use build_gh_pages::rewriter::{rewrite_files, FileOutcome, RewriteStatus};
use build_gh_pages::scanner::collect_candidates;

fn main() -> ExitCode {
    let (args, ignored) = split_unknown_options(std::env::args_os());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version come through here too
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);
    for arg in &ignored {
        log::warn!("Ignoring unrecognized argument {}", arg.to_string_lossy());
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e
                .downcast_ref::<PublishError>()
                .is_some_and(PublishError::is_usage)
            {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_cli(cli)?;
    println!("{config}");

    let start = Instant::now();

    let tree = publish(&config).context("Failed to publish site tree")?;

    let files = collect_candidates(&tree.root, &config.extensions)
        .with_context(|| format!("Failed to scan {}", tree.root.display()))?;
    log::debug!(
        "{} candidate file(s) under {}",
        files.len(),
        tree.root.display()
    );

    // Per-file log lines replace the bar in verbose mode
    let progress = if config.verbose {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };

    let summary = rewrite_files(&files, &config.root_prefix, |outcome| {
        progress.inc(1);
        progress.suspend(|| report(outcome));
    });
    progress.finish_and_clear();

    println!(
        "Rewrote {} of {} file(s), replaced {} symbol(s) in {:.2}s",
        summary.files_rewritten,
        summary.files_scanned,
        summary.replacements,
        start.elapsed().as_secs_f64()
    );

    // Skipped files are reported, not fatal
    if !summary.failures.is_empty() {
        println!("Skipped {} file(s):", summary.failures.len());
        for failure in &summary.failures {
            println!("  {}", failure.path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report(outcome: &FileOutcome) {
    let path = outcome.path.display();
    match &outcome.status {
        RewriteStatus::Rewritten(count) => {
            log::info!("Scanning done for {path}, replaced {count} symbols");
        }
        RewriteStatus::NoMatches => log::debug!("Scanning done for {path}, nothing to replace"),
        RewriteStatus::Failed(e) => log::warn!("Skipping {path}: {}", e.chain_message()),
    }
}
