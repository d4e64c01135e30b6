use anyhow::{Context, Result};
use clap::Parser;
use corpus_common::observability::{LOG_DIR_ENV, LogConfig, LogFormat, init_logging};
use corpus_config::{CorpusConfig, CorpusConfigLoader, LogEncoding};
use corpus_store::{CorpusStats, clean_corpus, corpus_stats};
use corpus_web::{RunContext, collect_links, download_content};

use cli::{Cli, Command};
mod cli;

const DEFAULT_CONFIG_FILE: &str = "corpus.yaml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let loader = match &cli.config {
        Some(path) => CorpusConfigLoader::new().with_file(path),
        None => CorpusConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg: CorpusConfig = loader.load().context("loading configuration")?;
    if let Some(dir) = cli.data_dir.clone() {
        cfg.data_dir = dir;
    }

    let log_path = init_logging(log_config(&cfg))?;

    let ctx = RunContext::from_config(&cfg).context("building run context")?;
    ctx.layout.ensure().context("preparing data directory")?;
    tracing::info!(log = %log_path.display(), data_dir = %cfg.data_dir.display(), "corpus.start");

    dispatch(&ctx, &cfg, cli.command).await
}

fn log_config(cfg: &CorpusConfig) -> LogConfig {
    LogConfig {
        // CORPUS_LOG_DIR takes precedence over the data directory
        log_dir: std::env::var_os(LOG_DIR_ENV)
            .is_none()
            .then(|| cfg.data_dir.clone()),
        emit_stderr: cfg.log.stderr,
        format: match cfg.log.format {
            LogEncoding::Text => LogFormat::Text,
            LogEncoding::Json => LogFormat::Json,
        },
        ..LogConfig::default()
    }
}

async fn dispatch(ctx: &RunContext, cfg: &CorpusConfig, command: Command) -> Result<()> {
    match command {
        Command::Collect {
            category,
            max_pages,
            links_file,
        } => {
            let links_file = links_file.unwrap_or_else(|| cfg.files.links.clone());
            let report = collect_links(ctx, category, max_pages, &links_file)
                .await
                .context("link collection failed")?;
            println!(
                "collected {} links ({} new, {} pages, {} errors)",
                report.links.len(),
                report.new_links.len(),
                report.pages_visited,
                report.errors
            );
        }
        Command::Download {
            links_file,
            corpus_file,
        } => {
            let links_file = links_file.unwrap_or_else(|| cfg.files.links.clone());
            let corpus_file = corpus_file.unwrap_or_else(|| cfg.files.corpus.clone());
            let report = download_content(ctx, &links_file, &corpus_file)
                .await
                .context("content download failed")?;
            println!(
                "downloaded {} articles ({} errors, {} records stored)",
                report.processed,
                report.errors,
                report.records.len()
            );
        }
        Command::Clean {
            corpus_file,
            output,
        } => {
            let input = ctx
                .layout
                .raw_file(&corpus_file.unwrap_or_else(|| cfg.files.corpus.clone()));
            let output = ctx
                .layout
                .processed_file(&output.unwrap_or_else(|| cfg.files.cleaned.clone()));
            let written = clean_corpus(&input, &output).context("cleaning corpus failed")?;
            println!("cleaned {written} records into {}", output.display());
        }
        Command::Stats { corpus_file } => {
            let path = ctx
                .layout
                .raw_file(&corpus_file.unwrap_or_else(|| cfg.files.corpus.clone()));
            // unreadable store: already logged, report an empty object
            match corpus_stats(&path) {
                Some(stats) => print_stats(&stats)?,
                None => println!("{{}}"),
            }
        }
        Command::Run {
            category,
            max_pages,
        } => {
            let collected = collect_links(ctx, category, max_pages, &cfg.files.links)
                .await
                .context("link collection failed")?;
            tracing::info!(
                links = collected.links.len(),
                new = collected.new_links.len(),
                "corpus.collected"
            );

            let downloaded = download_content(ctx, &cfg.files.links, &cfg.files.corpus)
                .await
                .context("content download failed")?;
            tracing::info!(
                processed = downloaded.processed,
                errors = downloaded.errors,
                "corpus.downloaded"
            );

            let stats = CorpusStats::from_records(&downloaded.records);
            print_stats(&stats)?;
        }
    }
    Ok(())
}

fn print_stats(stats: &CorpusStats) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}
