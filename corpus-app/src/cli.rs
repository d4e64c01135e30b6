use std::path::PathBuf;

use clap::{Parser, Subcommand};
use corpus_common::Category;

#[derive(Debug, Parser)]
#[command(name = "corpus", version, about = "Arabic medical text corpus builder")]
pub struct Cli {
    /// YAML configuration file; `corpus.yaml` is used when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk listing pages and append new detail addresses to the link ledger.
    Collect {
        #[arg(long)]
        category: Category,
        #[arg(long, default_value_t = 1000)]
        max_pages: u32,
        #[arg(long)]
        links_file: Option<String>,
    },
    /// Fetch every ledger address not yet in the corpus store.
    Download {
        #[arg(long)]
        links_file: Option<String>,
        #[arg(long)]
        corpus_file: Option<String>,
    },
    /// Normalize the corpus store into `processed/`.
    Clean {
        #[arg(long)]
        corpus_file: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Print corpus statistics as JSON.
    Stats {
        #[arg(long)]
        corpus_file: Option<String>,
    },
    /// Collect, download, then print statistics.
    Run {
        #[arg(long)]
        category: Category,
        #[arg(long, default_value_t = 1000)]
        max_pages: u32,
    },
}
