mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use ipo_core::DEFAULT_MIN_SCORE;
use ipo_logging::{ipo_error, ipo_warn};
use log::LevelFilter;

use crate::config::{AppConfig, DEFAULT_CONFIG_FILENAME};

/// Search IPO listings on ipoplatform.com and extract their details.
#[derive(Parser, Debug)]
#[command(name = "ipo_scout", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (RON); defaults apply when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the category listings and save the company index
    BuildIndex,
    /// Rank indexed companies by name similarity
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,
    },
    /// Fetch and extract the detail pages of the best matches
    Details {
        query: String,
        /// Number of top matches to fetch
        #[arg(long, default_value_t = 1)]
        top: usize,
        /// Print the summary without writing record files
        #[arg(long)]
        no_save: bool,
    },
    /// Run field extraction on a saved listing page
    Extract {
        html_file: PathBuf,
        /// Record file to write; defaults to `<stem>_data.json` in the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pull arbitrary elements out of a saved page with CSS selectors
    Select {
        html_file: PathBuf,
        /// CSS selector, optionally ending in `@attr`; repeat for several fields
        #[arg(short, long = "selector", required = true)]
        selectors: Vec<String>,
        /// Label for the selector at the same position
        #[arg(short, long = "label")]
        labels: Vec<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Directory for the result files; defaults to the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// File name for the results instead of a timestamped one
        #[arg(long)]
        filename: Option<String>,
    },
    /// List categories with their company counts
    Categories,
    /// Show index statistics
    Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Txt,
    Both,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_issue) = match config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);
    if let Some(err) = config_issue {
        ipo_warn!("Using default configuration: {err}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ipo_error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::BuildIndex => commands::build_index(config),
        Command::Search {
            query,
            limit,
            min_score,
        } => commands::search(config, &query, limit, min_score),
        Command::Details {
            query,
            top,
            no_save,
        } => commands::details(config, &query, top, !no_save),
        Command::Extract { html_file, output } => {
            commands::extract(config, &html_file, output.as_deref())
        }
        Command::Select {
            html_file,
            selectors,
            labels,
            format,
            output,
            filename,
        } => {
            let formats = match format {
                OutputFormat::Json => vec![ipo_engine::SelectionFormat::Json],
                OutputFormat::Txt => vec![ipo_engine::SelectionFormat::Text],
                OutputFormat::Both => vec![
                    ipo_engine::SelectionFormat::Json,
                    ipo_engine::SelectionFormat::Text,
                ],
            };
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            commands::select(
                &html_file,
                &selectors,
                &labels,
                &formats,
                &output_dir,
                filename.as_deref(),
            )
        }
        Command::Categories => commands::categories(config),
        Command::Stats => commands::stats(config),
    }
}
