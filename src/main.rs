//! wslocate CLI
//!
//! Opens the search window by default; `search` and `reveal` run the same
//! pipeline from a terminal.

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wslocate::{
    bridge, BridgeConfig, Dispatch, Dispatcher, Inbox, InboxMessage, LocateError, SearchOptions,
    SearchOutcome, SearchRequest, SystemRunner, POLL_INTERVAL,
};

/// wslocate - search the WSL locate index from Windows
#[derive(Parser)]
#[command(name = "wslocate")]
#[command(author = "wslocate Contributors")]
#[command(version)]
#[command(about = "Search the locate index inside WSL and reveal hits in Explorer", long_about = None)]
struct Cli {
    /// WSL distribution to use (default: the default distribution)
    #[arg(short, long, global = true)]
    distro: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the search window (default)
    Gui,

    /// Search the index and print matching paths
    Search {
        /// Search term (use -- before the term if it starts with -)
        #[arg(allow_hyphen_values = true)]
        term: String,

        /// Match case exactly (locate runs with --ignore-case otherwise)
        #[arg(long)]
        case_sensitive: bool,

        /// Include paths that no longer exist (locate runs with --existing otherwise)
        #[arg(long)]
        all: bool,

        /// Match against the file name only
        #[arg(long)]
        basename: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Translate a WSL path and select it in Explorer
    Reveal {
        /// Path as printed by locate, e.g. /mnt/c/Users/me/report.docx
        path: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// `search --output json` document
#[derive(Serialize)]
struct SearchReport<'a> {
    term: &'a str,
    ignore_case: bool,
    existing_only: bool,
    basename_only: bool,
    count: usize,
    paths: &'a [String],
    elapsed_seconds: f64,
}

fn main() {
    // Initialize logging
    wslocate::logging::init();
    wslocate::logging::info("MAIN", &format!("wslocate {} starting up", wslocate::VERSION));

    let cli = Cli::parse();
    let config = BridgeConfig::with_distribution(cli.distro);

    let result = match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => wslocate::gui::run(config),

        Commands::Search {
            term,
            case_sensitive,
            all,
            basename,
            output,
        } => {
            let options = SearchOptions {
                ignore_case: !case_sensitive,
                existing_only: !all,
                basename_only: basename,
            };
            cmd_search(config, &term, options, output)
        }

        Commands::Reveal { path } => cmd_reveal(&config, &path),
    };

    if let Err(e) = result {
        wslocate::logging::error("MAIN", &e.to_string());
        eprintln!("{} {}", style("Error:").red().bold(), e);
        if !e.is_user_error() {
            if let Some(path) = wslocate::logging::log_path() {
                eprintln!("{} {}", style("Log:").dim(), path.display());
            }
        }
        std::process::exit(exit_code(&e));
    }
}

/// 2 for bad input, 1 for everything that went wrong while running
fn exit_code(error: &LocateError) -> i32 {
    if error.is_user_error() {
        2
    } else {
        1
    }
}

/// Search command implementation
///
/// Goes through the same dispatcher and inbox as the window, waiting on the inbox
/// in short steps so the spinner keeps moving.
fn cmd_search(config: BridgeConfig, term: &str, options: SearchOptions, output: OutputFormat) -> wslocate::Result<()> {
    let request = SearchRequest::new(1, term, options)?;
    let inbox = Inbox::new();
    let dispatcher = Dispatcher::new(Arc::new(SystemRunner), config, inbox.sender());

    let start = Instant::now();
    let spinner = if output == OutputFormat::Text {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Searching for '{}'...", term));
        pb.enable_steady_tick(POLL_INTERVAL);
        Some(pb)
    } else {
        None
    };

    dispatcher.dispatch(request);

    let outcome = loop {
        match inbox.recv_timeout(Duration::from_secs(1)) {
            Some(InboxMessage::Search { outcome, .. }) => break outcome,
            Some(InboxMessage::Reveal(_)) | None => continue,
        }
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let paths = match outcome {
        SearchOutcome::Results(paths) => paths,
        SearchOutcome::Failure(message) => return Err(LocateError::SearchFailed(message)),
    };

    match output {
        OutputFormat::Json => {
            let report = SearchReport {
                term,
                ignore_case: options.ignore_case,
                existing_only: options.existing_only,
                basename_only: options.basename_only,
                count: paths.len(),
                paths: &paths,
                elapsed_seconds: start.elapsed().as_secs_f64(),
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| LocateError::SearchFailed(format!("could not encode results: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for path in &paths {
                println!("{}", path);
            }
            eprintln!(
                "{} Found {} results in {}",
                style("✓").green().bold(),
                style(paths.len()).green(),
                style(HumanDuration(start.elapsed())).cyan()
            );
        }
    }

    Ok(())
}

/// Reveal command implementation
fn cmd_reveal(config: &BridgeConfig, path: &str) -> wslocate::Result<()> {
    let host_path = bridge::reveal_in_explorer(&SystemRunner, config, path)?;
    println!(
        "{} {} {}",
        style("→").cyan().bold(),
        style(path).yellow(),
        style(host_path).cyan()
    );
    Ok(())
}
