//! tattle: report which running applications display a file, and
//! optionally raise the one that does.
//!
//! Exit codes: 0 on success with zero or more matches printed; 2 when the
//! path cannot be resolved; 1 when reveal was requested but there is not
//! exactly one matching application, or the reveal action itself fails.

mod output;

use clap::Parser;
use tattle_core::{reveal, DetectionOptions, FileUsageReport, HeuristicRegistry, Platform};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tattle")]
#[command(about = "Report which running applications display a file")]
#[command(version)]
struct Cli {
    /// File path or file:// URL to look up
    #[arg(value_name = "PATH")]
    path: String,

    /// Output encoding
    #[arg(long, value_enum, default_value_t = output::Format::Text)]
    format: output::Format,

    /// Raise and focus the single application displaying the file
    #[arg(short = 'R', long)]
    reveal: bool,

    /// Print the per-heuristic debug trail to stderr
    #[arg(long)]
    debug: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let platform = Platform::system();
    let registry = HeuristicRegistry::standard(&platform);
    let options = DetectionOptions {
        include_debug: cli.debug,
    };

    let report = match FileUsageReport::resolve(&cli.path, &platform, &registry, &options) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("tattle: {err}");
            std::process::exit(2);
        }
    };
    tracing::debug!(path = %report.target, matches = report.apps.len(), "resolved");

    if cli.debug {
        output::print_debug_trail(&report);
    }

    if cli.reveal {
        if let Err(err) = reveal::reveal_only_match(&report, &registry, &platform) {
            eprintln!("tattle: {err}");
            std::process::exit(1);
        }
    }

    if let Err(err) = output::render(&report, cli.format) {
        eprintln!("tattle: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let debug_enabled = std::env::var("TATTLE_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TATTLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
