//! fastprobe - report the format and dimensions of remote images.
//!
//! Prints a JSON object mapping every URI to `{"type":..,"size":[w,h]}` or
//! `{"size":"failed"}`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use fastprobe::{Engine, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "fastprobe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image URIs to probe
    #[arg(required = true)]
    uris: Vec<String>,

    /// Per-URI deadline in seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Fetch one URI at a time with ranged reads
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Maximum simultaneous connections
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = EngineConfig::from_env();
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    if let Some(limit) = args.max_concurrency {
        config.max_concurrency = Some(limit);
    }
    if args.sequential {
        config.force_sequential = true;
    }

    let engine = Engine::with_config(config).context("Invalid engine configuration")?;
    let results = engine.batch(args.uris).await;

    let json = if args.pretty {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string(&results)
    }
    .context("Failed to serialize results")?;

    println!("{json}");
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
