//! Headline grouping runner
//!
//! Loads the feeds listed in an RSS file, groups their headlines into topics
//! and writes the visualization snapshot. Run once, or as a daemon.
//!
//! ```sh
//! headlines --rss-file rss.txt --s3
//! headlines --rss-file rss.txt --daemon --debug
//! ```

use std::path::PathBuf;

use clap::Parser;
use headline_core::VISUALIZATION_VERSION;
use headline_services::{run, run_daemon, PipelineConfig};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "headlines", version, about = "Group news headlines into topics")]
struct Cli {
    /// File with one feed URL per line
    #[arg(long, default_value = "rss.txt")]
    rss_file: PathBuf,

    /// Keep running, waiting HEADLINES_DAEMON_WAIT_MINUTES between runs
    #[arg(long)]
    daemon: bool,

    /// Publish the snapshot to S3
    #[arg(long)]
    s3: bool,

    /// Log top words and groups, and write the group dump
    #[arg(long)]
    debug: bool,
}

/// Log filter used when `RUST_LOG` is unset
///
/// Debug mode opens up the grouping crate so its word and group dumps show.
fn default_filter(debug: bool) -> String {
    if debug {
        "info,headline_cli=debug,headline_grouping=debug".to_string()
    } else {
        "info,headline_cli=debug".to_string()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env()?;
    if cli.debug {
        config.debug = true;
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(config.debug))),
        )
        .init();

    debug!(?cli, "Parsed arguments");

    info!(
        "Starting headlines v{} (similarity: {}, labels: {})",
        VISUALIZATION_VERSION, config.similarity_strategy, config.label_strategy
    );

    if cli.daemon {
        run_daemon(&config, cli.rss_file, cli.s3).await?;
    } else {
        let summary = run(&config, &cli.rss_file, cli.s3).await?;
        info!(
            "Wrote {} ({} articles)",
            summary.files.visualization.display(),
            summary.articles
        );
    }

    Ok(())
}
