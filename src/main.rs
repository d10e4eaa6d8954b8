//! Now Playing - live track metadata for a network of media players.
//!
//! Replays a captured player network and prints each now-playing track,
//! with its artwork, as a JSON line.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use now_playing::cli;
use now_playing::config::{self, LoadNote};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let (config, notes) = config::load(args.config.as_deref());

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("now_playing=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    for note in notes {
        match note {
            LoadNote::Info(message) => tracing::info!(target: "config", "{}", message),
            LoadNote::Warning(message) => tracing::warn!(target: "config", "{}", message),
        }
    }

    cli::run(&args, config)
}
