//! CLI definition and the `run` entry point.
//!
//! The command replays a captured player network through the full
//! lifecycle and prints each now-playing message as a JSON line on stdout.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::lifecycle::{self, Collaborators, ShutdownOutcome, Signals};
use crate::network::replay::ReplaySession;
use crate::publisher::ChannelSink;

/// Now-playing metadata for a network of media players
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Network capture to replay
    #[arg(long)]
    pub replay: PathBuf,

    /// Config file (defaults to the OS config directory)
    #[arg(short, long, env = "NOW_PLAYING_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Run the session until a termination signal arrives.
///
/// Fails only when the capture can't be loaded or the session can't be
/// brought online.
pub fn run(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let rt = Builder::new_current_thread().enable_all().build()?;

    rt.block_on(async {
        let mut signals = Signals::install()?;
        let session = Arc::new(ReplaySession::open(&cli.replay)?);
        info!(target: "cli", capture = %cli.replay.display(), "Replaying capture");

        let sink = Arc::new(ChannelSink::new());
        let (tx, rx) = mpsc::unbounded_channel();
        sink.attach(tx);
        tokio::spawn(print_messages(rx));

        let collaborators = Collaborators::from_config(&config.artwork).with_sink(sink);
        let shutdown = async move {
            signals.recv().await;
        };

        match lifecycle::run(session, &config, collaborators, shutdown).await? {
            ShutdownOutcome::TimedOut => warn!(target: "cli", "Exiting without a clean disconnect"),
            outcome => info!(target: "cli", ?outcome, "Shutdown complete"),
        }
        Ok::<_, anyhow::Error>(())
    })
}

async fn print_messages(mut rx: mpsc::UnboundedReceiver<String>) {
    let mut stdout = std::io::stdout();
    while let Some(message) = rx.recv().await {
        if let Err(e) = writeln!(stdout, "{}", message).and_then(|()| stdout.flush()) {
            warn!(target: "cli", "Failed to write to stdout: {}", e);
            return;
        }
    }
}
