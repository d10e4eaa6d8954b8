//! Session lifecycle.
//!
//! ```text
//! Offline -> Connecting -> Online -> Disconnecting -> Offline
//! ```
//!
//! Connecting runs four steps in order and aborts startup on the first
//! failure, before any listener is installed. Shutdown is best-effort: the
//! disconnect runs as its own task and we stop waiting for it after a
//! timeout, without cancelling it.

mod signals;

pub use signals::{Signal, Signals};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ArtworkConfig, Config};
use crate::decision::{EngineMode, FollowsMasterEngine, NowPlayingAdapter};
use crate::devices::{DeviceRegistry, DeviceStateStore, DeviceTracker};
use crate::enrichment::{CoverArchive, CoverArtClient, MusicBrainzClient, RecordingSearch};
use crate::error::{Error, Result, ResultExt};
use crate::events::EventDispatcher;
use crate::network::{NetworkError, NetworkSession, TrackDatabase};
use crate::pipeline::{MetadataPipeline, NowPlayingHandler};
use crate::publisher::{MetadataSink, NoopSink};

/// Where the session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Offline,
    Connecting,
    Online,
    Disconnecting,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Offline => "offline",
            Self::Connecting => "connecting",
            Self::Online => "online",
            Self::Disconnecting => "disconnecting",
        };
        f.write_str(name)
    }
}

fn transition(state: LifecycleState) {
    tracing::info!(target: "lifecycle", state = %state, "Lifecycle state changed");
}

/// How shutdown ended.
#[derive(Debug, Clone)]
pub enum ShutdownOutcome {
    /// The session was no longer connected
    Skipped,
    Disconnected,
    Failed(NetworkError),
    /// Gave up waiting; the disconnect may still complete in the background
    TimedOut,
}

/// External services the pipeline talks to.
pub struct Collaborators {
    pub search: Arc<dyn RecordingSearch>,
    pub archive: Arc<dyn CoverArchive>,
    pub sink: Arc<dyn MetadataSink>,
}

impl Collaborators {
    /// Real MusicBrainz and Cover Art Archive clients. Resolved tracks are
    /// discarded until a sink is set with [`Collaborators::with_sink`].
    pub fn from_config(config: &ArtworkConfig) -> Self {
        Self {
            search: Arc::new(MusicBrainzClient::new(config.musicbrainz_url.as_str(), &config.contact)),
            archive: Arc::new(CoverArtClient::new(config.coverart_url.as_str())),
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn MetadataSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// Bring a session online.
///
/// Fails on the first step that fails, or if the session still reports no
/// connection after connecting.
pub async fn connect(session: &dyn NetworkSession) -> Result<()> {
    transition(LifecycleState::Connecting);

    session
        .bring_online()
        .await
        .with_context("bringing the network online")?;
    session
        .autoconfigure_from_peers()
        .await
        .with_context("auto-configuring from peers")?;
    session.connect();

    if !session.is_connected() {
        return Err(Error::NotConnected);
    }
    Ok(())
}

/// Disconnect a session, waiting at most `timeout`.
pub async fn disconnect(session: Arc<dyn NetworkSession>, timeout: Duration) -> ShutdownOutcome {
    if !session.is_connected() {
        tracing::info!(target: "lifecycle", "Not connected, skipping disconnect");
        return ShutdownOutcome::Skipped;
    }

    let task = tokio::spawn(async move { session.disconnect().await });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!(target: "lifecycle", "Disconnected from player network");
            ShutdownOutcome::Disconnected
        }
        Ok(Ok(Err(e))) => {
            tracing::error!(target: "lifecycle", "Error during disconnect: {}", e);
            ShutdownOutcome::Failed(e)
        }
        Ok(Err(e)) => {
            tracing::error!(target: "lifecycle", "Disconnect task failed: {}", e);
            ShutdownOutcome::Failed(NetworkError::Disconnect(e.to_string()))
        }
        Err(_) => {
            tracing::error!(
                target: "lifecycle",
                timeout_secs = timeout.as_secs_f64(),
                "Timed out waiting for disconnect"
            );
            ShutdownOutcome::TimedOut
        }
    }
}

/// Run a session until `shutdown` resolves.
///
/// Builds the state table and pipeline, subscribes the tracker and the
/// decision adapter to the session's broadcasts, and processes events in
/// the background. Returns an error only if the session could not be
/// brought online.
pub async fn run<S: NetworkSession + 'static>(
    session: Arc<S>,
    config: &Config,
    collaborators: Collaborators,
    shutdown: impl Future<Output = ()>,
) -> Result<ShutdownOutcome> {
    if let Err(e) = connect(session.as_ref()).await {
        tracing::error!(target: "lifecycle", "Startup aborted: {}", e);
        transition(LifecycleState::Offline);
        return Err(e);
    }
    let events = session.take_events()?;

    let store = Arc::new(DeviceStateStore::new());
    let pipeline = Arc::new(MetadataPipeline::new(
        Arc::clone(&session) as Arc<dyn TrackDatabase>,
        collaborators.search,
        collaborators.archive,
        Arc::clone(&store),
        collaborators.sink,
        &config.artwork,
    ));

    let mut dispatcher = EventDispatcher::new();
    let on_now_playing = dispatcher.now_playing_callback();
    dispatcher.on_device(DeviceRegistry::new());
    dispatcher.on_status(DeviceTracker::new(Arc::clone(&store), Arc::clone(&pipeline)));
    dispatcher.on_status(NowPlayingAdapter::new(
        FollowsMasterEngine::new(EngineMode::FollowsMaster),
        on_now_playing,
    ));
    dispatcher.on_now_playing(NowPlayingHandler::new(pipeline));
    let listener = tokio::spawn(dispatcher.run(events));

    transition(LifecycleState::Online);
    shutdown.await;

    transition(LifecycleState::Disconnecting);
    let outcome = disconnect(session, config.network.shutdown_timeout()).await;
    listener.abort();
    transition(LifecycleState::Offline);

    Ok(outcome)
}
