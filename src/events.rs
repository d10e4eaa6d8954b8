//! Typed event dispatcher.
//!
//! Network events fan out to subscribers on three topics: device joins,
//! status broadcasts and now-playing decisions. Subscribers on a topic are
//! notified synchronously, in subscription order, for every event, so each
//! one sees broadcasts in network-arrival order. Long-running work is
//! spawned by the subscriber itself and awaited in [`Subscriber::settle`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.on_status(tracker);
//! dispatcher.on_status(NowPlayingAdapter::new(engine, dispatcher.now_playing_callback()));
//! dispatcher.on_now_playing(NowPlayingHandler::new(pipeline));
//! tokio::spawn(dispatcher.run(session.take_events()?));
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::decision::NowPlaying;
use crate::model::{Device, StatusBroadcast};
use crate::network::NetworkEvent;

/// Receives events of one type.
#[async_trait]
pub trait Subscriber<E>: Send {
    /// Handle one event. Must not block.
    fn notify(&mut self, event: &E);

    /// Wait for work started by earlier notifications to finish.
    async fn settle(&mut self) {}
}

/// Ordered subscriber list for one event type.
pub struct Topic<E> {
    subscribers: Vec<Box<dyn Subscriber<E>>>,
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E> Topic<E> {
    pub fn subscribe(&mut self, subscriber: impl Subscriber<E> + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&mut self, event: &E) {
        for subscriber in &mut self.subscribers {
            subscriber.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    async fn settle(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber.settle().await;
        }
    }
}

/// Routes network events and now-playing decisions to subscribers.
pub struct EventDispatcher {
    devices: Topic<Device>,
    statuses: Topic<StatusBroadcast>,
    now_playing: Topic<NowPlaying>,
    next_sequence: u64,
    decisions_tx: mpsc::UnboundedSender<NowPlaying>,
    decisions_rx: Option<mpsc::UnboundedReceiver<NowPlaying>>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (decisions_tx, decisions_rx) = mpsc::unbounded_channel();
        Self {
            devices: Topic::default(),
            statuses: Topic::default(),
            now_playing: Topic::default(),
            next_sequence: 1,
            decisions_tx,
            decisions_rx: Some(decisions_rx),
        }
    }

    /// Callback that feeds a decision back into the now-playing topic.
    pub fn now_playing_callback(&self) -> impl FnMut(NowPlaying) + Send + 'static {
        let tx = self.decisions_tx.clone();
        move |event| {
            // Only fails once the dispatcher is gone
            let _ = tx.send(event);
        }
    }

    pub fn on_device(&mut self, subscriber: impl Subscriber<Device> + 'static) {
        self.devices.subscribe(subscriber);
    }

    pub fn on_status(&mut self, subscriber: impl Subscriber<StatusBroadcast> + 'static) {
        self.statuses.subscribe(subscriber);
    }

    pub fn on_now_playing(&mut self, subscriber: impl Subscriber<NowPlaying> + 'static) {
        self.now_playing.subscribe(subscriber);
    }

    /// Route one network event, stamping statuses with their arrival order.
    pub fn dispatch(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::DeviceConnected(device) => self.devices.publish(&device),
            NetworkEvent::Status(mut status) => {
                status.sequence = self.next_sequence;
                self.next_sequence += 1;
                self.statuses.publish(&status);
            }
        }
    }

    /// Dispatch events until the network stream ends, then let every
    /// subscriber finish its outstanding work.
    ///
    /// Pending now-playing decisions are delivered before the next network
    /// event is taken.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<NetworkEvent>) {
        let Some(mut decisions) = self.decisions_rx.take() else {
            return;
        };

        loop {
            tokio::select! {
                biased;
                Some(decision) = decisions.recv() => self.now_playing.publish(&decision),
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }

        while let Ok(decision) = decisions.try_recv() {
            self.now_playing.publish(&decision);
        }

        tracing::info!(target: "events", "Network event stream closed");
        self.statuses.settle().await;
        self.now_playing.settle().await;
        self.devices.settle().await;
    }
}
