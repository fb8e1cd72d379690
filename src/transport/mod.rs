//! Event feed transport boundary
//!
//! A [`Target`] opens a [`Feed`]; the feed hands out a single [`EventStream`] subscription
//! and reports how the connection ended.
//!
//! ```text
//! transport task ──► FeedSender ──[events]──► EventStream (type filtered) ──► session
//!                              └─[closed]───► Feed::closed()
//! ```
//!
//! Transports must end the event stream when the feed closes, so a subscriber sees every
//! delivered event before the closure result.

pub mod stream;

use eyre::Result;
use std::collections::BTreeSet;
use tokio::sync::{mpsc, oneshot};

use crate::event::Event;

pub use stream::StreamTarget;

/// Events buffered between the transport and the subscriber
const FEED_CAPACITY: usize = 128;

/// Which projects a feed covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    Project(String),
    AllProjects,
}

impl FeedScope {
    pub fn includes(&self, event: &Event) -> bool {
        match self {
            FeedScope::AllProjects => true,
            FeedScope::Project(project) => event.project.is_empty() || &event.project == project,
        }
    }
}

/// A remote system that can produce an event feed
pub trait Target: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Project used when the feed is not opened for all projects
    fn project(&self) -> &str;

    /// Whether the target spans several nodes
    fn is_multi_node(&self) -> bool;

    /// Open a live feed. Must be called from within a tokio runtime.
    fn open_feed(&self, scope: FeedScope) -> Result<Feed>;
}

/// Transport side of a feed
#[derive(Debug)]
pub struct FeedSender {
    events: mpsc::Sender<Event>,
    closed: oneshot::Sender<Result<()>>,
}

impl FeedSender {
    /// Deliver an event. Returns false once the subscriber has gone away.
    pub async fn send(&self, event: Event) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// End the feed, cleanly (`Ok`) or with a transport error
    pub fn close(self, result: Result<()>) {
        let FeedSender { events, closed } = self;
        drop(events);
        let _ = closed.send(result);
    }
}

/// Subscriber side of a feed
#[derive(Debug)]
pub struct Feed {
    events: Option<mpsc::Receiver<Event>>,
    closed: oneshot::Receiver<Result<()>>,
}

impl Feed {
    pub fn channel() -> (FeedSender, Feed) {
        let (events_tx, events_rx) = mpsc::channel(FEED_CAPACITY);
        let (closed_tx, closed_rx) = oneshot::channel();
        (
            FeedSender {
                events: events_tx,
                closed: closed_tx,
            },
            Feed {
                events: Some(events_rx),
                closed: closed_rx,
            },
        )
    }

    /// Register the single subscriber for this feed.
    ///
    /// Only events whose type is in `types` are delivered; an empty set means all types.
    pub fn subscribe(&mut self, types: &BTreeSet<String>) -> Result<EventStream> {
        let events = self
            .events
            .take()
            .ok_or_else(|| eyre::eyre!("Feed already has a subscriber"))?;

        Ok(EventStream {
            events,
            types: types.clone(),
        })
    }

    /// Wait for the feed to end
    pub async fn closed(self) -> Result<()> {
        match self.closed.await {
            Ok(result) => result,
            Err(_) => Err(eyre::eyre!("Feed terminated without reporting closure")),
        }
    }
}

/// Type-filtered stream of delivered events
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::Receiver<Event>,
    types: BTreeSet<String>,
}

impl EventStream {
    /// Next matching event, or `None` once the feed has closed
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            let event = self.events.recv().await?;
            if self.types.is_empty() || self.types.contains(&event.event_type) {
                return Some(event);
            }
        }
    }
}
