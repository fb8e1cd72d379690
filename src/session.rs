//! Monitoring session
//!
//! Opens a feed on a [`Target`], renders every delivered event, and returns a single
//! terminal outcome.
//!
//! ## Flow
//!
//! ```text
//! open_feed(scope) ──► subscribe(types) ──► delivery task: next() → render() ──┐ first
//!                                      └──► wait task:     closed()  ──────────┴► outcome (capacity 1)
//! ```
//!
//! ## Rules
//! - The first signal wins: a render error or the feed's closure, whichever arrives first.
//!   Later signals are dropped by `try_send` on the single-slot channel.
//! - The wait task reports closure only after the delivery task has drained the stream.
//!   A panicked delivery task is reported as an error instead of the closure.
//! - Nothing is rendered after the outcome is taken.

use eyre::{Context, Result};
use std::io::Write;
use tokio::sync::mpsc;

use crate::options::RenderConfig;
use crate::render::Renderer;
use crate::transport::{FeedScope, Target};

pub struct Session<'a> {
    target: &'a dyn Target,
    config: &'a RenderConfig,
    color: bool,
}

impl<'a> Session<'a> {
    pub fn new(target: &'a dyn Target, config: &'a RenderConfig) -> Self {
        Self {
            target,
            config,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn scope(&self) -> FeedScope {
        if self.config.all_projects {
            FeedScope::AllProjects
        } else {
            FeedScope::Project(self.target.project().to_string())
        }
    }

    /// Run until the feed closes or an event cannot be rendered
    pub async fn run<W>(self, out: W) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        let scope = self.scope();
        log::info!("Opening event feed on '{}' ({:?})", self.target.name(), scope);

        let mut feed = self
            .target
            .open_feed(scope)
            .context(format!("Failed to open event feed on '{}'", self.target.name()))?;

        let mut stream = feed
            .subscribe(&self.config.type_filter)
            .context("Failed to register event handler")?;

        log::debug!(
            "Subscribed to {} as {} (types: {:?})",
            self.target.name(),
            self.config.format,
            self.config.type_filter
        );

        let mut renderer = Renderer::new(self.config, self.target.is_multi_node(), out).with_color(self.color);
        let (signal, mut outcome) = mpsc::channel::<Result<()>>(1);

        let delivery_signal = signal.clone();
        let delivery = tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if let Err(e) = renderer.render(&event) {
                    let e = e.wrap_err(format!("Failed to render {} event", event.event_type));
                    let _ = delivery_signal.try_send(Err(e));
                    return;
                }
            }
        });
        let delivery_abort = delivery.abort_handle();

        let waiter = tokio::spawn(async move {
            let closed = feed.closed().await;
            let outcome = match delivery.await {
                Ok(()) => closed,
                Err(e) if e.is_panic() => Err(eyre::eyre!("Event delivery task failed: {}", e)),
                Err(_) => closed,
            };
            let _ = signal.try_send(outcome);
        });

        let result = match outcome.recv().await {
            Some(result) => result,
            None => Err(eyre::eyre!("Session ended without an outcome")),
        };

        delivery_abort.abort();
        waiter.abort();

        match &result {
            Ok(()) => log::info!("Event feed on '{}' closed", self.target.name()),
            Err(e) => log::error!("Event feed on '{}' failed: {:#}", self.target.name(), e),
        }

        result
    }
}
