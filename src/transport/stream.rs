//! Line-delimited JSON event transport
//!
//! Reads one event per line from a file, FIFO, standard input or Unix socket.
//! Reading stops at end of input, which closes the feed cleanly. A file is read
//! once, not followed; use a FIFO or socket for a live feed.

use eyre::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::{Feed, FeedScope, FeedSender, Target};
use crate::config::{Config, RemoteConfig};
use crate::event::Event;

type Source = Box<dyn AsyncRead + Send + Unpin>;

/// Where the event lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Stdin,
    File(PathBuf),
    Unix(PathBuf),
}

impl Address {
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        if address.is_empty() {
            eyre::bail!("Remote address is empty");
        }
        if address == "-" {
            return Ok(Self::Stdin);
        }
        if let Some(path) = address.strip_prefix("unix:") {
            return Ok(Self::Unix(Config::expand_path(&PathBuf::from(path))));
        }
        Ok(Self::File(Config::expand_path(&PathBuf::from(address))))
    }

    fn open(&self) -> Result<Source> {
        match self {
            Address::Stdin => Ok(Box::new(tokio::io::stdin())),
            Address::File(path) => {
                let file = std::fs::File::open(path).context(format!("Failed to open {}", path.display()))?;
                Ok(Box::new(tokio::fs::File::from_std(file)))
            }
            #[cfg(unix)]
            Address::Unix(path) => {
                let stream = std::os::unix::net::UnixStream::connect(path)
                    .context(format!("Failed to connect to {}", path.display()))?;
                stream.set_nonblocking(true)?;
                Ok(Box::new(tokio::net::UnixStream::from_std(stream)?))
            }
            #[cfg(not(unix))]
            Address::Unix(path) => eyre::bail!("Unix sockets are not supported here: {}", path.display()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Stdin => f.write_str("-"),
            Address::File(path) => write!(f, "{}", path.display()),
            Address::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// A target whose feed is a stream of JSON lines
#[derive(Debug, Clone)]
pub struct StreamTarget {
    name: String,
    address: Address,
    project: String,
    multi_node: bool,
}

impl StreamTarget {
    pub fn from_remote(name: &str, remote: &RemoteConfig) -> Result<Self> {
        let address = Address::parse(&remote.address).context(format!("Invalid address for remote '{}'", name))?;
        Ok(Self {
            name: name.to_string(),
            address,
            project: remote.project.clone(),
            multi_node: remote.multi_node,
        })
    }
}

impl Target for StreamTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn is_multi_node(&self) -> bool {
        self.multi_node
    }

    fn open_feed(&self, scope: FeedScope) -> Result<Feed> {
        let source = self.address.open()?;
        let (sender, feed) = Feed::channel();
        log::debug!("Reading events for '{}' from {}", self.name, self.address);
        tokio::spawn(pump(source, scope, sender));
        Ok(feed)
    }
}

/// Forward decoded lines until the source ends or fails
async fn pump(source: Source, scope: FeedScope, sender: FeedSender) {
    let mut lines = BufReader::new(source).lines();
    let mut line_no = 0usize;

    let result = loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                line_no += 1;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let event: Event = match serde_json::from_str(trimmed) {
                    Ok(event) => event,
                    Err(e) => break Err(eyre::Report::new(e).wrap_err(format!("Invalid event on line {}", line_no))),
                };

                if !scope.includes(&event) {
                    continue;
                }

                if !sender.send(event).await {
                    log::debug!("Subscriber went away, stopping feed");
                    break Ok(());
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(eyre::Report::new(e).wrap_err("Failed to read from feed")),
        }
    };

    sender.close(result);
}
