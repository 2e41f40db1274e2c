//! Non-destructive message queue browsing.
//!
//! qbrowse connects to a broker, resolves a queue through a directory lookup,
//! and exposes the queue backlog as a lazy, read-only sequence. Nothing is
//! acknowledged or removed. Each browsed message can be decoded into an
//! HTML-escaped display string, whatever its body encoding.
//!
//! # Crate Structure
//!
//! - [`config`] - Endpoint resolution: identity to directory configuration
//! - [`session`] - Connection, session, and browser as one releasable unit
//! - [`enumerator`] - Lazy, forward-only iteration over the backlog
//! - [`decoder`] - Property listing, content classification, content rendering
//! - [`client`] - [`QueueBrowserClient`], tying the pieces together
//! - [`message`], [`broker`] - Re-exports of the lower layers
//!
//! # Example
//!
//! ```
//! use qbrowse::broker::MemoryBroker;
//! use qbrowse::message::Message;
//! use qbrowse::QueueBrowserClient;
//!
//! let broker = MemoryBroker::new();
//! broker.grant("alice", "key123");
//! broker.enqueue("orders", Message::text("hello"));
//!
//! let mut client = QueueBrowserClient::new(broker, "orders", "alice", "key123")?;
//! let mut contents = Vec::new();
//! for message in client.browse_queue()? {
//!     contents.push(qbrowse::decoder::content(&message?, &Default::default())?);
//! }
//! client.close_browser()?;
//! assert_eq!(contents, ["hello"]);
//! # Ok::<(), qbrowse::BrowseError>(())
//! ```

pub mod client;
pub mod config;
pub mod decoder;
pub mod enumerator;
pub mod error;
pub mod escape;
pub mod session;

pub use client::QueueBrowserClient;
pub use config::{resolve, AccessKey, BrowseIdentity, ClientConfig, ConnectionConfig};
pub use enumerator::Enumeration;
pub use error::{BrowseError, CloseError, ConfigError, Result};
pub use session::BrowseSession;

/// Re-export message types.
pub mod message {
    pub use qbrowse_message::*;
}

/// Re-export broker types.
pub mod broker {
    pub use qbrowse_broker::*;
}
