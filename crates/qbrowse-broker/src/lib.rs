//! Broker client contract and directory lookup.
//!
//! Provides the pieces a browsing client needs to reach a queue:
//! - [`Directory`] resolves connection factories and queues from key/value bindings
//! - [`Broker`], [`Connection`], [`Session`], [`QueueBrowser`] model the client handles
//! - [`MemoryBroker`] is an in-process broker implementing that contract
//!
//! The broker wire protocol itself is not part of this crate.

pub mod directory;
pub mod endpoint;
pub mod error;
pub mod memory;
pub mod traits;

pub use directory::{
    ConnectionFactory, Directory, CONNECTION_FACTORY_PREFIX, INITIAL_CONTEXT_FACTORY,
    PROPERTIES_DIRECTORY_FACTORY, QUEUE_PREFIX,
};
pub use endpoint::{BrokerEndpoint, BrokerUrl, UrlError};
pub use error::{BrokerError, DirectoryError, Result};
pub use memory::{FaultPoint, HandleCounts, MemoryBroker};
pub use traits::{AckMode, Broker, Connection, Queue, QueueBrowser, Session};
