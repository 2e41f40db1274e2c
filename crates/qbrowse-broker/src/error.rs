
use crate::endpoint::UrlError;

/// Errors raised by broker handles (connection, session, browser).
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The broker could not be reached.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// The broker rejected the user name or access key.
    #[error("authentication failed for user {user}")]
    Authentication { user: String },

    /// The broker does not know the queue a browser was requested for.
    #[error("queue not found on broker: {0}")]
    QueueNotFound(String),

    /// Messages were requested before the connection was started.
    #[error("connection not started")]
    NotStarted,

    /// The handle, or the connection it belongs to, has been closed.
    #[error("handle closed")]
    Closed,

    /// A broker operation failed.
    #[error("{operation} failed: {reason}")]
    Operation {
        operation: &'static str,
        reason: String,
    },
}

/// Errors raised while resolving names through a [`crate::Directory`].
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The environment does not name a directory factory.
    #[error("no directory factory configured")]
    MissingFactory,

    /// The named directory factory is not available.
    #[error("unknown directory factory: {0}")]
    UnknownFactory(String),

    /// A connection-factory binding holds an unusable broker URL.
    #[error("malformed broker URL for binding {binding}: {source}")]
    MalformedUrl {
        binding: String,
        #[source]
        source: UrlError,
    },

    /// Nothing is bound under the name.
    #[error("name not bound: {0}")]
    NameNotFound(String),

    /// The name is bound to a different kind of object.
    #[error("{name} is not a {expected}")]
    WrongBindingType { name: String, expected: &'static str },
}

pub type Result<T> = std::result::Result<T, BrokerError>;
