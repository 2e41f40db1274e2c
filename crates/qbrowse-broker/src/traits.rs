use qbrowse_message::Message;

use crate::endpoint::BrokerUrl;
use crate::error::Result;

/// How a session acknowledges consumed messages.
///
/// Browsers never consume, but a session still needs a valid mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    #[default]
    Auto,
    Client,
    DupsOk,
}

/// A queue destination, as bound in a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Queue {
    name: String,
}

impl Queue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A broker reachable through connection URLs.
pub trait Broker {
    type Connection: Connection;

    /// Open a physical connection, authenticating with the URL's credentials.
    fn connect(&self, url: &BrokerUrl) -> Result<Self::Connection>;
}

/// An open connection to a broker.
///
/// Nothing is delivered to browsers until [`Connection::start`] is called.
pub trait Connection {
    type Session: Session;

    fn create_session(&self, transacted: bool, ack_mode: AckMode) -> Result<Self::Session>;

    fn start(&mut self) -> Result<()>;

    /// Close the connection. Sessions and browsers created from it stop working.
    fn close(&mut self) -> Result<()>;
}

/// A single-threaded context for producing browsers.
pub trait Session {
    type Browser: QueueBrowser;

    fn create_browser(&self, queue: &Queue) -> Result<Self::Browser>;

    fn close(&mut self) -> Result<()>;
}

/// A read-only cursor over a queue's backlog.
///
/// Pulling a message never removes it from the queue and never acknowledges it.
pub trait QueueBrowser {
    fn queue(&self) -> &Queue;

    /// The next backlog message, or `None` once the backlog is exhausted.
    fn next_message(&mut self) -> Result<Option<Message>>;

    fn close(&mut self) -> Result<()>;
}
