use qbrowse_broker::Broker;
use qbrowse_message::{ContentKind, Message, StreamConfig};
use tracing::debug;

use crate::config::{resolve, AccessKey, BrowseIdentity, ClientConfig, ConnectionConfig};
use crate::decoder;
use crate::enumerator::Enumeration;
use crate::error::Result;
use crate::session::{BrowseSession, BrowserOf};

/// Browses one queue on one broker with one identity.
///
/// The connection configuration is resolved once, at construction. A browse
/// session is opened by [`browse_queue`](Self::browse_queue) and held until
/// [`close_browser`](Self::close_browser). Dropping the client releases any
/// open session without reporting release failures.
///
/// Not shareable across threads while browsing; the enumeration borrows the
/// client mutably.
pub struct QueueBrowserClient<B: Broker> {
    identity: BrowseIdentity,
    config: ConnectionConfig,
    stream_config: StreamConfig,
    broker: B,
    session: Option<BrowseSession<B>>,
}

impl<B: Broker> QueueBrowserClient<B> {
    /// Client for `queue_name` with the default endpoint and stream limits.
    pub fn new(
        broker: B,
        queue_name: impl Into<String>,
        user_name: impl Into<String>,
        access_key: impl Into<AccessKey>,
    ) -> Result<Self> {
        let identity = BrowseIdentity::new(queue_name, user_name, access_key)?;
        Self::with_config(broker, identity, &ClientConfig::default())
    }

    pub fn with_config(broker: B, identity: BrowseIdentity, config: &ClientConfig) -> Result<Self> {
        let resolved = resolve(&identity, &config.endpoint)?;
        debug!(
            queue = identity.queue_name(),
            user = identity.user_name(),
            host = %config.endpoint.host,
            port = config.endpoint.port,
            "client configured"
        );
        Ok(Self {
            identity,
            config: resolved,
            stream_config: config.stream,
            broker,
            session: None,
        })
    }

    pub fn identity(&self) -> &BrowseIdentity {
        &self.identity
    }

    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// True while a browse session is held.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Lazy sequence over the queue backlog.
    ///
    /// Opens a session on first use. Later calls continue the same session,
    /// so a sequence that ran to the end stays empty; call
    /// [`close_browser`](Self::close_browser) first to browse from the start.
    pub fn browse_queue(&mut self) -> Result<Enumeration<'_, BrowserOf<B>>> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session = BrowseSession::open(&self.broker, &self.config)?;
                debug!(queue = self.identity.queue_name(), "browsing queue");
                session
            }
        };
        Ok(self.session.insert(session).messages())
    }

    /// Release the browse session. A no-op when none is open.
    ///
    /// The session is gone after this call even if some release failed.
    pub fn close_browser(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.close(),
            None => Ok(()),
        }
    }

    /// See [`decoder::properties`].
    pub fn message_properties(&self, message: &Message) -> Result<String> {
        decoder::properties(message)
    }

    /// See [`decoder::classify`].
    pub fn message_content_type(&self, message: &Message) -> Option<ContentKind> {
        decoder::classify(message)
    }

    /// See [`decoder::content`]. Uses this client's stream limits.
    pub fn message_content(&self, message: &Message) -> Result<String> {
        decoder::content(message, &self.stream_config)
    }
}

#[cfg(test)]
mod tests {
    use qbrowse_broker::{BrokerEndpoint, BrokerError, MemoryBroker};
    use qbrowse_message::StreamWriter;

    use super::*;
    use crate::error::{BrowseError, ConfigError};

    fn seeded() -> MemoryBroker {
        let broker = MemoryBroker::new();
        broker.grant("alice", "key123");
        broker.enqueue("orders", Message::text("one"));
        broker.enqueue("orders", Message::text("two"));
        broker
    }

    fn client(broker: &MemoryBroker) -> QueueBrowserClient<MemoryBroker> {
        QueueBrowserClient::new(broker.clone(), "orders", "alice", "key123").unwrap()
    }

    #[test]
    fn rejects_empty_identity() {
        let err = QueueBrowserClient::new(MemoryBroker::new(), "", "alice", "k")
            .err()
            .unwrap();
        assert!(matches!(err, BrowseError::Config(ConfigError::EmptyQueueName)));
    }

    #[test]
    fn close_without_open_is_ok() {
        let broker = seeded();
        let mut client = client(&broker);
        assert!(!client.is_open());
        client.close_browser().unwrap();
        client.close_browser().unwrap();
    }

    #[test]
    fn browse_then_close_releases_everything() {
        let broker = seeded();
        let mut client = client(&broker);

        let seen = client.browse_queue().unwrap().count();
        assert_eq!(seen, 2);
        assert!(client.is_open());
        assert_eq!(broker.open_handles().total(), 3);

        client.close_browser().unwrap();
        assert!(!client.is_open());
        assert_eq!(broker.open_handles().total(), 0);
        assert_eq!(broker.backlog_len("orders"), 2);
    }

    #[test]
    fn same_session_does_not_restart() {
        let broker = seeded();
        let mut client = client(&broker);

        assert_eq!(client.browse_queue().unwrap().count(), 2);
        assert_eq!(client.browse_queue().unwrap().count(), 0);
    }

    #[test]
    fn partial_pull_resumes_in_same_session() {
        let broker = seeded();
        let mut client = client(&broker);

        let first = client.browse_queue().unwrap().next().unwrap().unwrap();
        assert_eq!(first, Message::text("one"));
        let rest: Vec<_> = client
            .browse_queue()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rest, vec![Message::text("two")]);
    }

    #[test]
    fn new_session_sees_whole_backlog_again() {
        let broker = seeded();
        let mut client = client(&broker);

        let first: Vec<_> = client
            .browse_queue()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        client.close_browser().unwrap();
        let second: Vec<_> = client
            .browse_queue()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn open_failure_keeps_client_closed() {
        let broker = seeded();
        broker.set_reachable(false);
        let mut client = client(&broker);

        assert!(matches!(
            client.browse_queue().err().unwrap(),
            BrowseError::Broker(BrokerError::Connect { .. })
        ));
        assert!(!client.is_open());
        assert_eq!(broker.open_handles().total(), 0);

        broker.set_reachable(true);
        assert_eq!(client.browse_queue().unwrap().count(), 2);
    }

    #[test]
    fn content_after_close_fails() {
        let broker = MemoryBroker::new();
        broker.grant("alice", "key123");
        let mut writer = StreamWriter::new();
        writer.write_string("x").unwrap();
        broker.enqueue("orders", Message::stream(writer.finish()).with_property("k", "v"));
        let mut client = client(&broker);

        let message = client.browse_queue().unwrap().next().unwrap().unwrap();
        assert_eq!(client.message_content(&message).unwrap(), "x, ");
        assert_eq!(client.message_properties(&message).unwrap(), "k = v, ");
        client.close_browser().unwrap();

        assert!(matches!(
            client.message_content(&message),
            Err(BrowseError::Broker(BrokerError::Closed))
        ));
        assert!(matches!(
            client.message_properties(&message),
            Err(BrowseError::Broker(BrokerError::Closed))
        ));
        // Classification reads only the declared kind.
        assert_eq!(
            client.message_content_type(&message),
            Some(ContentKind::Stream)
        );
    }

    #[test]
    fn custom_endpoint_lands_in_broker_url() {
        let identity = BrowseIdentity::new("orders", "alice", "key123").unwrap();
        let config = ClientConfig {
            endpoint: BrokerEndpoint {
                host: "mq.internal".to_string(),
                port: 5673,
                ..BrokerEndpoint::default()
            },
            ..ClientConfig::default()
        };
        let client = QueueBrowserClient::with_config(MemoryBroker::new(), identity, &config).unwrap();

        let url = client
            .connection_config()
            .get("connectionfactory.brokerConnectionFactory")
            .unwrap();
        assert!(url.ends_with("brokerlist='tcp://mq.internal:5673'"));
    }

    #[test]
    fn percent_in_access_key_authenticates() {
        let broker = MemoryBroker::new();
        broker.grant("alice", "k%41y");
        broker.enqueue("orders", Message::text("one"));
        let mut client =
            QueueBrowserClient::new(broker.clone(), "orders", "alice", "k%41y").unwrap();

        assert_eq!(client.browse_queue().unwrap().count(), 1);
    }

    #[test]
    fn queue_named_like_the_connection_factory() {
        let broker = MemoryBroker::new();
        broker.grant("alice", "key123");
        broker.enqueue("brokerConnectionFactory", Message::text("one"));
        let mut client = QueueBrowserClient::new(
            broker.clone(),
            "brokerConnectionFactory",
            "alice",
            "key123",
        )
        .unwrap();

        let seen: Vec<_> = client
            .browse_queue()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(seen, vec![Message::text("one")]);
    }
}
