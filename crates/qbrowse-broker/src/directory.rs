use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::endpoint::BrokerUrl;
use crate::error::{DirectoryError, Result};
use crate::traits::{Broker, Queue};

/// Environment key naming the directory factory.
pub const INITIAL_CONTEXT_FACTORY: &str = "naming.factory.initial";

/// The built-in factory: bindings are read straight from the environment.
pub const PROPERTIES_DIRECTORY_FACTORY: &str = "qbrowse.directory.PropertiesDirectoryFactory";

/// Prefix for connection-factory bindings; the value is a broker URL.
pub const CONNECTION_FACTORY_PREFIX: &str = "connectionfactory.";

/// Prefix for queue bindings; the value is the broker-side queue name.
pub const QUEUE_PREFIX: &str = "queue.";

/// Creates broker connections for one broker URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFactory {
    url: BrokerUrl,
}

impl ConnectionFactory {
    pub fn new(url: BrokerUrl) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &BrokerUrl {
        &self.url
    }

    /// Open a connection on `broker` using this factory's URL.
    pub fn create_connection<B: Broker>(&self, broker: &B) -> Result<B::Connection> {
        debug!(broker = %self.url.broker_address(), user = self.url.user(), "creating connection");
        broker.connect(&self.url)
    }
}

/// Name-to-object lookup built from a key/value environment.
///
/// Keys follow a `prefix + logical-name` convention:
/// `connectionfactory.<name>` binds a connection factory, `queue.<name>`
/// binds a queue. Other keys are accepted and ignored. Factories and queues
/// live in separate namespaces, so a queue may share its name with a factory.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    factories: BTreeMap<String, ConnectionFactory>,
    queues: BTreeMap<String, Queue>,
}

impl Directory {
    /// Build a directory context from an environment.
    ///
    /// Fails if the environment names no factory or an unknown one, or if a
    /// connection-factory binding holds a malformed broker URL.
    pub fn from_env<I, K, V>(env: I) -> std::result::Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries: Vec<(K, V)> = env.into_iter().collect();

        let factory = entries
            .iter()
            .find(|(key, _)| key.as_ref() == INITIAL_CONTEXT_FACTORY)
            .map(|(_, value)| value.as_ref())
            .ok_or(DirectoryError::MissingFactory)?;
        if factory != PROPERTIES_DIRECTORY_FACTORY {
            return Err(DirectoryError::UnknownFactory(factory.to_string()));
        }

        let mut directory = Self::default();
        for (key, value) in &entries {
            let (key, value) = (key.as_ref(), value.as_ref());
            if let Some(name) = key.strip_prefix(CONNECTION_FACTORY_PREFIX) {
                let url = BrokerUrl::parse(value).map_err(|source| DirectoryError::MalformedUrl {
                    binding: name.to_string(),
                    source,
                })?;
                directory
                    .factories
                    .insert(name.to_string(), ConnectionFactory::new(url));
            } else if let Some(name) = key.strip_prefix(QUEUE_PREFIX) {
                directory
                    .queues
                    .insert(name.to_string(), Queue::new(value));
            } else {
                trace!(key, "ignoring non-binding environment key");
            }
        }

        debug!(
            factories = directory.factories.len(),
            queues = directory.queues.len(),
            "directory context created"
        );
        Ok(directory)
    }

    /// Look up a connection factory.
    ///
    /// A name bound only as a queue is reported as the wrong binding type.
    pub fn lookup_connection_factory(
        &self,
        name: &str,
    ) -> std::result::Result<&ConnectionFactory, DirectoryError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory),
            None if self.queues.contains_key(name) => Err(DirectoryError::WrongBindingType {
                name: name.to_string(),
                expected: "connection factory",
            }),
            None => Err(DirectoryError::NameNotFound(name.to_string())),
        }
    }

    /// Look up a queue.
    ///
    /// A name bound only as a connection factory is reported as the wrong
    /// binding type.
    pub fn lookup_queue(&self, name: &str) -> std::result::Result<&Queue, DirectoryError> {
        match self.queues.get(name) {
            Some(queue) => Ok(queue),
            None if self.factories.contains_key(name) => Err(DirectoryError::WrongBindingType {
                name: name.to_string(),
                expected: "queue",
            }),
            None => Err(DirectoryError::NameNotFound(name.to_string())),
        }
    }

    /// Bound factory names, sorted.
    pub fn factory_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Bound queue names, sorted.
    pub fn queue_names(&self) -> impl Iterator<Item = &str> {
        self.queues.keys().map(String::as_str)
    }
}
