use qbrowse_broker::{AckMode, Broker, Connection, Directory, Queue, QueueBrowser, Session};
use tracing::debug;

use crate::config::{ConnectionConfig, CONNECTION_FACTORY_NAME};
use crate::enumerator::Enumeration;
use crate::error::{BrowseError, CloseError, Result};

/// Session handle type for broker `B`.
pub type SessionOf<B> = <<B as Broker>::Connection as Connection>::Session;

/// Browser handle type for broker `B`.
pub type BrowserOf<B> = <SessionOf<B> as Session>::Browser;

/// Connection, session, and browser, opened together and released together.
pub struct BrowseSession<B: Broker> {
    connection: B::Connection,
    session: SessionOf<B>,
    browser: BrowserOf<B>,
}

impl<B: Broker> BrowseSession<B> {
    /// Resolve the directory, connect, and bind a started browser to the queue.
    ///
    /// Directory failures surface as [`BrowseError::Directory`], broker
    /// failures as [`BrowseError::Broker`]. Handles created before a failure
    /// are closed before the error is returned.
    pub fn open(broker: &B, config: &ConnectionConfig) -> Result<Self> {
        let directory = Directory::from_env(config.iter())?;
        let factory = directory.lookup_connection_factory(CONNECTION_FACTORY_NAME)?;
        let mut connection = factory.create_connection(broker)?;

        let queue: Queue = match directory.lookup_queue(config.queue_name()) {
            Ok(queue) => queue.clone(),
            Err(err) => return Err(abort::<B>(err.into(), None, None, &mut connection)),
        };

        let mut session = match connection.create_session(false, AckMode::Auto) {
            Ok(session) => session,
            Err(err) => return Err(abort::<B>(err.into(), None, None, &mut connection)),
        };

        let mut browser = match session.create_browser(&queue) {
            Ok(browser) => browser,
            Err(err) => {
                return Err(abort::<B>(
                    err.into(),
                    None,
                    Some(&mut session),
                    &mut connection,
                ))
            }
        };

        if let Err(err) = connection.start() {
            return Err(abort::<B>(
                err.into(),
                Some(&mut browser),
                Some(&mut session),
                &mut connection,
            ));
        }

        debug!(queue = queue.name(), "browse session open");
        Ok(Self {
            connection,
            session,
            browser,
        })
    }

    /// Lazy sequence over the backlog. Single pass per session.
    pub fn messages(&mut self) -> Enumeration<'_, BrowserOf<B>> {
        Enumeration::new(&mut self.browser)
    }

    pub fn browser(&self) -> &BrowserOf<B> {
        &self.browser
    }

    /// Release connection, session, and browser.
    ///
    /// All three releases are attempted even when an earlier one fails.
    pub fn close(mut self) -> Result<()> {
        let mut failures = Vec::new();
        if let Err(err) = self.connection.close() {
            failures.push(("connection", err));
        }
        if let Err(err) = self.session.close() {
            failures.push(("session", err));
        }
        if let Err(err) = self.browser.close() {
            failures.push(("browser", err));
        }

        debug!(
            queue = self.browser.queue().name(),
            failures = failures.len(),
            "browse session closed"
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BrowseError::Close(CloseError { failures }))
        }
    }
}

/// Roll back a partial open, innermost handle first, and hand back the
/// original error. Release failures here are only logged.
fn abort<B: Broker>(
    err: BrowseError,
    browser: Option<&mut BrowserOf<B>>,
    session: Option<&mut SessionOf<B>>,
    connection: &mut B::Connection,
) -> BrowseError {
    debug!(error = %err, "browse session open failed, releasing handles");
    if let Some(browser) = browser {
        if let Err(close_err) = browser.close() {
            debug!(error = %close_err, "rollback: browser close failed");
        }
    }
    if let Some(session) = session {
        if let Err(close_err) = session.close() {
            debug!(error = %close_err, "rollback: session close failed");
        }
    }
    if let Err(close_err) = connection.close() {
        debug!(error = %close_err, "rollback: connection close failed");
    }
    err
}
