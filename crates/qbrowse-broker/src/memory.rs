use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qbrowse_message::{Liveness, Message};
use tracing::{debug, trace};

use crate::endpoint::BrokerUrl;
use crate::error::{BrokerError, Result};
use crate::traits::{AckMode, Broker, Connection, Queue, QueueBrowser, Session};

/// Lifecycle steps where a [`MemoryBroker`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Connect,
    CreateSession,
    CreateBrowser,
    Start,
    Browse,
    CloseConnection,
    CloseSession,
    CloseBrowser,
}

impl FaultPoint {
    fn operation(self) -> &'static str {
        match self {
            FaultPoint::Connect => "connect",
            FaultPoint::CreateSession => "create session",
            FaultPoint::CreateBrowser => "create browser",
            FaultPoint::Start => "start connection",
            FaultPoint::Browse => "browse",
            FaultPoint::CloseConnection => "close connection",
            FaultPoint::CloseSession => "close session",
            FaultPoint::CloseBrowser => "close browser",
        }
    }
}

/// Number of handles currently open on a [`MemoryBroker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleCounts {
    pub connections: usize,
    pub sessions: usize,
    pub browsers: usize,
}

impl HandleCounts {
    pub fn total(&self) -> usize {
        self.connections + self.sessions + self.browsers
    }
}

#[derive(Debug)]
struct State {
    reachable: bool,
    credentials: HashMap<String, String>,
    queues: HashMap<String, Vec<Message>>,
    faults: HashSet<FaultPoint>,
    open: HandleCounts,
    links: Vec<Liveness>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            reachable: true,
            credentials: HashMap::new(),
            queues: HashMap::new(),
            faults: HashSet::new(),
            open: HandleCounts::default(),
            links: Vec::new(),
        }
    }
}

/// An in-process broker.
///
/// Holds named queues and their backlogs, checks credentials on connect, and
/// hands out connections, sessions, and browsers that follow the broker
/// client contract. Clones share the same broker.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<State>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `access_key` for `user`. Replaces any earlier key.
    pub fn grant(&self, user: impl Into<String>, access_key: impl Into<String>) {
        self.lock().credentials.insert(user.into(), access_key.into());
    }

    /// Create an empty queue if it does not exist.
    pub fn declare_queue(&self, name: impl Into<String>) {
        self.lock().queues.entry(name.into()).or_default();
    }

    /// Append a message to a queue's backlog, declaring the queue if needed.
    pub fn enqueue(&self, queue: impl Into<String>, message: Message) {
        self.lock()
            .queues
            .entry(queue.into())
            .or_default()
            .push(message);
    }

    /// A copy of a queue's backlog, or `None` if the queue does not exist.
    pub fn backlog(&self, queue: &str) -> Option<Vec<Message>> {
        self.lock().queues.get(queue).cloned()
    }

    pub fn backlog_len(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, Vec::len)
    }

    /// Toggle whether connection attempts reach the broker.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Make every later operation at `point` fail until cleared.
    pub fn inject_fault(&self, point: FaultPoint) {
        self.lock().faults.insert(point);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    /// Handles opened and not yet released.
    pub fn open_handles(&self) -> HandleCounts {
        self.lock().open
    }

    /// Drop every live connection from the broker side.
    ///
    /// Handles stay allocated until the client closes them, but every
    /// operation on them fails with [`BrokerError::Closed`].
    pub fn disconnect_all(&self) {
        let links = std::mem::take(&mut self.lock().links);
        debug!(connections = links.len(), "disconnecting all connections");
        for link in links {
            link.cut();
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_fault(&self, point: FaultPoint) -> Result<()> {
        if self.lock().faults.contains(&point) {
            return Err(BrokerError::Operation {
                operation: point.operation(),
                reason: "injected fault".to_string(),
            });
        }
        Ok(())
    }

    fn release(&self, update: impl FnOnce(&mut HandleCounts)) {
        let mut state = self.lock();
        update(&mut state.open);
        state.links.retain(Liveness::is_alive);
    }
}

impl Broker for MemoryBroker {
    type Connection = MemoryConnection;

    fn connect(&self, url: &BrokerUrl) -> Result<MemoryConnection> {
        let endpoint = url.broker_address();
        if let Err(err) = self.check_fault(FaultPoint::Connect) {
            return Err(BrokerError::Connect {
                endpoint,
                reason: err.to_string(),
            });
        }

        let mut state = self.lock();
        if !state.reachable {
            return Err(BrokerError::Connect {
                endpoint,
                reason: "broker unreachable".to_string(),
            });
        }
        if state.credentials.get(url.user()).map(String::as_str) != Some(url.access_key()) {
            return Err(BrokerError::Authentication {
                user: url.user().to_string(),
            });
        }

        let link = Liveness::new();
        state.links.push(link.clone());
        state.open.connections += 1;
        drop(state);

        debug!(%endpoint, user = url.user(), "connection opened");
        Ok(MemoryConnection {
            broker: self.clone(),
            link,
            started: Arc::new(AtomicBool::new(false)),
            closed: false,
        })
    }
}

/// Connection handle on a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemoryConnection {
    broker: MemoryBroker,
    link: Liveness,
    started: Arc<AtomicBool>,
    closed: bool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.closed || !self.link.is_alive() {
            return Err(BrokerError::Closed);
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.link.cut();
            self.broker.release(|open| open.connections -= 1);
        }
    }
}

impl Connection for MemoryConnection {
    type Session = MemorySession;

    fn create_session(&self, transacted: bool, ack_mode: AckMode) -> Result<MemorySession> {
        self.ensure_open()?;
        self.broker.check_fault(FaultPoint::CreateSession)?;
        self.broker.lock().open.sessions += 1;
        trace!(transacted, ?ack_mode, "session created");
        Ok(MemorySession {
            broker: self.broker.clone(),
            link: self.link.clone(),
            started: Arc::clone(&self.started),
            closed: false,
        })
    }

    fn start(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.broker.check_fault(FaultPoint::Start)?;
        self.started.store(true, Ordering::Release);
        trace!("connection started");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.release();
        self.broker.check_fault(FaultPoint::CloseConnection)
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.release();
    }
}

/// Session handle on a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemorySession {
    broker: MemoryBroker,
    link: Liveness,
    started: Arc<AtomicBool>,
    closed: bool,
}

impl MemorySession {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.broker.release(|open| open.sessions -= 1);
        }
    }
}

impl Session for MemorySession {
    type Browser = MemoryBrowser;

    fn create_browser(&self, queue: &Queue) -> Result<MemoryBrowser> {
        if self.closed || !self.link.is_alive() {
            return Err(BrokerError::Closed);
        }
        self.broker.check_fault(FaultPoint::CreateBrowser)?;

        let mut state = self.broker.lock();
        // Messages enqueued after this point are not part of the browse.
        let limit = state
            .queues
            .get(queue.name())
            .map(Vec::len)
            .ok_or_else(|| BrokerError::QueueNotFound(queue.name().to_string()))?;
        state.open.browsers += 1;
        drop(state);

        trace!(queue = queue.name(), backlog = limit, "browser created");
        Ok(MemoryBrowser {
            broker: self.broker.clone(),
            link: self.link.clone(),
            started: Arc::clone(&self.started),
            queue: queue.clone(),
            cursor: 0,
            limit,
            closed: false,
        })
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.release();
        self.broker.check_fault(FaultPoint::CloseSession)
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Browser handle on a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemoryBrowser {
    broker: MemoryBroker,
    link: Liveness,
    started: Arc<AtomicBool>,
    queue: Queue,
    cursor: usize,
    limit: usize,
    closed: bool,
}

impl MemoryBrowser {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.broker.release(|open| open.browsers -= 1);
        }
    }
}

impl QueueBrowser for MemoryBrowser {
    fn queue(&self) -> &Queue {
        &self.queue
    }

    fn next_message(&mut self) -> Result<Option<Message>> {
        if self.closed || !self.link.is_alive() {
            return Err(BrokerError::Closed);
        }
        if !self.started.load(Ordering::Acquire) {
            return Err(BrokerError::NotStarted);
        }
        self.broker.check_fault(FaultPoint::Browse)?;

        if self.cursor >= self.limit {
            return Ok(None);
        }
        let message = self
            .broker
            .lock()
            .queues
            .get(self.queue.name())
            .and_then(|backlog| backlog.get(self.cursor))
            .cloned();
        self.cursor += 1;

        Ok(message.map(|message| message.attach(self.link.clone())))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.release();
        self.broker.check_fault(FaultPoint::CloseBrowser)
    }
}

impl Drop for MemoryBrowser {
    fn drop(&mut self) {
        self.release();
    }
}
