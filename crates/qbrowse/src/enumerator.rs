use std::iter::FusedIterator;

use qbrowse_broker::QueueBrowser;
use qbrowse_message::Message;
use tracing::trace;

use crate::error::BrowseError;

/// Lazy, forward-only view of a queue's backlog.
///
/// Each call to `next` pulls one message from the browser. Nothing is
/// acknowledged or removed. Once the browser reports the end of the backlog
/// the enumeration stays finished; only a new session starts over.
///
/// Broker failures are yielded as `Err` items without ending the
/// enumeration, so callers that keep pulling after an error will see the
/// browser's next answer (usually the same error once the connection is gone).
pub struct Enumeration<'a, R: QueueBrowser> {
    browser: &'a mut R,
    exhausted: bool,
    delivered: usize,
}

impl<'a, R: QueueBrowser> Enumeration<'a, R> {
    pub fn new(browser: &'a mut R) -> Self {
        Self {
            browser,
            exhausted: false,
            delivered: 0,
        }
    }

    /// Messages yielded so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<R: QueueBrowser> Iterator for Enumeration<'_, R> {
    type Item = Result<Message, BrowseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.browser.next_message() {
            Ok(Some(message)) => {
                self.delivered += 1;
                Some(Ok(message))
            }
            Ok(None) => {
                self.exhausted = true;
                trace!(
                    queue = self.browser.queue().name(),
                    delivered = self.delivered,
                    "backlog exhausted"
                );
                None
            }
            Err(err) => Some(Err(err.into())),
        }
    }
}

impl<R: QueueBrowser> FusedIterator for Enumeration<'_, R> {}
