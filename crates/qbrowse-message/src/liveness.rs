use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag linking delivered messages to the connection that produced them.
///
/// Cloning shares the flag. Once [`Liveness::cut`] is called every clone
/// reports dead, and message reads fail with `MessageError::Detached`.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Liveness {
    /// Create a new live flag.
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// True until [`Liveness::cut`] is called on any clone.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the link dead. Idempotent.
    pub fn cut(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_is_visible_through_clones() {
        let link = Liveness::new();
        let other = link.clone();
        assert!(other.is_alive());

        link.cut();
        assert!(!other.is_alive());
        link.cut();
        assert!(!link.is_alive());
    }
}
