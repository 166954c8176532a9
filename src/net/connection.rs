//! Upgraded connection lifecycle tracking.
//!
//! # Responsibilities
//! - Name each relayed (upgraded) connection for logs
//! - Track the relay state (Handshaking → Streaming → Closed)
//! - Count live relays so shutdown can wait for them to drain

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

static NEXT_RELAY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique relay identifier, rendered as `relay-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelayId(u64);

impl RelayId {
    fn next() -> Self {
        Self(NEXT_RELAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay-{}", self.0)
    }
}

/// Upgraded connection state. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelayState {
    /// Handshake sent upstream, waiting for 101.
    Handshaking,
    /// Bytes flowing in both directions.
    Streaming,
    /// Either side closed; resources released.
    Closed,
}

#[derive(Debug, Default)]
struct Live {
    count: AtomicUsize,
    drained: Notify,
}

/// Shared count of live relays.
#[derive(Debug, Clone, Default)]
pub struct RelayTracker {
    live: Arc<Live>,
}

impl RelayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relay in the `Handshaking` state.
    pub fn track(&self) -> RelayGuard {
        self.live.count.fetch_add(1, Ordering::SeqCst);
        let guard = RelayGuard {
            live: Arc::clone(&self.live),
            id: RelayId::next(),
            state: RelayState::Handshaking,
        };
        tracing::trace!(relay = %guard.id, "Relay handshaking");
        guard
    }

    pub fn live(&self) -> usize {
        self.live.count.load(Ordering::SeqCst)
    }

    /// Wait for every relay to close. False if `deadline` passed first.
    pub async fn wait_for_drain(&self, deadline: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.live.drained.notified();
                if self.live() == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(deadline, drained).await.is_ok()
    }
}

/// One relay's registration; closing it is dropping it.
#[derive(Debug)]
pub struct RelayGuard {
    live: Arc<Live>,
    id: RelayId,
    state: RelayState,
}

impl RelayGuard {
    pub fn id(&self) -> RelayId {
        self.id
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Move forward to `next`; backwards transitions are ignored.
    pub fn advance(&mut self, next: RelayState) {
        if next > self.state {
            tracing::trace!(relay = %self.id, from = ?self.state, to = ?next, "Relay state");
            self.state = next;
        }
    }
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        self.advance(RelayState::Closed);
        if self.live.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.live.drained.notify_waiters();
        }
    }
}
