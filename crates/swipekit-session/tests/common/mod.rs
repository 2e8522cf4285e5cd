//! Common test utilities for session integration tests.
//!
//! Every helper drives a [`ReaderSession`] against the mock reader from
//! `swipekit-hardware`. Reader notifications are processed by the session
//! worker ahead of queued commands, so a `state()` round-trip is enough to
//! guarantee that everything the mock emitted has been published.

#![allow(dead_code)]

use swipekit_hardware::mock::{MockConnector, MockSwiperHandle};
use swipekit_session::{DomainEvent, ReaderSession, ReaderState, SessionConfig};
use tokio::sync::mpsc::UnboundedReceiver;

/// Well-formed track 1 payload followed by track 2.
pub const VISA_SWIPE: &[u8] = b"%B4111111111111111^DOE/JOHN^2512101000000000000?;4111111111111111=2512101?";

/// Track with a name field that has no `/`.
pub const MALFORMED_NAME_SWIPE: &[u8] = b"%B4111111111111111^DOE^2512101?";

/// Running session with its mock reader and an event subscription.
pub struct Harness {
    pub session: ReaderSession,
    pub reader: MockSwiperHandle,
    pub events: UnboundedReceiver<DomainEvent>,
}

impl Harness {
    /// Start a session with the default configuration.
    pub fn start() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Start a session with a custom configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        let (connector, reader) = MockConnector::new();
        let session = ReaderSession::spawn(connector, config).expect("valid config");
        let events = session.subscribe();
        Self {
            session,
            reader,
            events,
        }
    }

    /// Start a session and activate it, discarding the connection events.
    pub async fn activated() -> Self {
        let mut harness = Self::start();
        harness.session.activate().await.expect("activation");
        harness.drain().await;
        harness
    }

    /// Wait until the worker has handled every queued notification and
    /// return the current state.
    pub async fn settle(&self) -> ReaderState {
        self.session.state().await.expect("session running")
    }

    /// Settle, then return every event published so far.
    pub async fn drain(&mut self) -> Vec<DomainEvent> {
        self.settle().await;
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
