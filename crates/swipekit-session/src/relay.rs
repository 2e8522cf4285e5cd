//! Hardware notification relay.
//!
//! The [`EventRelay`] turns every [`HardwareNotification`] from the current
//! reader subscription into exactly one [`DomainEvent`] and hands it to every
//! registered listener in arrival order. Swipe payloads are parsed on the
//! way through; raw track data never reaches a listener.
//!
//! # Examples
//!
//! ```
//! use swipekit_hardware::{HardwareNotification, RawSwipePayload};
//! use swipekit_session::{DomainEvent, EventRelay};
//!
//! let relay = EventRelay::new();
//! let mut events = relay.subscribe();
//!
//! let event = EventRelay::translate(&HardwareNotification::SwipeReceived(
//!     RawSwipePayload::new(&b"%B4111111111111111^DOE/JOHN^2512"[..]),
//! ));
//! relay.publish(&event);
//!
//! match events.try_recv() {
//!     Ok(DomainEvent::SwipeReceived(record)) => assert_eq!(record.first_name, "JOHN"),
//!     other => panic!("unexpected event: {:?}", other),
//! }
//! ```
//!
//! Reader subscriptions are opened and retired only by the session worker;
//! holders of the relay can register listeners but cannot change which
//! reader connection is relayed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use swipekit_hardware::{HardwareNotification, SubscriptionId, TaggedNotification};
use swipekit_track::TrackParser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::events::{
    CONNECTION_TIMEOUT_REASON, DomainEvent, EventNaming, INSUFFICIENT_POWER_REASON,
    MONO_AUDIO_REASON, SWIPE_TIMEOUT_REASON,
};

/// Receiver of relayed events.
///
/// Called synchronously on the session worker; implementations must not block.
pub trait EventListener: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &DomainEvent);

    /// Returns `true` once the listener can no longer receive events.
    ///
    /// Closed listeners are removed on the next publish.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Identifier returned by [`EventRelay::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Listener forwarding events into an unbounded channel.
struct ChannelListener {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventListener for ChannelListener {
    fn on_event(&self, event: &DomainEvent) {
        let _ = self.tx.send(event.clone());
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug, Default)]
struct SubscriptionState {
    active: Option<SubscriptionId>,
    last: Option<SubscriptionId>,
}

/// Fan-out of normalized reader events.
///
/// Shared between the session handle and its worker behind an `Arc`.
pub struct EventRelay {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn EventListener>)>>,
    next_listener: AtomicU64,
    subscription: Mutex<SubscriptionState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl EventRelay {
    /// Create a relay with no listeners and no active subscription.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            subscription: Mutex::new(SubscriptionState::default()),
        }
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, listener));
        debug!(listener = %id, "Listener added");
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        before != listeners.len()
    }

    /// Register a channel listener and return its receiving end.
    ///
    /// The listener is removed automatically once the receiver is dropped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DomainEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add_listener(Arc::new(ChannelListener { tx }));
        rx
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Start a new reader subscription, retiring any previous one.
    pub(crate) fn open_subscription(&self) -> SubscriptionId {
        let mut state = lock(&self.subscription);
        let id = state.last.map_or(SubscriptionId::new(1), SubscriptionId::next);
        state.last = Some(id);
        if let Some(previous) = state.active.replace(id) {
            warn!(%previous, "Replacing a subscription that was never closed");
        }
        debug!(subscription = %id, "Subscription opened");
        id
    }

    /// Retire the active subscription. Later notifications tagged with it are dropped.
    pub(crate) fn close_subscription(&self) {
        if let Some(id) = lock(&self.subscription).active.take() {
            debug!(subscription = %id, "Subscription closed");
        }
    }

    /// The subscription whose notifications are currently relayed.
    pub fn active_subscription(&self) -> Option<SubscriptionId> {
        lock(&self.subscription).active
    }

    /// Translate and publish a notification from the reader.
    ///
    /// Returns the published event, or `None` if the notification belongs
    /// to a retired subscription and was dropped.
    pub(crate) fn dispatch(&self, tagged: TaggedNotification) -> Option<DomainEvent> {
        if self.active_subscription() != Some(tagged.subscription) {
            debug!(
                subscription = %tagged.subscription,
                notification = tagged.notification.name(),
                "Dropping notification from retired subscription"
            );
            return None;
        }

        let event = Self::translate(&tagged.notification);
        self.publish(&event);
        Some(event)
    }

    /// Publish an event to every listener.
    pub fn publish(&self, event: &DomainEvent) {
        let listeners: Vec<Arc<dyn EventListener>> = {
            let mut listeners = lock(&self.listeners);
            listeners.retain(|(_, listener)| !listener.is_closed());
            listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        debug!(
            event = event.name(EventNaming::Canonical),
            listeners = listeners.len(),
            "Publishing event"
        );
        for listener in listeners {
            listener.on_event(event);
        }
    }

    /// Map a hardware notification to its domain event.
    ///
    /// Swipe payloads are parsed here; a payload that does not parse becomes
    /// [`DomainEvent::SwipeError`].
    pub fn translate(notification: &HardwareNotification) -> DomainEvent {
        match notification {
            HardwareNotification::Powering => DomainEvent::Connecting,
            HardwareNotification::Connected => DomainEvent::Connected,
            HardwareNotification::Disconnected => DomainEvent::Disconnected,
            HardwareNotification::ConnectionTimeout => {
                DomainEvent::Timeout(CONNECTION_TIMEOUT_REASON.to_string())
            }
            HardwareNotification::InsufficientPower => {
                DomainEvent::Timeout(INSUFFICIENT_POWER_REASON.to_string())
            }
            HardwareNotification::MonoAudioError => {
                DomainEvent::Timeout(MONO_AUDIO_REASON.to_string())
            }
            HardwareNotification::SwipeTimeout => {
                DomainEvent::Timeout(SWIPE_TIMEOUT_REASON.to_string())
            }
            HardwareNotification::DataProcessing => DomainEvent::SwipeProcessing,
            HardwareNotification::InvalidSwipe => DomainEvent::SwipeError,
            HardwareNotification::SwipeReceived(payload) => {
                match TrackParser::parse(payload.as_bytes()) {
                    Ok(record) => {
                        info!(card = %record.masked_card_number(), "Swipe parsed");
                        DomainEvent::SwipeReceived(record)
                    }
                    Err(e) => {
                        warn!(error = %e, bytes = payload.len(), "Swipe data could not be parsed");
                        DomainEvent::SwipeError
                    }
                }
            }
        }
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRelay")
            .field("listeners", &self.listener_count())
            .field("subscription", &self.active_subscription())
            .finish()
    }
}
