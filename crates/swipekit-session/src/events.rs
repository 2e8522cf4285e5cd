//! Domain events published by the relay.
//!
//! A [`DomainEvent`] is the normalized form of one hardware notification.
//! External consumers receive it wrapped in an [`EventEnvelope`], named
//! according to the configured [`EventNaming`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swipekit_core::CardRecord;

/// Timeout reason for a connection attempt that never completed.
pub const CONNECTION_TIMEOUT_REASON: &str = "Connection timed out.";

/// Timeout reason when host volume is too low to power the reader.
pub const INSUFFICIENT_POWER_REASON: &str =
    "Volume too low. Please maximize volume before reattaching swiper.";

/// Timeout reason when mono audio blocks the reader.
pub const MONO_AUDIO_REASON: &str =
    "Mono audio is enabled. Please disable it in your device settings.";

/// Timeout reason when no card was swiped in time.
pub const SWIPE_TIMEOUT_REASON: &str = "Swipe timed out.";

/// Normalized reader event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// Reader is powering up.
    Connecting,

    /// Reader connected.
    Connected,

    /// Reader disconnected or the session was deactivated.
    Disconnected,

    /// A connection or swipe attempt timed out.
    Timeout(String),

    /// Swipe data is being read.
    SwipeProcessing,

    /// A swipe could not be read or parsed.
    SwipeError,

    /// A swipe was read and parsed.
    SwipeReceived(CardRecord),
}

/// Naming scheme used for events at the external boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventNaming {
    /// Short snake_case names (`connected`, `swipe_received`, ...).
    #[default]
    Canonical,

    /// Reader SDK notification names (`uniMagDidConnectNotification`, ...).
    ///
    /// Deactivation is reported as `uniMagDidDisconnectNotification` too,
    /// the same name a reader-initiated disconnect uses.
    Legacy,
}

impl DomainEvent {
    /// Event name under the given naming scheme.
    ///
    /// All timeouts share one legacy name; the reason tells them apart.
    ///
    /// # Examples
    ///
    /// ```
    /// use swipekit_session::{DomainEvent, EventNaming};
    ///
    /// assert_eq!(DomainEvent::Connected.name(EventNaming::Canonical), "connected");
    /// assert_eq!(
    ///     DomainEvent::Connected.name(EventNaming::Legacy),
    ///     "uniMagDidConnectNotification"
    /// );
    /// ```
    pub fn name(&self, naming: EventNaming) -> &'static str {
        match naming {
            EventNaming::Canonical => match self {
                Self::Connecting => "connecting",
                Self::Connected => "connected",
                Self::Disconnected => "disconnected",
                Self::Timeout(_) => "timeout",
                Self::SwipeProcessing => "swipe_processing",
                Self::SwipeError => "swipe_error",
                Self::SwipeReceived(_) => "swipe_received",
            },
            EventNaming::Legacy => match self {
                Self::Connecting => "uniMagPoweringNotification",
                Self::Connected => "uniMagDidConnectNotification",
                Self::Disconnected => "uniMagDidDisconnectNotification",
                Self::Timeout(_) => "uniMagTimeoutSwipeNotification",
                Self::SwipeProcessing => "uniMagDataProcessingNotification",
                Self::SwipeError => "uniMagInvalidSwipeNotification",
                Self::SwipeReceived(_) => "uniMagDidReceiveDataNotification",
            },
        }
    }

    /// JSON payload carried by the event, if any.
    ///
    /// Timeouts carry their reason string, received swipes the parsed record.
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            Self::Timeout(reason) => Some(serde_json::Value::String(reason.clone())),
            Self::SwipeReceived(record) => serde_json::to_value(record).ok(),
            _ => None,
        }
    }
}

/// An event as delivered to external consumers.
///
/// # Examples
///
/// ```
/// use swipekit_session::{DomainEvent, EventEnvelope, EventNaming};
///
/// let event = DomainEvent::Timeout("Swipe timed out.".into());
/// let envelope = EventEnvelope::new(&event, EventNaming::Canonical);
/// let json = serde_json::to_value(&envelope).unwrap();
/// assert_eq!(json["name"], "timeout");
/// assert_eq!(json["data"], "Swipe timed out.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name under the configured naming scheme.
    pub name: String,

    /// Event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// When the envelope was created.
    pub emitted_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Wrap an event, stamping it with the current time.
    pub fn new(event: &DomainEvent, naming: EventNaming) -> Self {
        Self {
            name: event.name(naming).to_string(),
            data: event.data(),
            emitted_at: Utc::now(),
        }
    }
}
