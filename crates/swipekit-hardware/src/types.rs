//! Types shared between the session and reader implementations.
//!
//! This module defines the reader configuration, the synchronous task
//! status codes, the raw notification set a reader emits, and the sink those
//! notifications are delivered through.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use swipekit_core::ReaderType;
use swipekit_core::constants::{
    AUTO_ADJUST_VOLUME, AUTO_CONNECT, DEFAULT_LOGGING_ENABLED, SWIPE_TIMEOUT_SECS,
};
use tokio::sync::mpsc;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "uniMag II", "Mock Swiper").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Configuration applied to a reader when it is opened.
///
/// Auto-connect, the swipe timeout and volume adjustment are fixed by the
/// integration; only the model hint and SDK logging vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Connect automatically when a reader is attached.
    pub auto_connect: bool,

    /// Time the reader waits for a card after a swipe request.
    pub swipe_timeout: Duration,

    /// Raise playback volume automatically for audio-jack readers.
    pub auto_adjust_volume: bool,

    /// Optional reader model hint.
    pub reader_type: Option<ReaderType>,

    /// Enable SDK-side logging. Has no effect on parsing or session state.
    pub sdk_logging: bool,
}

impl ReaderConfig {
    /// Fixed configuration with the given model hint and logging flag.
    pub fn new(reader_type: Option<ReaderType>, sdk_logging: bool) -> Self {
        Self {
            reader_type,
            sdk_logging,
            ..Self::default()
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            auto_connect: AUTO_CONNECT,
            swipe_timeout: Duration::from_secs(SWIPE_TIMEOUT_SECS),
            auto_adjust_volume: AUTO_ADJUST_VOLUME,
            reader_type: None,
            sdk_logging: DEFAULT_LOGGING_ENABLED,
        }
    }
}

/// Synchronous result of asking the reader to start a task.
///
/// Returned by the connection (`start`) and swipe requests. Asynchronous
/// outcomes arrive later as [`HardwareNotification`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Task started.
    Success,

    /// No reader is attached.
    NoReader,

    /// The connection task has not completed.
    NotConnected,

    /// Reader is already connected.
    AlreadyConnected,

    /// Mono audio is enabled on the host.
    MonoAudio,

    /// Host playback volume is too low.
    LowVolume,

    /// The SDK is running another task.
    SdkBusy,

    /// Driver-specific status code with no dedicated variant.
    Other(i32),
}

impl TaskStatus {
    /// Human-readable explanation for non-success statuses.
    pub fn description(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::NoReader => Some("No reader is attached."),
            Self::NotConnected => Some("Connection task must be run first."),
            Self::AlreadyConnected => Some("Reader is already connected."),
            Self::MonoAudio => Some("Mono audio is enabled."),
            Self::LowVolume => Some("Device playback volume is too low."),
            Self::SdkBusy => Some("SDK is busy running another task."),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.description()) {
            (Self::Success, _) => write!(f, "Success"),
            (Self::Other(code), _) => write!(f, "Unrecognized status code {}", code),
            (_, Some(description)) => write!(f, "{}", description),
            (_, None) => write!(f, "{:?}", self),
        }
    }
}

/// Raw track payload from a successful swipe.
///
/// Consumed once by the parser; never logged or published.
#[derive(Clone, PartialEq, Eq)]
pub struct RawSwipePayload(Bytes);

impl RawSwipePayload {
    /// Wrap payload bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the reader delivered no data.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawSwipePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSwipePayload({} bytes)", self.0.len())
    }
}

/// Asynchronous notification emitted by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareNotification {
    /// Reader is powering up; may end in a timeout rather than a connection.
    Powering,

    /// Reader connected. Swipes can be requested from now on.
    Connected,

    /// Reader detached or lost its connection.
    Disconnected,

    /// Connection task timed out.
    ConnectionTimeout,

    /// Host volume is too low to power the reader.
    InsufficientPower,

    /// Mono audio is enabled on the host, blocking the connection.
    MonoAudioError,

    /// Data started arriving after a swipe request.
    DataProcessing,

    /// A swipe was read successfully.
    SwipeReceived(RawSwipePayload),

    /// No card was swiped before the swipe timeout.
    SwipeTimeout,

    /// The reader could not read the swipe (crooked or partial swipe).
    InvalidSwipe,
}

impl HardwareNotification {
    /// SDK notification name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Powering => "uniMagPoweringNotification",
            Self::Connected => "uniMagDidConnectNotification",
            Self::Disconnected => "uniMagDidDisconnectNotification",
            Self::ConnectionTimeout => "uniMagTimeoutNotification",
            Self::InsufficientPower => "uniMagInsufficientPowerNotification",
            Self::MonoAudioError => "uniMagMonoAudioErrorNotification",
            Self::DataProcessing => "uniMagDataProcessingNotification",
            Self::SwipeReceived(_) => "uniMagDidReceiveDataNotification",
            Self::SwipeTimeout => "uniMagTimeoutSwipeNotification",
            Self::InvalidSwipe => "uniMagInvalidSwipeNotification",
        }
    }

    /// Returns `true` if this notification finishes a pending swipe request.
    pub fn ends_swipe_task(&self) -> bool {
        matches!(
            self,
            Self::SwipeReceived(_) | Self::SwipeTimeout | Self::InvalidSwipe | Self::Disconnected
        )
    }
}

/// Identifier of one notification subscription.
///
/// A new subscription is created for every activation; notifications tagged
/// with a retired subscription are dropped by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Create a subscription identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The identifier following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A notification together with the subscription it was emitted under.
#[derive(Debug, Clone)]
pub struct TaggedNotification {
    /// Subscription the emitting reader was opened with.
    pub subscription: SubscriptionId,

    /// The notification itself.
    pub notification: HardwareNotification,
}

/// Delivery endpoint handed to a reader when it is opened.
///
/// Readers call [`notify`](NotificationSink::notify) from whatever thread
/// their SDK calls back on. Delivery never blocks; notifications keep the
/// order in which they were emitted.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    subscription: SubscriptionId,
    tx: mpsc::UnboundedSender<TaggedNotification>,
}

impl NotificationSink {
    /// Create a sink that tags every notification with `subscription`.
    pub fn new(
        subscription: SubscriptionId,
        tx: mpsc::UnboundedSender<TaggedNotification>,
    ) -> Self {
        Self { subscription, tx }
    }

    /// Subscription this sink belongs to.
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Deliver a notification.
    ///
    /// Returns `false` if the receiving side has shut down.
    pub fn notify(&self, notification: HardwareNotification) -> bool {
        self.tx
            .send(TaggedNotification {
                subscription: self.subscription,
                notification,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("uniMag II", "UM-II").with_firmware_version("v4.1");

        assert_eq!(info.name, "uniMag II");
        assert_eq!(info.model, "UM-II");
        assert_eq!(info.firmware_version, Some("v4.1".to_string()));
    }

    #[test]
    fn test_reader_config_fixed_values() {
        let config = ReaderConfig::new(Some(ReaderType::Shuttle), false);

        assert!(config.auto_connect);
        assert!(config.auto_adjust_volume);
        assert_eq!(config.swipe_timeout, Duration::from_secs(30));
        assert_eq!(config.reader_type, Some(ReaderType::Shuttle));
        assert!(!config.sdk_logging);
    }

    #[test]
    fn test_task_status_description() {
        assert_eq!(TaskStatus::Success.description(), None);
        assert_eq!(
            TaskStatus::NoReader.description(),
            Some("No reader is attached.")
        );
        assert_eq!(
            TaskStatus::SdkBusy.to_string(),
            "SDK is busy running another task."
        );
        assert_eq!(TaskStatus::Other(42).to_string(), "Unrecognized status code 42");
    }

    #[test]
    fn test_payload_debug_hides_content() {
        let payload = RawSwipePayload::new(&b"%B4111111111111111^DOE/JOHN^2512"[..]);
        let debug = format!("{:?}", payload);
        assert_eq!(debug, "RawSwipePayload(32 bytes)");
        assert_eq!(payload.len(), 32);
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_notification_ends_swipe_task() {
        let payload = RawSwipePayload::new(Bytes::from_static(b"%B"));
        assert!(HardwareNotification::SwipeReceived(payload).ends_swipe_task());
        assert!(HardwareNotification::SwipeTimeout.ends_swipe_task());
        assert!(HardwareNotification::InvalidSwipe.ends_swipe_task());
        assert!(HardwareNotification::Disconnected.ends_swipe_task());
        assert!(!HardwareNotification::DataProcessing.ends_swipe_task());
        assert!(!HardwareNotification::Powering.ends_swipe_task());
    }

    #[test]
    fn test_subscription_id_next() {
        let id = SubscriptionId::new(7);
        assert_eq!(id.next(), SubscriptionId::new(8));
        assert_eq!(id.to_string(), "#7");
    }

    #[tokio::test]
    async fn test_sink_tags_and_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = NotificationSink::new(SubscriptionId::new(3), tx);

        assert!(sink.notify(HardwareNotification::Powering));
        assert!(sink.notify(HardwareNotification::Connected));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.subscription, SubscriptionId::new(3));
        assert_eq!(first.notification, HardwareNotification::Powering);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.notification, HardwareNotification::Connected);
    }

    #[test]
    fn test_sink_reports_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = NotificationSink::new(SubscriptionId::new(1), tx);
        drop(rx);
        assert!(!sink.notify(HardwareNotification::Connected));
    }
}
