//! Reader trait definitions.
//!
//! A reader is reached through two traits: a [`SwipeConnector`] that opens
//! the device, and the [`SwipeDevice`] it returns, which represents the one
//! live connection. Dropping or releasing the device ends the connection.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are not object-safe; use the enum wrappers in
//! [`devices`](crate::devices) where a single concrete type is needed.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, NotificationSink, ReaderConfig, TaskStatus};

/// Factory for reader connections.
///
/// # Examples
///
/// ```no_run
/// use swipekit_hardware::traits::{SwipeConnector, SwipeDevice};
/// use swipekit_hardware::types::{NotificationSink, ReaderConfig, TaskStatus};
/// use swipekit_hardware::Result;
///
/// async fn connect<C: SwipeConnector>(
///     connector: &C,
///     sink: NotificationSink,
/// ) -> Result<Option<C::Device>> {
///     let mut device = connector.open(&ReaderConfig::default(), sink).await?;
///
///     match device.start().await {
///         TaskStatus::Success | TaskStatus::NoReader => Ok(Some(device)),
///         _ => {
///             device.release().await?;
///             Ok(None)
///         }
///     }
/// }
/// ```
pub trait SwipeConnector: Send + Sync {
    /// Device type produced by this connector.
    type Device: SwipeDevice;

    /// Open a reader connection.
    ///
    /// The reader delivers every notification it emits for this connection
    /// through `sink`, starting immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader SDK cannot be initialized.
    async fn open(&self, config: &ReaderConfig, sink: NotificationSink) -> Result<Self::Device>;
}

/// One open reader connection.
///
/// Task methods return the SDK's synchronous [`TaskStatus`]; their eventual
/// outcome is reported through the notification sink.
pub trait SwipeDevice: Send + Sync {
    /// Start the connection task.
    ///
    /// With auto-connect enabled, [`TaskStatus::NoReader`] still leaves the
    /// device waiting for a reader to be attached.
    async fn start(&mut self) -> TaskStatus;

    /// Ask the reader to wait for a swipe.
    ///
    /// The reader accepts one outstanding task at a time; callers cancel the
    /// previous task first.
    async fn request_swipe(&mut self) -> TaskStatus;

    /// Cancel the outstanding task, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader could not be reached.
    async fn cancel_task(&mut self) -> Result<()>;

    /// Whether a reader is attached and its connection task has completed.
    async fn is_connected(&self) -> bool;

    /// Release the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK reports a failure while shutting down.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
