//! Reader abstraction layer for swipekit.
//!
//! This crate models an audio-jack magnetic stripe reader the way its vendor
//! SDK exposes it: a connection that is opened, started and released, task
//! requests that answer synchronously with a [`TaskStatus`], and a stream of
//! asynchronous [`HardwareNotification`]s delivered through a
//! [`NotificationSink`].
//!
//! - [`traits`] defines [`SwipeConnector`] and [`SwipeDevice`].
//! - [`devices`] provides enum wrappers for concrete dispatch.
//! - [`mock`] provides a scriptable reader for development and testing.
//!
//! # Example
//!
//! ```
//! use swipekit_hardware::mock::MockConnector;
//! use swipekit_hardware::{HardwareNotification, NotificationSink, ReaderConfig, SubscriptionId};
//! use swipekit_hardware::traits::{SwipeConnector, SwipeDevice};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> swipekit_hardware::Result<()> {
//!     let (connector, _handle) = MockConnector::new();
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let mut device = connector
//!         .open(&ReaderConfig::default(), NotificationSink::new(SubscriptionId::new(1), tx))
//!         .await?;
//!     device.start().await;
//!
//!     let first = rx.recv().await.map(|tagged| tagged.notification);
//!     assert_eq!(first, Some(HardwareNotification::Powering));
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{SwipeConnector, SwipeDevice};
pub use types::{
    DeviceInfo, HardwareNotification, NotificationSink, RawSwipePayload, ReaderConfig,
    SubscriptionId, TaggedNotification, TaskStatus,
};
