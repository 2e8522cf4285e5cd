//! Enum wrappers for reader dispatch.
//!
//! Native `async fn` in traits are not object-safe, so `Box<dyn SwipeDevice>`
//! is not available. These enums give the session a single concrete connector
//! and device type while keeping static dispatch.
//!
//! # Examples
//!
//! ```
//! use swipekit_hardware::devices::AnySwipeConnector;
//! use swipekit_hardware::mock::MockConnector;
//!
//! let (connector, _handle) = MockConnector::new();
//! let any_connector = AnySwipeConnector::Mock(connector);
//!
//! // Can now be handed to anything generic over SwipeConnector
//! # let _ = any_connector;
//! ```

use crate::mock::{MockConnector, MockSwiper};
use crate::traits::{SwipeConnector, SwipeDevice};
use crate::types::{DeviceInfo, NotificationSink, ReaderConfig, TaskStatus};
use crate::Result;

/// Enum wrapper for connector dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnySwipeConnector {
    /// Mock reader for development and testing.
    Mock(MockConnector),
}

impl From<MockConnector> for AnySwipeConnector {
    fn from(connector: MockConnector) -> Self {
        Self::Mock(connector)
    }
}

impl SwipeConnector for AnySwipeConnector {
    type Device = AnySwipeDevice;

    async fn open(&self, config: &ReaderConfig, sink: NotificationSink) -> Result<AnySwipeDevice> {
        match self {
            Self::Mock(connector) => connector.open(config, sink).await.map(AnySwipeDevice::Mock),
        }
    }
}

/// Enum wrapper for device dispatch.
///
/// # Examples
///
/// ```
/// use swipekit_hardware::devices::{AnySwipeConnector, AnySwipeDevice};
/// use swipekit_hardware::mock::MockConnector;
/// use swipekit_hardware::traits::{SwipeConnector, SwipeDevice};
/// use swipekit_hardware::types::{NotificationSink, ReaderConfig, SubscriptionId};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> swipekit_hardware::Result<()> {
///     let (connector, _handle) = MockConnector::new();
///     let connector = AnySwipeConnector::Mock(connector);
///     let (tx, _rx) = mpsc::unbounded_channel();
///
///     let device: AnySwipeDevice = connector
///         .open(&ReaderConfig::default(), NotificationSink::new(SubscriptionId::new(1), tx))
///         .await?;
///
///     let info = device.get_info().await?;
///     println!("Reader: {}", info.name);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySwipeDevice {
    /// Mock reader for development and testing.
    Mock(MockSwiper),
    // TODO: add a `UniMag` variant behind the `hardware-unimag` feature once
    // native SDK bindings exist.
}

impl SwipeDevice for AnySwipeDevice {
    async fn start(&mut self) -> TaskStatus {
        match self {
            Self::Mock(device) => device.start().await,
        }
    }

    async fn request_swipe(&mut self) -> TaskStatus {
        match self {
            Self::Mock(device) => device.request_swipe().await,
        }
    }

    async fn cancel_task(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.cancel_task().await,
        }
    }

    async fn is_connected(&self) -> bool {
        match self {
            Self::Mock(device) => device.is_connected().await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.release().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}
