//! Mock swipe reader implementation for testing and development.
//!
//! This module provides a simulated audio-jack swipe reader that can be
//! controlled programmatically through a [`MockSwiperHandle`]: attach and
//! detach the reader, script the status codes returned by task requests,
//! and swipe cards.

use crate::{
    HardwareError, Result,
    traits::{SwipeConnector, SwipeDevice},
    types::{
        DeviceInfo, HardwareNotification, NotificationSink, RawSwipePayload, ReaderConfig,
        TaskStatus,
    },
};
use bytes::Bytes;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// State shared between the connector, the device and the handle.
#[derive(Debug)]
struct MockState {
    name: String,
    reader_attached: bool,
    start_status: Option<TaskStatus>,
    swipe_status: Option<TaskStatus>,
    open_error: Option<String>,
    fail_teardown: bool,

    started: bool,
    swipe_pending: bool,
    sink: Option<NotificationSink>,
    last_config: Option<ReaderConfig>,

    open_count: usize,
    swipe_request_count: usize,
    cancel_count: usize,
    release_count: usize,
    info_count: usize,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Send a notification through the sink of the most recent connection.
///
/// The sink is kept after release so that tests can deliver notifications
/// the way a real SDK does when it calls back late.
fn emit(state: &Shared, notification: HardwareNotification) -> bool {
    let sink = lock(state).sink.clone();
    match sink {
        Some(sink) => {
            debug!(notification = notification.name(), "Mock swiper emitting");
            sink.notify(notification)
        }
        None => false,
    }
}

/// Mock connector producing [`MockSwiper`] devices.
///
/// # Examples
///
/// ```
/// use swipekit_hardware::mock::MockConnector;
/// use swipekit_hardware::traits::{SwipeConnector, SwipeDevice};
/// use swipekit_hardware::types::{NotificationSink, ReaderConfig, SubscriptionId, TaskStatus};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> swipekit_hardware::Result<()> {
///     let (connector, handle) = MockConnector::new();
///     let (tx, _rx) = mpsc::unbounded_channel();
///     let sink = NotificationSink::new(SubscriptionId::new(1), tx);
///
///     let mut device = connector.open(&ReaderConfig::default(), sink).await?;
///     assert_eq!(device.start().await, TaskStatus::Success);
///     assert_eq!(device.request_swipe().await, TaskStatus::Success);
///
///     handle.present_swipe(&b"%B4111111111111111^DOE/JOHN^2512"[..])?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockConnector {
    state: Shared,
}

impl MockConnector {
    /// Create a new mock connector with the default name and an attached reader.
    ///
    /// Returns a tuple of (MockConnector, MockSwiperHandle) where the handle
    /// controls every device the connector opens.
    pub fn new() -> (Self, MockSwiperHandle) {
        Self::with_name("Mock Swiper")
    }

    /// Create a new mock connector with a custom device name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockSwiperHandle) {
        let state = Arc::new(Mutex::new(MockState {
            name: name.into(),
            reader_attached: true,
            start_status: None,
            swipe_status: None,
            open_error: None,
            fail_teardown: false,
            started: false,
            swipe_pending: false,
            sink: None,
            last_config: None,
            open_count: 0,
            swipe_request_count: 0,
            cancel_count: 0,
            release_count: 0,
            info_count: 0,
        }));

        (
            Self {
                state: Arc::clone(&state),
            },
            MockSwiperHandle { state },
        )
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new().0
    }
}

impl SwipeConnector for MockConnector {
    type Device = MockSwiper;

    async fn open(&self, config: &ReaderConfig, sink: NotificationSink) -> Result<MockSwiper> {
        let mut state = lock(&self.state);

        if let Some(message) = state.open_error.clone() {
            return Err(HardwareError::initialization_failed(message));
        }

        state.open_count += 1;
        state.started = false;
        state.swipe_pending = false;
        state.last_config = Some(config.clone());
        debug!(
            subscription = %sink.subscription(),
            opens = state.open_count,
            "Mock swiper opened"
        );
        state.sink = Some(sink);

        Ok(MockSwiper {
            state: Arc::clone(&self.state),
            released: false,
        })
    }
}

/// Mock swipe reader connection.
#[derive(Debug)]
pub struct MockSwiper {
    state: Shared,
    released: bool,
}

impl MockSwiper {
    fn ensure_open(&self) -> Result<()> {
        if self.released {
            return Err(HardwareError::disconnected(lock(&self.state).name.clone()));
        }
        Ok(())
    }
}

impl SwipeDevice for MockSwiper {
    async fn start(&mut self) -> TaskStatus {
        if self.released {
            return TaskStatus::NotConnected;
        }

        let (status, announce) = {
            let mut state = lock(&self.state);
            if let Some(status) = state.start_status {
                (status, false)
            } else if !state.reader_attached {
                // Auto-connect keeps the task alive until a reader appears.
                state.started = true;
                (TaskStatus::NoReader, false)
            } else {
                state.started = true;
                (TaskStatus::Success, true)
            }
        };

        if announce {
            emit(&self.state, HardwareNotification::Powering);
            emit(&self.state, HardwareNotification::Connected);
        }
        status
    }

    async fn request_swipe(&mut self) -> TaskStatus {
        if self.released {
            return TaskStatus::NotConnected;
        }

        let mut state = lock(&self.state);
        if let Some(status) = state.swipe_status {
            return status;
        }
        if !(state.started && state.reader_attached) {
            return TaskStatus::NotConnected;
        }
        if state.swipe_pending {
            return TaskStatus::SdkBusy;
        }

        state.swipe_pending = true;
        state.swipe_request_count += 1;
        TaskStatus::Success
    }

    async fn cancel_task(&mut self) -> Result<()> {
        self.ensure_open()?;

        let mut state = lock(&self.state);
        state.cancel_count += 1;
        state.swipe_pending = false;
        if state.fail_teardown {
            return Err(HardwareError::communication("cancel rejected by mock"));
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        let state = lock(&self.state);
        !self.released && state.started && state.reader_attached
    }

    async fn release(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.released = true;

        let mut state = lock(&self.state);
        state.release_count += 1;
        state.started = false;
        state.swipe_pending = false;
        if state.fail_teardown {
            return Err(HardwareError::communication("release rejected by mock"));
        }
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let mut state = lock(&self.state);
        state.info_count += 1;
        Ok(DeviceInfo::new(state.name.clone(), "Mock").with_firmware_version("mock-1.0"))
    }
}

/// Handle for controlling mock swipe readers.
///
/// Cloning the handle shares the same simulated hardware.
#[derive(Debug, Clone)]
pub struct MockSwiperHandle {
    state: Shared,
}

impl MockSwiperHandle {
    /// Attach the reader. Emits `Connected` if a connection task is running.
    pub fn attach_reader(&self) {
        let started = {
            let mut state = lock(&self.state);
            state.reader_attached = true;
            state.started
        };
        if started {
            emit(&self.state, HardwareNotification::Connected);
        }
    }

    /// Detach the reader. Emits `Disconnected` if a connection task is running.
    pub fn detach_reader(&self) {
        let started = {
            let mut state = lock(&self.state);
            state.reader_attached = false;
            state.swipe_pending = false;
            state.started
        };
        if started {
            emit(&self.state, HardwareNotification::Disconnected);
        }
    }

    /// Swipe a card.
    ///
    /// Emits `DataProcessing` followed by `SwipeReceived` with the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if no swipe request is pending.
    pub fn present_swipe(&self, payload: impl Into<Bytes>) -> Result<()> {
        self.finish_swipe()?;
        emit(&self.state, HardwareNotification::DataProcessing);
        emit(
            &self.state,
            HardwareNotification::SwipeReceived(RawSwipePayload::new(payload)),
        );
        Ok(())
    }

    /// Simulate a swipe the reader could not read.
    ///
    /// # Errors
    ///
    /// Returns an error if no swipe request is pending.
    pub fn present_unreadable_swipe(&self) -> Result<()> {
        self.finish_swipe()?;
        emit(&self.state, HardwareNotification::DataProcessing);
        emit(&self.state, HardwareNotification::InvalidSwipe);
        Ok(())
    }

    /// Let the pending swipe request time out.
    ///
    /// # Errors
    ///
    /// Returns an error if no swipe request is pending.
    pub fn expire_swipe(&self) -> Result<()> {
        self.finish_swipe()?;
        emit(&self.state, HardwareNotification::SwipeTimeout);
        Ok(())
    }

    /// Deliver an arbitrary notification through the most recent connection's sink.
    ///
    /// Works after release as well, which simulates late SDK callbacks.
    pub fn notify(&self, notification: HardwareNotification) -> bool {
        emit(&self.state, notification)
    }

    /// Force the status returned by `start`. `None` restores normal behaviour.
    pub fn set_start_status(&self, status: Option<TaskStatus>) {
        lock(&self.state).start_status = status;
    }

    /// Force the status returned by `request_swipe`. `None` restores normal behaviour.
    pub fn set_swipe_status(&self, status: Option<TaskStatus>) {
        lock(&self.state).swipe_status = status;
    }

    /// Make `open` fail with the given message. `None` restores normal behaviour.
    pub fn set_open_error(&self, message: Option<String>) {
        lock(&self.state).open_error = message;
    }

    /// Make `cancel_task` and `release` report errors.
    pub fn set_fail_teardown(&self, fail: bool) {
        lock(&self.state).fail_teardown = fail;
    }

    /// Whether a connection task is running.
    pub fn is_started(&self) -> bool {
        lock(&self.state).started
    }

    /// Whether a swipe request is waiting for a card.
    pub fn is_swipe_pending(&self) -> bool {
        lock(&self.state).swipe_pending
    }

    /// Number of hardware tasks waiting for completion (0 or 1).
    pub fn outstanding_tasks(&self) -> usize {
        usize::from(lock(&self.state).swipe_pending)
    }

    /// Number of times a device was opened.
    pub fn open_count(&self) -> usize {
        lock(&self.state).open_count
    }

    /// Number of accepted swipe requests.
    pub fn swipe_request_count(&self) -> usize {
        lock(&self.state).swipe_request_count
    }

    /// Number of `cancel_task` calls.
    pub fn cancel_count(&self) -> usize {
        lock(&self.state).cancel_count
    }

    /// Number of `release` calls.
    pub fn release_count(&self) -> usize {
        lock(&self.state).release_count
    }

    /// Number of `get_info` calls.
    pub fn info_count(&self) -> usize {
        lock(&self.state).info_count
    }

    /// Configuration passed to the most recent `open`.
    pub fn last_config(&self) -> Option<ReaderConfig> {
        lock(&self.state).last_config.clone()
    }

    fn finish_swipe(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.swipe_pending {
            return Err(HardwareError::invalid_data("No swipe requested"));
        }
        state.swipe_pending = false;
        Ok(())
    }
}
