//! Reader session.
//!
//! A [`ReaderSession`] owns the single connection to a swipe reader. All
//! state lives in one worker task; the session value is a cheap, cloneable
//! handle that sends commands to it and awaits the reply.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Command (mpsc)   ┌────────────────┐
//! │ ReaderSession│──────────────────►│                │
//! │ (handles)    │◄──────────────────│ Session worker │
//! └──────────────┘  reply (oneshot)  │  StateMachine  │
//!                                    │  SwipeDevice   │──────► EventRelay ──► listeners
//! ┌──────────────┐  Notification     │                │
//! │ Reader SDK   │──────────────────►│                │
//! └──────────────┘  (unbounded)      └────────────────┘
//! ```
//!
//! Notifications are handled before pending commands and in the order the
//! reader emitted them. Hardware commands never interleave.
//!
//! # Examples
//!
//! ```
//! use swipekit_hardware::mock::MockConnector;
//! use swipekit_session::{
//!     ActivationOutcome, DomainEvent, ReaderSession, SessionConfig, SwipeOutcome,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (connector, reader) = MockConnector::new();
//!     let session = ReaderSession::spawn(connector, SessionConfig::default())?;
//!     let mut events = session.subscribe();
//!
//!     assert_eq!(session.activate().await?, ActivationOutcome::Activated);
//!     assert_eq!(session.request_swipe().await?, SwipeOutcome::Started);
//!
//!     reader.present_swipe(&b"%B4111111111111111^DOE/JOHN^2512"[..])?;
//!     while let Some(event) = events.recv().await {
//!         if let DomainEvent::SwipeReceived(record) = event {
//!             assert_eq!(record.last_name, "DOE");
//!             break;
//!         }
//!     }
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use swipekit_core::ReaderType;
use swipekit_hardware::devices::{AnySwipeConnector, AnySwipeDevice};
use swipekit_hardware::{
    NotificationSink, ReaderConfig, SwipeConnector, SwipeDevice, TaggedNotification, TaskStatus,
};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::{DomainEvent, EventEnvelope, EventNaming};
use crate::lifecycle::{LifecycleEvent, LifecycleOutcome};
use crate::relay::EventRelay;
use crate::state_machine::{ReaderState, StateMachine, StateTransition};

/// Result of [`ReaderSession::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationOutcome {
    /// The reader connection was started.
    Activated,

    /// The connection was started but no reader is attached yet.
    ///
    /// The reader connects on its own once attached.
    NoReaderPresent,

    /// The session was already active; nothing was done.
    AlreadyActive,
}

impl ActivationOutcome {
    /// Status string reported at the external boundary.
    pub fn as_status(self) -> &'static str {
        match self {
            Self::Activated | Self::AlreadyActive => "activated",
            Self::NoReaderPresent => "no_reader",
        }
    }
}

/// Result of [`ReaderSession::deactivate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeactivationOutcome {
    /// The reader connection was released.
    Deactivated,

    /// The session was not active; nothing was done.
    AlreadyInactive,
}

impl DeactivationOutcome {
    /// Status string reported at the external boundary.
    pub fn as_status(self) -> &'static str {
        match self {
            Self::Deactivated => "deactivated",
            Self::AlreadyInactive => "already_inactive",
        }
    }
}

/// Result of [`ReaderSession::request_swipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeOutcome {
    /// The reader is waiting for a card.
    Started,

    /// The session is active but no reader is connected.
    NotConnected,
}

impl SwipeOutcome {
    /// Status string reported at the external boundary.
    pub fn as_status(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::NotConnected => "not_connected",
        }
    }
}

macro_rules! impl_status_display {
    ($($outcome:ty),*) => {
        $(impl fmt::Display for $outcome {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_status())
            }
        })*
    };
}

impl_status_display!(ActivationOutcome, DeactivationOutcome, SwipeOutcome);

/// Who asked for an activation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Caller,
    Lifecycle,
}

enum Command {
    Activate {
        origin: Origin,
        reply: oneshot::Sender<Result<ActivationOutcome>>,
    },
    Deactivate {
        origin: Origin,
        reply: oneshot::Sender<DeactivationOutcome>,
    },
    RequestSwipe {
        reply: oneshot::Sender<Result<SwipeOutcome>>,
    },
    Lifecycle {
        event: LifecycleEvent,
        reply: oneshot::Sender<Result<LifecycleOutcome>>,
    },
    SetLogging {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    SetReaderType {
        reader_type: Option<ReaderType>,
        reply: oneshot::Sender<()>,
    },
    State {
        reply: oneshot::Sender<ReaderState>,
    },
    History {
        reply: oneshot::Sender<Vec<StateTransition>>,
    },
    Shutdown {
        reply: oneshot::Sender<DeactivationOutcome>,
    },
}

/// Handle to a running reader session.
///
/// Clones share the same session. The worker deactivates the reader and
/// stops once [`shutdown`](ReaderSession::shutdown) is called or every
/// handle has been dropped.
#[derive(Clone)]
pub struct ReaderSession {
    commands: mpsc::Sender<Command>,
    relay: Arc<EventRelay>,
    naming: EventNaming,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ReaderSession {
    /// Start a session worker for the given reader.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn spawn(
        connector: impl Into<AnySwipeConnector>,
        config: SessionConfig,
    ) -> swipekit_core::Result<Self> {
        config.validate()?;

        let relay = Arc::new(EventRelay::new());
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let worker = SessionWorker {
            connector: connector.into(),
            device: None,
            machine: StateMachine::new(),
            relay: Arc::clone(&relay),
            reader_config: config.reader_config()?,
            wants_active: false,
            notify_tx,
        };
        let task = tokio::spawn(worker.run(command_rx, notify_rx));

        debug!(naming = ?config.event_naming, "Reader session started");
        Ok(Self {
            commands: command_tx,
            relay,
            naming: config.event_naming,
            worker: Arc::new(Mutex::new(Some(task))),
        })
    }

    /// Open and start the reader connection.
    ///
    /// Idempotent: if the session is not inactive, returns
    /// [`ActivationOutcome::AlreadyActive`] without touching the reader.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ActivationRejected`] if the reader refused to start
    /// - [`SessionError::Hardware`] if the reader could not be opened
    /// - [`SessionError::SessionClosed`] if the session has shut down
    ///
    /// The session is inactive again after any error.
    pub async fn activate(&self) -> Result<ActivationOutcome> {
        self.call(|reply| Command::Activate {
            origin: Origin::Caller,
            reply,
        })
        .await?
    }

    /// Release the reader connection.
    ///
    /// Idempotent and infallible; teardown errors are logged. A session that
    /// has shut down is always inactive and reports
    /// [`DeactivationOutcome::AlreadyInactive`].
    pub async fn deactivate(&self) -> DeactivationOutcome {
        self.call(|reply| Command::Deactivate {
            origin: Origin::Caller,
            reply,
        })
        .await
        .unwrap_or(DeactivationOutcome::AlreadyInactive)
    }

    /// Ask the reader to wait for a swipe.
    ///
    /// A new request supersedes one that is still pending.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotActivated`] if the session is not active
    /// - [`SessionError::SwipeRejected`] if the reader refused the request
    /// - [`SessionError::SessionClosed`] if the session has shut down
    pub async fn request_swipe(&self) -> Result<SwipeOutcome> {
        self.call(|reply| Command::RequestSwipe { reply }).await?
    }

    /// React to a host application lifecycle transition.
    ///
    /// # Errors
    ///
    /// Returns the activation error if reactivation on resume fails.
    pub async fn handle_lifecycle(&self, event: LifecycleEvent) -> Result<LifecycleOutcome> {
        self.call(|reply| Command::Lifecycle { event, reply }).await?
    }

    /// Shorthand for [`handle_lifecycle`](Self::handle_lifecycle) with
    /// [`LifecycleEvent::Suspended`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionClosed`] if the session has shut down.
    pub async fn suspend(&self) -> Result<LifecycleOutcome> {
        self.handle_lifecycle(LifecycleEvent::Suspended).await
    }

    /// Shorthand for [`handle_lifecycle`](Self::handle_lifecycle) with
    /// [`LifecycleEvent::Resumed`].
    ///
    /// # Errors
    ///
    /// Returns the activation error if reactivation fails.
    pub async fn resume(&self) -> Result<LifecycleOutcome> {
        self.handle_lifecycle(LifecycleEvent::Resumed).await
    }

    /// Enable or disable SDK logging. Takes effect at the next activation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionClosed`] if the session has shut down.
    pub async fn set_logging(&self, enabled: bool) -> Result<()> {
        self.call(|reply| Command::SetLogging { enabled, reply }).await
    }

    /// Set the reader model hint. Takes effect at the next activation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionClosed`] if the session has shut down.
    pub async fn set_reader_type(&self, reader_type: Option<ReaderType>) -> Result<()> {
        self.call(|reply| Command::SetReaderType { reader_type, reply }).await
    }

    /// Current session state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionClosed`] if the session has shut down.
    pub async fn state(&self) -> Result<ReaderState> {
        self.call(|reply| Command::State { reply }).await
    }

    /// Recorded state transitions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionClosed`] if the session has shut down.
    pub async fn history(&self) -> Result<Vec<StateTransition>> {
        self.call(|reply| Command::History { reply }).await
    }

    /// Deactivate the reader and stop the worker.
    ///
    /// Later calls on any clone fail with [`SessionError::SessionClosed`].
    pub async fn shutdown(&self) -> DeactivationOutcome {
        let outcome = self
            .call(|reply| Command::Shutdown { reply })
            .await
            .unwrap_or(DeactivationOutcome::AlreadyInactive);

        if let Some(task) = self.worker.lock().await.take()
            && let Err(e) = task.await
        {
            error!(error = %e, "Session worker terminated abnormally");
        }
        outcome
    }

    /// Relay publishing this session's events.
    pub fn relay(&self) -> &Arc<EventRelay> {
        &self.relay
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DomainEvent> {
        self.relay.subscribe()
    }

    /// Configured naming scheme for external events.
    pub fn naming(&self) -> EventNaming {
        self.naming
    }

    /// Wrap an event for external delivery using the configured naming.
    pub fn envelope(&self, event: &DomainEvent) -> EventEnvelope {
        EventEnvelope::new(event, self.naming)
    }

    async fn call<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }
}

impl fmt::Debug for ReaderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSession")
            .field("relay", &self.relay)
            .field("naming", &self.naming)
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

/// Single owner of the reader connection and session state.
struct SessionWorker {
    connector: AnySwipeConnector,
    device: Option<AnySwipeDevice>,
    machine: StateMachine,
    relay: Arc<EventRelay>,
    reader_config: ReaderConfig,
    wants_active: bool,
    notify_tx: mpsc::UnboundedSender<TaggedNotification>,
}

impl SessionWorker {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut notifications: mpsc::UnboundedReceiver<TaggedNotification>,
    ) {
        loop {
            tokio::select! {
                biased;

                Some(tagged) = notifications.recv() => self.on_notification(tagged),

                command = commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        let outcome = self.deactivate(Origin::Caller).await;
                        let _ = reply.send(outcome);
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => {
                        self.deactivate(Origin::Caller).await;
                        break;
                    }
                },
            }
        }
        debug!("Reader session stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Activate { origin, reply } => {
                let _ = reply.send(self.activate(origin).await);
            }
            Command::Deactivate { origin, reply } => {
                let _ = reply.send(self.deactivate(origin).await);
            }
            Command::RequestSwipe { reply } => {
                let _ = reply.send(self.request_swipe().await);
            }
            Command::Lifecycle { event, reply } => {
                let _ = reply.send(self.on_lifecycle(event).await);
            }
            Command::SetLogging { enabled, reply } => {
                self.reader_config.sdk_logging = enabled;
                debug!(enabled, "SDK logging updated");
                let _ = reply.send(());
            }
            Command::SetReaderType { reader_type, reply } => {
                self.reader_config.reader_type = reader_type;
                debug!(?reader_type, "Reader type hint updated");
                let _ = reply.send(());
            }
            Command::State { reply } => {
                let _ = reply.send(self.machine.current_state());
            }
            Command::History { reply } => {
                let _ = reply.send(self.machine.history().iter().cloned().collect());
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(self.deactivate(Origin::Caller).await);
            }
        }
    }

    async fn activate(&mut self, origin: Origin) -> Result<ActivationOutcome> {
        let state = self.machine.current_state();
        if state != ReaderState::Inactive {
            debug!(%state, "Session already active");
            return Ok(ActivationOutcome::AlreadyActive);
        }

        self.machine.transition_to(ReaderState::Activating)?;
        let subscription = self.relay.open_subscription();
        let sink = NotificationSink::new(subscription, self.notify_tx.clone());
        info!(
            %subscription,
            reader_type = ?self.reader_config.reader_type,
            ?origin,
            "Activating reader"
        );

        let mut device = match self.connector.open(&self.reader_config, sink).await {
            Ok(device) => device,
            Err(e) => {
                warn!(error = %e, "Failed to open reader");
                self.abort_activation()?;
                return Err(e.into());
            }
        };

        let outcome = match device.start().await {
            TaskStatus::Success => ActivationOutcome::Activated,
            TaskStatus::NoReader => {
                info!("No reader attached; waiting for one to connect");
                ActivationOutcome::NoReaderPresent
            }
            status => {
                warn!(%status, "Reader rejected activation");
                if let Err(e) = device.release().await {
                    warn!(error = %e, "Failed to release rejected reader");
                }
                self.abort_activation()?;
                return Err(SessionError::ActivationRejected { status });
            }
        };

        match device.get_info().await {
            Ok(info) => info!(
                name = %info.name,
                model = %info.model,
                firmware = info.firmware_version.as_deref().unwrap_or("unknown"),
                "Reader opened"
            ),
            Err(e) => debug!(error = %e, "Reader info unavailable"),
        }

        self.device = Some(device);
        self.machine.transition_to(ReaderState::Connected)?;
        if origin == Origin::Caller {
            self.wants_active = true;
        }
        Ok(outcome)
    }

    fn abort_activation(&mut self) -> Result<()> {
        self.relay.close_subscription();
        self.machine.transition_to(ReaderState::Inactive)?;
        Ok(())
    }

    async fn deactivate(&mut self, origin: Origin) -> DeactivationOutcome {
        if origin == Origin::Caller {
            self.wants_active = false;
        }

        let state = self.machine.current_state();
        if !state.has_connection() {
            debug!(%state, "Session already inactive");
            return DeactivationOutcome::AlreadyInactive;
        }

        self.enter(ReaderState::Deactivating);
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.cancel_task().await {
                warn!(error = %e, "Failed to cancel reader task");
            }
            if let Err(e) = device.release().await {
                warn!(error = %e, "Failed to release reader");
            }
        }
        self.relay.close_subscription();
        self.enter(ReaderState::Inactive);

        info!(?origin, "Reader deactivated");
        self.relay.publish(&DomainEvent::Disconnected);
        DeactivationOutcome::Deactivated
    }

    async fn request_swipe(&mut self) -> Result<SwipeOutcome> {
        let Some(device) = self.device.as_mut() else {
            debug!("Swipe requested before activation");
            return Err(SessionError::NotActivated);
        };

        if !device.is_connected().await {
            debug!("Swipe requested without a connected reader");
            return Ok(SwipeOutcome::NotConnected);
        }

        // The reader runs one task at a time; a new request replaces the old one.
        if let Err(e) = device.cancel_task().await {
            warn!(error = %e, "Failed to cancel previous reader task");
        }
        if self.machine.current_state() == ReaderState::AwaitingSwipe {
            self.machine.transition_to(ReaderState::Connected)?;
        }
        self.machine.transition_to(ReaderState::AwaitingSwipe)?;

        match device.request_swipe().await {
            TaskStatus::Success => {
                debug!("Waiting for swipe");
                Ok(SwipeOutcome::Started)
            }
            status => {
                warn!(%status, "Reader rejected swipe request");
                self.machine.transition_to(ReaderState::Connected)?;
                Err(SessionError::SwipeRejected { status })
            }
        }
    }

    async fn on_lifecycle(&mut self, event: LifecycleEvent) -> Result<LifecycleOutcome> {
        if !self.wants_active {
            debug!(?event, "Lifecycle event ignored; session not wanted");
            return Ok(LifecycleOutcome::Ignored);
        }

        match event {
            LifecycleEvent::Suspended => Ok(LifecycleOutcome::Deactivated(
                self.deactivate(Origin::Lifecycle).await,
            )),
            LifecycleEvent::Resumed => self
                .activate(Origin::Lifecycle)
                .await
                .map(LifecycleOutcome::Activated),
        }
    }

    fn on_notification(&mut self, tagged: TaggedNotification) {
        let ends_swipe = tagged.notification.ends_swipe_task();
        if self.relay.dispatch(tagged).is_none() {
            return;
        }

        if ends_swipe && self.machine.current_state() == ReaderState::AwaitingSwipe {
            self.enter(ReaderState::Connected);
        }
    }

    /// Transition where the target is guaranteed legal by the caller.
    fn enter(&mut self, state: ReaderState) {
        if let Err(e) = self.machine.transition_to(state) {
            error!(error = %e, "Session state out of sync");
        }
    }
}
