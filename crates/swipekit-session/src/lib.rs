//! Reader session and event relay for audio-jack magnetic stripe readers.
//!
//! - [`ReaderSession`] serializes activation, deactivation and swipe
//!   requests against the single reader connection.
//! - [`EventRelay`] normalizes reader notifications into [`DomainEvent`]s,
//!   parsing swipe data on the way, and fans them out to listeners.
//! - [`SessionConfig`] holds the settings applied at activation.
//!
//! # Outcomes and Errors
//!
//! Expected situations such as "no reader attached" are reported as `Ok`
//! outcomes. [`SessionError`] is returned only to the caller of the failing
//! operation; swipe parse failures never surface as errors and are published
//! as [`DomainEvent::SwipeError`] instead.

pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod relay;
pub mod session;
pub mod state_machine;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use events::{DomainEvent, EventEnvelope, EventNaming};
pub use lifecycle::{LifecycleEvent, LifecycleOutcome};
pub use relay::{EventListener, EventRelay, ListenerId};
pub use session::{ActivationOutcome, DeactivationOutcome, ReaderSession, SwipeOutcome};
pub use state_machine::{ReaderState, StateMachine, StateTransition};
