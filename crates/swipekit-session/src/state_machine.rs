//! Reader session state machine.
//!
//! # States
//!
//! - `Inactive`: no reader connection exists
//! - `Activating`: the reader is being opened and started
//! - `Connected`: a connection exists; swipes can be requested
//! - `AwaitingSwipe`: a swipe request is outstanding
//! - `Deactivating`: the connection is being torn down
//!
//! # Valid Transitions
//!
//! - Inactive → Activating → Connected
//! - Activating → Inactive (activation rejected)
//! - Connected → AwaitingSwipe → Connected
//! - Connected/AwaitingSwipe → Deactivating → Inactive
//!
//! # Examples
//!
//! ```
//! use swipekit_session::{ReaderState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), ReaderState::Inactive);
//!
//! machine.transition_to(ReaderState::Activating).unwrap();
//! assert!(machine.transition_to(ReaderState::AwaitingSwipe).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use swipekit_core::constants::MAX_HISTORY_SIZE;
use swipekit_core::{Error, Result};

/// Connection state of a reader session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderState {
    /// No reader connection exists.
    #[default]
    Inactive,

    /// The reader is being opened and started.
    Activating,

    /// A reader connection exists, possibly still waiting for a reader.
    Connected,

    /// A swipe request is outstanding.
    AwaitingSwipe,

    /// The connection is being torn down.
    Deactivating,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ReaderState::Inactive => "Inactive",
            ReaderState::Activating => "Activating",
            ReaderState::Connected => "Connected",
            ReaderState::AwaitingSwipe => "AwaitingSwipe",
            ReaderState::Deactivating => "Deactivating",
        };
        write!(f, "{}", state_str)
    }
}

impl ReaderState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use swipekit_session::ReaderState;
    ///
    /// assert!(ReaderState::Inactive.can_transition_to(&ReaderState::Activating));
    /// assert!(!ReaderState::Inactive.can_transition_to(&ReaderState::Connected));
    /// ```
    pub fn can_transition_to(&self, target: &ReaderState) -> bool {
        matches!(
            (self, target),
            (ReaderState::Inactive, ReaderState::Activating)
                | (ReaderState::Activating, ReaderState::Connected | ReaderState::Inactive)
                | (ReaderState::Connected, ReaderState::AwaitingSwipe | ReaderState::Deactivating)
                | (ReaderState::AwaitingSwipe, ReaderState::Connected | ReaderState::Deactivating)
                | (ReaderState::Deactivating, ReaderState::Inactive)
        )
    }

    /// Returns `true` if a reader connection exists in this state.
    pub fn has_connection(&self) -> bool {
        matches!(self, ReaderState::Connected | ReaderState::AwaitingSwipe)
    }
}

/// A single state transition with timestamp.
///
/// The `timestamp` is process-local and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: ReaderState,

    /// The state transitioned to.
    pub to: ReaderState,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a new state transition record stamped with the current time.
    pub fn new(from: ReaderState, to: ReaderState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time elapsed since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine tracking a reader session.
///
/// Not synchronized; the session worker is its only owner.
///
/// # Examples
///
/// ```
/// use swipekit_session::{ReaderState, StateMachine};
///
/// let mut machine = StateMachine::new();
/// machine.transition_to(ReaderState::Activating).unwrap();
/// machine.transition_to(ReaderState::Connected).unwrap();
/// machine.transition_to(ReaderState::AwaitingSwipe).unwrap();
///
/// assert_eq!(machine.history().len(), 3);
/// ```
#[derive(Debug)]
pub struct StateMachine {
    current_state: ReaderState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the `Inactive` state.
    pub fn new() -> Self {
        Self {
            current_state: ReaderState::Inactive,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Current state.
    pub fn current_state(&self) -> ReaderState {
        self.current_state
    }

    /// Time elapsed in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// allowed from the current state. The state is left unchanged.
    pub fn transition_to(&mut self, new_state: ReaderState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        self.add_to_history(transition.clone());

        Ok(transition)
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
