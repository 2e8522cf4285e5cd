//! Error types for session operations.

use swipekit_hardware::{HardwareError, TaskStatus};

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors returned to the caller of a session operation.
///
/// Parse failures never appear here; they are published as swipe-error
/// events instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A swipe was requested before the session was activated.
    #[error("Reader is not activated")]
    NotActivated,

    /// The reader refused to start its connection task.
    #[error("Activation rejected: {status}")]
    ActivationRejected { status: TaskStatus },

    /// The reader refused the swipe request.
    #[error("Swipe request rejected: {status}")]
    SwipeRejected { status: TaskStatus },

    /// The reader could not be opened.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Illegal state change; indicates a bug in the session.
    #[error(transparent)]
    State(#[from] swipekit_core::Error),

    /// The session worker has stopped.
    #[error("Session is closed")]
    SessionClosed,
}

impl SessionError {
    /// Returns `true` for errors that callers may treat as an expected outcome.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::NotActivated)
    }

    /// Status code carried by a rejection, if any.
    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::ActivationRejected { status } | Self::SwipeRejected { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_activated_is_soft() {
        assert!(SessionError::NotActivated.is_soft());
        assert!(!SessionError::SessionClosed.is_soft());
        assert!(
            !SessionError::ActivationRejected {
                status: TaskStatus::MonoAudio
            }
            .is_soft()
        );
    }

    #[test]
    fn test_rejection_messages_include_status() {
        let error = SessionError::ActivationRejected {
            status: TaskStatus::LowVolume,
        };
        assert_eq!(
            error.to_string(),
            "Activation rejected: Device playback volume is too low."
        );
        assert_eq!(error.status(), Some(TaskStatus::LowVolume));

        let error = SessionError::SwipeRejected {
            status: TaskStatus::Other(-7),
        };
        assert_eq!(
            error.to_string(),
            "Swipe request rejected: Unrecognized status code -7"
        );
    }

    #[test]
    fn test_hardware_error_conversion() {
        let error: SessionError = HardwareError::initialization_failed("no audio route").into();
        assert!(matches!(error, SessionError::Hardware(_)));
        assert_eq!(error.status(), None);
    }
}
