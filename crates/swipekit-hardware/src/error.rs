//! Error types for hardware operations.
//!
//! Status codes the reader SDK returns synchronously from a task request are
//! not errors; they are modelled by [`TaskStatus`](crate::types::TaskStatus).
//! The errors here cover the cases where talking to the device failed.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been released.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from or sent to the device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("uniMag");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: uniMag");
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("Audio route lost");
        assert!(matches!(error, HardwareError::CommunicationError { .. }));
        assert_eq!(error.to_string(), "Communication error: Audio route lost");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("No swipe requested");
        assert_eq!(error.to_string(), "Invalid data: No swipe requested");
    }

    #[test]
    fn test_initialization_failed_error() {
        let error = HardwareError::initialization_failed("SDK unavailable");
        assert!(matches!(error, HardwareError::InitializationFailed { .. }));
        assert_eq!(error.to_string(), "Initialization failed: SDK unavailable");
    }
}
