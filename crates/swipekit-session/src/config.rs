use serde::{Deserialize, Serialize};
use swipekit_core::constants::{DEFAULT_COMMAND_BUFFER, DEFAULT_LOGGING_ENABLED};
use swipekit_core::{Error, ReaderType, Result};
use swipekit_hardware::ReaderConfig;

use crate::events::EventNaming;

/// Session configuration.
///
/// Every field has a default, so a partial TOML or JSON document is valid.
///
/// # Examples
///
/// ```
/// use swipekit_session::{EventNaming, SessionConfig};
///
/// let config = SessionConfig::default()
///     .reader_type("unimag_pro")
///     .event_naming(EventNaming::Legacy);
///
/// let reader = config.reader_config().unwrap();
/// assert!(reader.auto_connect);
/// assert_eq!(reader.swipe_timeout.as_secs(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Enable reader SDK logging. Cosmetic.
    pub logging_enabled: bool,

    /// Reader model hint, e.g. `"unimag_ii"`.
    pub reader_type: Option<String>,

    /// Naming scheme for published event envelopes.
    pub event_naming: EventNaming,

    /// Capacity of the session command channel.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            logging_enabled: DEFAULT_LOGGING_ENABLED,
            reader_type: None,
            event_naming: EventNaming::default(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl SessionConfig {
    /// Set whether SDK logging is enabled
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Set the reader model hint
    pub fn reader_type(mut self, reader_type: impl Into<String>) -> Self {
        self.reader_type = Some(reader_type.into());
        self
    }

    /// Set the event naming scheme
    pub fn event_naming(mut self, naming: EventNaming) -> Self {
        self.event_naming = naming;
        self
    }

    /// Set the command channel capacity
    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity;
        self
    }

    /// Parsed reader model hint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReaderType`] if the hint is not a known model name.
    pub fn parsed_reader_type(&self) -> Result<Option<ReaderType>> {
        self.reader_type
            .as_deref()
            .map(str::parse::<ReaderType>)
            .transpose()
    }

    /// Check the configuration for values the session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero command buffer or an unknown reader type.
    pub fn validate(&self) -> Result<()> {
        if self.command_buffer == 0 {
            return Err(Error::Config("command_buffer must be at least 1".to_string()));
        }
        self.parsed_reader_type()?;
        Ok(())
    }

    /// Driver configuration derived from this session configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader type hint is invalid.
    pub fn reader_config(&self) -> Result<ReaderConfig> {
        Ok(ReaderConfig::new(
            self.parsed_reader_type()?,
            self.logging_enabled,
        ))
    }
}
