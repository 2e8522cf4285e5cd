//! Track parsing errors.

/// Result type alias for track parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Reasons a swipe payload could not be turned into a card record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No start sentinel, account number, name and expiry sequence was found.
    ///
    /// Either the payload is not track data at all or the swipe was garbled.
    #[error("Payload does not contain recognizable track data")]
    NoMatch,

    /// The name field is empty, has no `/` separator, or one side is blank.
    #[error("Name field is not in LAST/FIRST form")]
    MalformedName,
}
