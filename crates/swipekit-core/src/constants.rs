//! Track format and reader configuration constants.
//!
//! The track constants describe the ISO 7813 track 1 layout as delivered by
//! audio-jack swipe readers:
//!
//! ```text
//! %B4111111111111111^DOE/JOHN^2512101000000000000?
//! ^^                ^        ^
//! |                 |        Expiry (YYMM) follows the second separator
//! |                 Field separator
//! Start sentinel + format code
//! ```
//!
//! # Usage
//!
//! ```
//! use swipekit_core::constants::*;
//!
//! let track = "%B4111111111111111^DOE/JOHN^2512";
//! assert!(track.starts_with(TRACK_START_SENTINEL));
//! assert_eq!(track.matches(FIELD_SEPARATOR).count(), 2);
//! ```

// ============================================================================
// Track Layout
// ============================================================================

/// Start sentinel (`%`) followed by the format code for financial cards (`B`).
pub const TRACK_START_SENTINEL: &str = "%B";

/// Separator between the account number, name and expiry fields.
pub const FIELD_SEPARATOR: char = '^';

/// Separator between surname and given name inside the name field.
///
/// # Examples
///
/// ```
/// use swipekit_core::constants::NAME_SEPARATOR;
///
/// let (last, first) = "DOE/JOHN".split_once(NAME_SEPARATOR).unwrap();
/// assert_eq!((last, first), ("DOE", "JOHN"));
/// ```
pub const NAME_SEPARATOR: char = '/';

/// Length of the expiry field (`YYMM`).
pub const EXPIRY_LENGTH: usize = 4;

/// Number of trailing account digits left visible when masking.
pub const MASK_VISIBLE_DIGITS: usize = 4;

// ============================================================================
// Reader Configuration
// ============================================================================

/// Seconds the reader waits for a card after a swipe request.
///
/// Fixed by the reader integration; the hardware reports expiry through a
/// swipe-timeout notification.
pub const SWIPE_TIMEOUT_SECS: u64 = 30;

/// Auto-connect is always enabled so that a reader attached after
/// activation connects without another activation.
pub const AUTO_CONNECT: bool = true;

/// Automatic playback volume adjustment for audio-jack readers.
pub const AUTO_ADJUST_VOLUME: bool = true;

/// SDK logging default.
pub const DEFAULT_LOGGING_ENABLED: bool = true;

// ============================================================================
// Session
// ============================================================================

/// Default capacity of the session command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Maximum number of state transitions kept in session history.
pub const MAX_HISTORY_SIZE: usize = 100;
