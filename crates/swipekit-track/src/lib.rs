//! Magnetic-stripe track data parsing.
//!
//! Converts the raw payload a swipe reader delivers into a structured
//! [`CardRecord`](swipekit_core::CardRecord).
//!
//! # Example
//!
//! ```
//! use swipekit_track::TrackParser;
//!
//! let record = TrackParser::parse(b"%B4111111111111111^DOE/JOHN^2512101?").unwrap();
//! assert_eq!(record.card_number, "4111111111111111");
//! assert_eq!(record.first_name, "JOHN");
//! assert_eq!(record.last_name, "DOE");
//! ```

pub mod error;
pub mod parser;

pub use error::{ParseError, Result};
pub use parser::TrackParser;
