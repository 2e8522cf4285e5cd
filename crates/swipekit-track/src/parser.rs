//! Track 1 payload parser.
//!
//! # Track Format
//!
//! ```text
//! %B4111111111111111^DOE/JOHN^2512101000000000000?
//! ^^^^^^^^^^^^^^^^^^ ^^^^^^^^ ^^^^
//! |                  |        Expiry, YYMM
//! |                  Name, LAST/FIRST
//! Sentinel + account number
//! ```
//!
//! The grammar is searched for anywhere in the payload, so leading noise
//! from the reader (partial track 2, padding, line breaks) is tolerated.
//! The first `%B` occurrence followed by a complete account, name and
//! expiry sequence is used.
//!
//! # Field Rules
//!
//! - Account number: the digit run immediately after `%B`; at least one digit.
//! - Name: everything between the first and second `^`. Split on the first
//!   `/` into surname and given name, each trimmed. A missing `/` or a blank
//!   side fails with [`ParseError::MalformedName`].
//! - Expiry: exactly four digits after the second `^`, `YYMM`.
//!
//! # Examples
//!
//! ```
//! use swipekit_track::{ParseError, TrackParser};
//!
//! let record = TrackParser::parse_str("%B4111111111111111^DOE / JOHN ^2512").unwrap();
//! assert_eq!(record.last_name, "DOE");
//! assert_eq!(record.first_name, "JOHN");
//! assert_eq!(record.expiry_year, "25");
//! assert_eq!(record.expiry_month, "12");
//!
//! assert_eq!(TrackParser::parse_str("hello"), Err(ParseError::NoMatch));
//! assert_eq!(
//!     TrackParser::parse_str("%B4111111111111111^DOE^2512"),
//!     Err(ParseError::MalformedName)
//! );
//! ```

use crate::error::{ParseError, Result};
use swipekit_core::CardRecord;
use swipekit_core::constants::{
    EXPIRY_LENGTH, FIELD_SEPARATOR, NAME_SEPARATOR, TRACK_START_SENTINEL,
};

/// Parser for raw swipe payloads.
///
/// Stateless; all methods are associated functions.
pub struct TrackParser;

/// Borrowed slices of one grammar match.
#[derive(Debug, PartialEq, Eq)]
struct TrackFields<'a> {
    account: &'a str,
    name: &'a str,
    expiry: &'a str,
}

impl TrackParser {
    /// Parse a raw payload as delivered by the reader.
    ///
    /// The payload is decoded as ASCII; bytes outside the ASCII range become
    /// U+FFFD and can never satisfy the digit or separator rules.
    ///
    /// # Errors
    ///
    /// - [`ParseError::NoMatch`] if no sentinel/account/name/expiry sequence exists
    /// - [`ParseError::MalformedName`] if the matched name field is not `LAST/FIRST`
    pub fn parse(raw: &[u8]) -> Result<CardRecord> {
        Self::parse_str(&decode_ascii(raw))
    }

    /// Parse a payload that has already been decoded to text.
    ///
    /// # Errors
    ///
    /// Same as [`TrackParser::parse`].
    pub fn parse_str(input: &str) -> Result<CardRecord> {
        let fields = find_track(input).ok_or(ParseError::NoMatch)?;

        let (last_name, first_name) = split_name(fields.name)?;
        let (expiry_year, expiry_month) = fields.expiry.split_at(2);

        Ok(CardRecord {
            card_number: fields.account.to_string(),
            expiry_month: expiry_month.to_string(),
            expiry_year: expiry_year.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            normalized_raw_track: normalize(input),
        })
    }
}

fn decode_ascii(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect()
}

/// Remove every whitespace and line-break character.
fn normalize(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

fn find_track(input: &str) -> Option<TrackFields<'_>> {
    input
        .match_indices(TRACK_START_SENTINEL)
        .find_map(|(start, _)| match_fields(&input[start + TRACK_START_SENTINEL.len()..]))
}

/// Match `DIGITS ^ NAME ^ DDDD` at the start of `rest`.
///
/// All delimiters are ASCII, so every split below lands on a char boundary.
fn match_fields(rest: &str) -> Option<TrackFields<'_>> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (account, rest) = rest.split_at(digits);

    let rest = rest.strip_prefix(FIELD_SEPARATOR)?;
    let (name, rest) = rest.split_once(FIELD_SEPARATOR)?;

    let expiry = rest.get(..EXPIRY_LENGTH)?;
    if !expiry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(TrackFields {
        account,
        name,
        expiry,
    })
}

/// Split `LAST/FIRST` into `(last, first)`.
fn split_name(name: &str) -> Result<(&str, &str)> {
    let (last, first) = name
        .split_once(NAME_SEPARATOR)
        .ok_or(ParseError::MalformedName)?;
    let (last, first) = (last.trim(), first.trim());

    if last.is_empty() || first.is_empty() {
        return Err(ParseError::MalformedName);
    }
    Ok((last, first))
}
