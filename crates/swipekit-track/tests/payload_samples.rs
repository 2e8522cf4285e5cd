//! Parser behaviour on payloads shaped like real reader output.

use bytes::Bytes;
use swipekit_track::{ParseError, TrackParser};

/// Track 1 and track 2 as one payload, the way audio readers deliver them.
const DUAL_TRACK: &[u8] =
    b"%B4111111111111111^DOE/JOHN^2512101000000000000000000000000?;4111111111111111=25121010000000000000?";

#[test]
fn test_dual_track_payload() {
    let payload = Bytes::from_static(DUAL_TRACK);
    let record = TrackParser::parse(&payload).unwrap();

    assert_eq!(record.card_number, "4111111111111111");
    assert_eq!(record.first_name, "JOHN");
    assert_eq!(record.last_name, "DOE");
    assert_eq!(record.expiry_year, "25");
    assert_eq!(record.expiry_month, "12");
}

#[test]
fn test_padded_name_field() {
    let payload = b"%B5500000000000004^MUSTERMANN/ERIKA            ^2706201?";
    let record = TrackParser::parse(payload).unwrap();

    assert_eq!(record.last_name, "MUSTERMANN");
    assert_eq!(record.first_name, "ERIKA");
    assert_eq!(record.expiry(), "06/27");
}

#[test]
fn test_line_wrapped_payload() {
    let payload = b"%B4111111111111111^DOE/JOHN^2512\r\n101?\r\n";
    let record = TrackParser::parse(payload).unwrap();

    assert_eq!(record.normalized_raw_track, "%B4111111111111111^DOE/JOHN^2512101?");
}

#[test]
fn test_crooked_swipe_fragment() {
    let payload = b"%B41111111";
    assert_eq!(TrackParser::parse(payload), Err(ParseError::NoMatch));
}

#[test]
fn test_missing_name_field() {
    let payload = b"%B4111111111111111^^2512101?";
    assert_eq!(TrackParser::parse(payload), Err(ParseError::MalformedName));
}

#[test]
fn test_empty_payload() {
    assert_eq!(TrackParser::parse(&[]), Err(ParseError::NoMatch));
}
