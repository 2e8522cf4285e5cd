use crate::{Result, constants::MASK_VISIBLE_DIGITS, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reader model hint passed to the hardware at activation.
///
/// The hint is best-effort: the SDK detects the model itself when the hint
/// is absent or `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReaderType {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "unimag")]
    UniMag,
    #[serde(rename = "unimag_pro")]
    UniMagPro,
    #[serde(rename = "unimag_ii")]
    UniMagII,
    #[serde(rename = "shuttle")]
    Shuttle,
}

impl ReaderType {
    /// Canonical lowercase name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReaderType::Unknown => "unknown",
            ReaderType::UniMag => "unimag",
            ReaderType::UniMagPro => "unimag_pro",
            ReaderType::UniMagII => "unimag_ii",
            ReaderType::Shuttle => "shuttle",
        }
    }
}

impl fmt::Display for ReaderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReaderType {
    type Err = Error;

    /// Parse a reader type name.
    ///
    /// Matching ignores case, and `-` or spaces are accepted in place of `_`.
    ///
    /// # Errors
    /// Returns `Error::InvalidReaderType` for unrecognized names.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "unknown" => Ok(ReaderType::Unknown),
            "unimag" => Ok(ReaderType::UniMag),
            "unimag_pro" | "unimagpro" => Ok(ReaderType::UniMagPro),
            "unimag_ii" | "unimagii" | "unimag2" => Ok(ReaderType::UniMagII),
            "shuttle" => Ok(ReaderType::Shuttle),
            _ => Err(Error::InvalidReaderType {
                name: s.to_string(),
            }),
        }
    }
}

/// Structured cardholder data extracted from one swipe.
///
/// Every field is derived from the raw track payload; the record is handed
/// to listeners and never stored by the library.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Primary account number, digits only.
    pub card_number: String,

    /// Two-digit expiry month.
    pub expiry_month: String,

    /// Two-digit expiry year.
    pub expiry_year: String,

    /// Given name.
    pub first_name: String,

    /// Surname.
    pub last_name: String,

    /// Raw track text with all whitespace removed.
    pub normalized_raw_track: String,
}

impl CardRecord {
    /// Account number with everything but the last four digits replaced by `*`.
    ///
    /// # Examples
    ///
    /// ```
    /// use swipekit_core::CardRecord;
    ///
    /// let record = CardRecord {
    ///     card_number: "4111111111111111".to_string(),
    ///     expiry_month: "12".to_string(),
    ///     expiry_year: "25".to_string(),
    ///     first_name: "JOHN".to_string(),
    ///     last_name: "DOE".to_string(),
    ///     normalized_raw_track: String::new(),
    /// };
    /// assert_eq!(record.masked_card_number(), "************1111");
    /// ```
    #[must_use]
    pub fn masked_card_number(&self) -> String {
        let hidden = self
            .card_number
            .chars()
            .count()
            .saturating_sub(MASK_VISIBLE_DIGITS);
        self.card_number
            .chars()
            .enumerate()
            .map(|(i, c)| if i < hidden { '*' } else { c })
            .collect()
    }

    /// Expiry formatted as `MM/YY`.
    #[must_use]
    pub fn expiry(&self) -> String {
        format!("{}/{}", self.expiry_month, self.expiry_year)
    }
}

// Keeps the account number out of debug output and logs.
impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("card_number", &self.masked_card_number())
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}
