//! Core value types shared across the client.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::value::RawValue;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Balance
// =============================================================================

/// Error when parsing an account balance.
#[derive(Debug, Clone, Error)]
pub enum BalanceError {
    /// Balance is empty.
    #[error("balance cannot be empty")]
    Empty,
    /// Balance is not a decimal number.
    #[error("balance '{raw}' is not a decimal number")]
    NotDecimal { raw: String },
}

/// Account balance as reported by the service.
///
/// The decimal text is kept exactly as received so no precision is lost
/// through a binary float. Use [`Balance::to_f64`] for arithmetic that can
/// tolerate rounding.
///
/// # Example
///
/// ```rust
/// use haozhu::Balance;
///
/// let balance = Balance::new("12.30").unwrap();
/// assert_eq!(balance.as_str(), "12.30");
/// assert!(Balance::new("twelve").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Balance(String);

static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

impl Balance {
    /// Create a new Balance from its decimal text.
    pub fn new(s: impl AsRef<str>) -> Result<Self, BalanceError> {
        let s = s.as_ref().trim();
        if s.is_empty() {
            return Err(BalanceError::Empty);
        }
        if !RE_DECIMAL.is_match(s) {
            return Err(BalanceError::NotDecimal { raw: s.to_string() });
        }
        Ok(Self(s.to_string()))
    }

    /// Zero balance, used when the service omits the field.
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Get the decimal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Approximate value as a float.
    pub fn to_f64(&self) -> f64 {
        self.0.parse().unwrap_or_default()
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Balance {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for Balance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Balance {
    /// Accepts both `"12.30"` and `12.30`; the service is not consistent.
    /// A number keeps its JSON token, so `10.00` stays `"10.00"`.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw: Box<RawValue> = Deserialize::deserialize(d)?;
        let token = raw.get();

        let text = match token.as_bytes().first().copied() {
            Some(b'"') => serde_json::from_str::<String>(token).map_err(de::Error::custom)?,
            Some(b'-' | b'0'..=b'9') => token.to_owned(),
            _ => {
                return Err(de::Error::custom(format!(
                    "expected decimal string or number, got {}",
                    token
                )));
            }
        };
        Balance::new(text).map_err(de::Error::custom)
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

// =============================================================================
// DialCode
// =============================================================================

/// Error when parsing a dial code.
#[derive(Debug, Clone, Error)]
pub enum DialCodeError {
    /// Dial code contains non-digit characters.
    #[error("dial code must contain only digits")]
    NonDigit,
    /// Dial code is empty.
    #[error("dial code cannot be empty")]
    Empty,
}

/// Country dial code (e.g., "86" for China).
///
/// Dial codes are stored without the leading '+' sign.
///
/// ```rust
/// use haozhu::DialCode;
///
/// let dc = DialCode::new("+86").unwrap();
/// assert_eq!(dc.to_string(), "86");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DialCode(String);

impl DialCode {
    /// Create a new DialCode from a string.
    ///
    /// The input can include a leading '+' which will be stripped.
    pub fn new(s: impl AsRef<str>) -> Result<Self, DialCodeError> {
        let n = s.as_ref().trim().trim_start_matches('+');
        if n.is_empty() {
            return Err(DialCodeError::Empty);
        }
        if !n.chars().all(|c| c.is_ascii_digit()) {
            return Err(DialCodeError::NonDigit);
        }
        Ok(Self(n.to_string()))
    }

    /// Get the dial code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DialCode {
    type Err = DialCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for DialCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for DialCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        DialCode::new(raw).map_err(de::Error::custom)
    }
}

impl Serialize for DialCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}
