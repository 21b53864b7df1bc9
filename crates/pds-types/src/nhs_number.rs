//! NHS number validation.
//!
//! An NHS number is ten ASCII digits. The tenth digit is a modulus 11 check digit computed over
//! the first nine digits with weights `10, 9, 8, ..., 2`. A computed check value of 11 maps to 0;
//! a computed value of 10 means the number was never issued and is always invalid.
//!
//! Whitespace anywhere in the input is ignored, so `"900 000 0009"` and `"9000000009"` are the
//! same number.

use std::fmt;
use std::str::FromStr;

const NHS_NUMBER_LEN: usize = 10;
const CHECKSUM_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Reasons an input string is not a usable NHS number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NhsNumberError {
    /// Not exactly ten ASCII digits once whitespace is removed.
    #[error("NHS number must be exactly 10 digits")]
    InvalidFormat,
    /// Ten digits, but the check digit does not match.
    #[error("NHS number check digit does not match")]
    InvalidChecksum,
}

/// A validated NHS number in canonical form (ten digits, no whitespace).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NhsNumber(String);

impl NhsNumber {
    /// Normalises and validates `input`.
    ///
    /// # Errors
    ///
    /// Returns [`NhsNumberError::InvalidFormat`] when the input is not ten ASCII digits after
    /// removing whitespace, and [`NhsNumberError::InvalidChecksum`] when the check digit is wrong
    /// or the computed check value is 10.
    pub fn parse(input: &str) -> Result<Self, NhsNumberError> {
        let digits = normalise(input);

        if digits.len() != NHS_NUMBER_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NhsNumberError::InvalidFormat);
        }

        if !checksum_matches(digits.as_bytes()) {
            return Err(NhsNumberError::InvalidChecksum);
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional `3 3 4` display grouping, e.g. `900 000 0009`.
    pub fn formatted(&self) -> String {
        format!("{} {} {}", &self.0[0..3], &self.0[3..6], &self.0[6..10])
    }
}

/// Returns `true` if `input` is a valid NHS number.
///
/// Never fails: malformed input simply returns `false`.
pub fn validate_nhs_number(input: &str) -> bool {
    NhsNumber::parse(input).is_ok()
}

fn normalise(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Expects exactly ten ASCII digits.
fn checksum_matches(digits: &[u8]) -> bool {
    let total: u32 = digits
        .iter()
        .zip(CHECKSUM_WEIGHTS)
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();

    let check = match 11 - (total % 11) {
        11 => 0,
        10 => return false,
        other => other,
    };

    check == u32::from(digits[9] - b'0')
}

impl fmt::Display for NhsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NhsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NhsNumber({})", self.0)
    }
}

impl FromStr for NhsNumber {
    type Err = NhsNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for NhsNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NhsNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NhsNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NhsNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}
