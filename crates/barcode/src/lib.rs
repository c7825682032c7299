//! Barcode candidate extraction and validation.
//!
//! Turns arbitrary text (recognizer output or typed digits) into at most
//! one validated retail barcode:
//! - `extract_candidates`: standalone runs of 8-13 ASCII digits
//! - `validate`: length, charset and EAN-13 checksum screening
//! - `resolve`: the first candidate that validates

use std::fmt;
use std::iter::FusedIterator;
use std::ops::RangeInclusive;
use std::str::FromStr;

use foodcheck_text::is_ascii_digits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted candidate lengths.
pub const CANDIDATE_LEN: RangeInclusive<usize> = 8..=13;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("No valid barcode found")]
    NotFound,
    #[error("Invalid barcode '{candidate}': {reason}")]
    Invalid {
        candidate: String,
        reason: InvalidReason,
    },
}

/// Why a candidate failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("length {0} outside 8..=13")]
    Length(usize),
    #[error("contains non-digit characters")]
    NonDigit,
    #[error("EAN-13 check digit is {found}, expected {expected}")]
    Checksum { expected: u8, found: u8 },
}

/// Barcode family, screened by digit count only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "length")]
pub enum BarcodeFormat {
    Ean8,
    UpcA,
    Ean13,
    /// 9-11 digits: accepted, family unknown
    Other(usize),
}

impl BarcodeFormat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ean8 => "EAN-8",
            Self::UpcA => "UPC-A",
            Self::Ean13 => "EAN-13",
            Self::Other(_) => "unknown",
        }
    }
}

/// A barcode that passed `validate`.
///
/// Can only be obtained through validation, so holding one proves the
/// length is within 8..=13 and, for 13 digits, the checksum holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedBarcode(String);

impl ValidatedBarcode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn format(&self) -> BarcodeFormat {
        match self.len() {
            8 => BarcodeFormat::Ean8,
            12 => BarcodeFormat::UpcA,
            13 => BarcodeFormat::Ean13,
            n => BarcodeFormat::Other(n),
        }
    }
}

impl fmt::Display for ValidatedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidatedBarcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ValidatedBarcode {
    type Error = BarcodeError;

    fn try_from(candidate: &str) -> Result<Self, Self::Error> {
        inspect(candidate).map_err(|reason| BarcodeError::Invalid {
            candidate: candidate.to_string(),
            reason,
        })?;
        Ok(Self(candidate.to_string()))
    }
}

impl TryFrom<String> for ValidatedBarcode {
    type Error = BarcodeError;

    fn try_from(candidate: String) -> Result<Self, Self::Error> {
        match inspect(&candidate) {
            Ok(()) => Ok(Self(candidate)),
            Err(reason) => Err(BarcodeError::Invalid { candidate, reason }),
        }
    }
}

impl FromStr for ValidatedBarcode {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl From<ValidatedBarcode> for String {
    fn from(barcode: ValidatedBarcode) -> Self {
        barcode.0
    }
}

/// Lazy iterator over barcode candidates, left to right.
///
/// A candidate is a maximal run of ASCII digits with a length in
/// `CANDIDATE_LEN`; runs that are too short or too long are skipped
/// whole, never split.
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            if !bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }

            // ASCII digits never fall inside a multi-byte char, so the
            // slice bounds are char boundaries.
            if CANDIDATE_LEN.contains(&(self.pos - start)) {
                return Some(&self.text[start..self.pos]);
            }
        }

        None
    }
}

impl FusedIterator for Candidates<'_> {}

/// Scan `text` for standalone runs of 8-13 digits.
pub fn extract_candidates(text: &str) -> Candidates<'_> {
    Candidates { text, pos: 0 }
}

/// Compute the EAN-13 check digit for the first twelve digits.
///
/// Returns `None` unless `digits` is exactly twelve ASCII digits.
pub fn ean13_check_digit(digits: &str) -> Option<u8> {
    if digits.len() != 12 || !is_ascii_digits(digits) {
        return None;
    }

    let sum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();

    Some(((10 - sum % 10) % 10) as u8)
}

/// Check a candidate, reporting why it fails.
pub fn inspect(candidate: &str) -> Result<(), InvalidReason> {
    if !CANDIDATE_LEN.contains(&candidate.len()) {
        return Err(InvalidReason::Length(candidate.len()));
    }

    if !is_ascii_digits(candidate) {
        return Err(InvalidReason::NonDigit);
    }

    if candidate.len() == 13 {
        let (body, check) = candidate.split_at(12);
        let found = check.as_bytes()[0] - b'0';
        // body is twelve digits here
        let expected = ean13_check_digit(body).unwrap_or(u8::MAX);
        if found != expected {
            return Err(InvalidReason::Checksum { expected, found });
        }
    }

    Ok(())
}

/// Check whether a candidate is a valid barcode.
///
/// Lengths 8-12 are accepted on length and charset alone; 13-digit
/// candidates must also carry a correct EAN-13 check digit.
pub fn validate(candidate: &str) -> bool {
    inspect(candidate).is_ok()
}

/// Return the first candidate in `text` that validates.
pub fn resolve(text: &str) -> Result<ValidatedBarcode, BarcodeError> {
    extract_candidates(text)
        .find(|candidate| validate(candidate))
        .map(|candidate| ValidatedBarcode(candidate.to_string()))
        .ok_or(BarcodeError::NotFound)
}
