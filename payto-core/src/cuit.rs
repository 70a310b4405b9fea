//! CUIT (Clave Única de Identificación Tributaria) parsing and display.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CuitError {
    #[error("El CUIT debe tener 11 dígitos")]
    Length,
    #[error("El CUIT solo puede contener números y guiones")]
    InvalidCharacter,
    #[error("El dígito verificador del CUIT es incorrecto")]
    CheckDigit,
}

/// A CUIT whose check digit has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cuit([u8; 11]);

fn check_digit(body: &[u8]) -> Option<u8> {
    let sum: u32 = body
        .iter()
        .zip(WEIGHTS)
        .map(|(digit, weight)| u32::from(*digit) * weight)
        .sum();
    match 11 - sum % 11 {
        11 => Some(0),
        10 => None,
        digit => u8::try_from(digit).ok(),
    }
}

impl Cuit {
    /// Eleven digits without separators, e.g. `20123456786`.
    pub fn digits(&self) -> String {
        self.0.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// Two-digit type prefix (20, 23, 27, 30, ...).
    pub fn prefix(&self) -> u8 {
        self.0[0] * 10 + self.0[1]
    }

    /// Companies use the 30/33/34 prefixes.
    pub fn is_legal_entity(&self) -> bool {
        matches!(self.prefix(), 30 | 33 | 34)
    }
}

impl FromStr for Cuit {
    type Err = CuitError;

    /// Accepts `20123456786` or `20-12345678-6`; blanks and dashes are ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut digits = Vec::with_capacity(11);
        for c in raw.chars() {
            match c {
                '0'..='9' => digits.push(c as u8 - b'0'),
                '-' | ' ' | '.' => {}
                _ => return Err(CuitError::InvalidCharacter),
            }
        }
        let digits: [u8; 11] = digits.try_into().map_err(|_| CuitError::Length)?;
        if check_digit(&digits[..10]) != Some(digits[10]) {
            return Err(CuitError::CheckDigit);
        }
        Ok(Cuit(digits))
    }
}

impl fmt::Display for Cuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits();
        write!(f, "{}-{}-{}", &digits[..2], &digits[2..10], &digits[10..])
    }
}

impl Serialize for Cuit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digits())
    }
}

impl<'de> Deserialize<'de> for Cuit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Display a CUIT as stored by the API, falling back to the raw text when it
/// does not parse.
pub fn display_cuit(raw: &str) -> String {
    raw.parse::<Cuit>()
        .map(|cuit| cuit.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_dashed() {
        let plain: Cuit = "20123456786".parse().unwrap();
        let dashed: Cuit = "20-12345678-6".parse().unwrap();
        assert_eq!(plain, dashed);
        assert_eq!(plain.to_string(), "20-12345678-6");
        assert_eq!(plain.digits(), "20123456786");
        assert_eq!(plain.prefix(), 20);
        assert!(!plain.is_legal_entity());
    }

    #[test]
    fn verifies_check_digit() {
        assert_eq!("20123456780".parse::<Cuit>(), Err(CuitError::CheckDigit));
        assert!("30-71234567-1".parse::<Cuit>().is_ok());
    }

    #[test]
    fn check_digit_eleven_maps_to_zero() {
        // weighted sum 22
        assert!("20000000400".parse::<Cuit>().is_ok());
        assert_eq!("20000000401".parse::<Cuit>(), Err(CuitError::CheckDigit));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!("2012345678".parse::<Cuit>(), Err(CuitError::Length));
        assert_eq!("20-1234567A-6".parse::<Cuit>(), Err(CuitError::InvalidCharacter));
    }

    #[test]
    fn display_falls_back_to_raw() {
        assert_eq!(display_cuit("20123456786"), "20-12345678-6");
        assert_eq!(display_cuit("sin cuit"), "sin cuit");
    }

    #[test]
    fn serde_round_trips_digits() {
        let cuit: Cuit = serde_json::from_str(r#""20-12345678-6""#).unwrap();
        assert_eq!(serde_json::to_string(&cuit).unwrap(), r#""20123456786""#);
    }
}
