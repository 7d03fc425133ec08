//! Core value types for the address resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Country inferred from the shape of a postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    Spain,
    Portugal,
    Unknown,
}

impl Country {
    /// ISO 3166-1 alpha-2 code, `None` for `Unknown`.
    pub fn iso_code(&self) -> Option<&'static str> {
        match self {
            Self::Spain => Some("ES"),
            Self::Portugal => Some("PT"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spain => write!(f, "España"),
            Self::Portugal => write!(f, "Portugal"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Numeric province identifier. Spanish ids follow the postal prefix (1..=52).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceId(pub u32);

impl fmt::Display for ProvinceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Portuguese district code (`PT01`..`PT20`), translated to an id via the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceCode(pub String);

impl ProvinceCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvinceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalogue-free resolution result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProvinceMatch {
    Id(ProvinceId),
    Code(ProvinceCode),
}

/// A postal code reduced to its digits.
///
/// Only shapes accepted by [`PostalCode::parse`] exist: 5 digits (Spain) or
/// 7-8 digits (Portugal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct PostalCode {
    digits: String,
}

impl PostalCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = digits_only(raw);
        match country_for_digit_count(digits.len()) {
            Country::Unknown => None,
            _ => Some(Self { digits }),
        }
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn country(&self) -> Country {
        country_for_digit_count(self.digits.len())
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.country() {
            Country::Portugal => write!(f, "{}-{}", &self.digits[..4], &self.digits[4..]),
            _ => f.write_str(&self.digits),
        }
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.to_string()
    }
}

pub(crate) fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub(crate) fn country_for_digit_count(len: usize) -> Country {
    match len {
        5 => Country::Spain,
        7 | 8 => Country::Portugal,
        _ => Country::Unknown,
    }
}

/// A province row as supplied by the CRM (`getProvincias()` export).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    #[serde(alias = "Id")]
    pub id: ProvinceId,
    #[serde(default, alias = "Codigo")]
    pub code: Option<String>,
    #[serde(alias = "Nombre")]
    pub name: String,
    #[serde(default, alias = "Pais")]
    pub country: Option<String>,
}

/// Typed resolution failure, for callers that need more than `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("malformed postal code '{input}': expected 5 (ES) or 7-8 (PT) digits")]
    MalformedPostalCode { input: String },

    #[error("no Spanish province for postal prefix '{prefix}'")]
    UnknownPrefix { prefix: String },

    #[error("postal code {code} is outside every known Portuguese district range")]
    OutsideKnownRanges { code: String },

    #[error("province code {code} needs a province catalogue to become an id")]
    MissingCatalogue { code: ProvinceCode },

    #[error("province code {code} is not in the province catalogue")]
    NotInCatalogue { code: ProvinceCode },
}

/// Lookup-table construction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("entry '{entry}' has an empty alias")]
    EmptyAlias { entry: String },

    #[error("entry '{entry}' has invalid postal code '{postal_code}'")]
    InvalidPostalCode { entry: String, postal_code: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_iso_code() {
        assert_eq!(Country::Spain.iso_code(), Some("ES"));
        assert_eq!(Country::Portugal.iso_code(), Some("PT"));
        assert_eq!(Country::Unknown.iso_code(), None);
    }

    #[test]
    fn test_postal_code_parse_strips_non_digits() {
        let cp = PostalCode::parse(" 28-001 ").unwrap();
        assert_eq!(cp.digits(), "28001");
        assert_eq!(cp.country(), Country::Spain);
    }

    #[test]
    fn test_portuguese_postal_code_display() {
        let cp = PostalCode::parse("1000123").unwrap();
        assert_eq!(cp.country(), Country::Portugal);
        assert_eq!(cp.to_string(), "1000-123");
    }

    #[test]
    fn test_postal_code_rejects_other_lengths() {
        assert!(PostalCode::parse("1234").is_none());
        assert!(PostalCode::parse("123456").is_none());
        assert!(PostalCode::parse("").is_none());
        assert!(PostalCode::parse("abcde").is_none());
    }

    #[test]
    fn test_province_record_accepts_crm_column_names() {
        let json = r#"{"Id": 30, "Nombre": "Murcia", "Pais": "ES"}"#;
        let record: ProvinceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, ProvinceId(30));
        assert_eq!(record.name, "Murcia");
        assert_eq!(record.code, None);
    }
}
