//! Country detection and postal code → province dispatch.

use super::catalogue::ProvinceCatalogue;
use super::portugal::resolve_portuguese_province_code;
use super::spain::resolve_spanish_province;
use super::types::{
    country_for_digit_count, digits_only, Country, ProvinceId, ProvinceMatch, ProvinceRecord,
    ResolutionError,
};

/// Classify a raw postal code by its digit count. Never fails.
pub fn detect_country(postal_code: &str) -> Country {
    country_for_digit_count(digits_only(postal_code).len())
}

/// Resolve without a catalogue: a Spanish id or a Portuguese district code.
pub fn resolve_match(postal_code: &str) -> Option<ProvinceMatch> {
    match detect_country(postal_code) {
        Country::Spain => resolve_spanish_province(postal_code).map(ProvinceMatch::Id),
        Country::Portugal => resolve_portuguese_province_code(postal_code).map(ProvinceMatch::Code),
        Country::Unknown => None,
    }
}

/// Province id for a postal code.
///
/// Portuguese codes only become an id through `catalogue`; without one they
/// resolve to `None`.
pub fn resolve_province(
    postal_code: &str,
    catalogue: Option<&ProvinceCatalogue>,
) -> Option<ProvinceId> {
    try_resolve_province(postal_code, catalogue).ok()
}

/// Like [`resolve_province`], but says why resolution failed.
pub fn try_resolve_province(
    postal_code: &str,
    catalogue: Option<&ProvinceCatalogue>,
) -> Result<ProvinceId, ResolutionError> {
    let digits = digits_only(postal_code);

    match country_for_digit_count(digits.len()) {
        Country::Spain => {
            resolve_spanish_province(&digits).ok_or_else(|| ResolutionError::UnknownPrefix {
                prefix: digits[..2].to_string(),
            })
        }
        Country::Portugal => {
            let code = resolve_portuguese_province_code(&digits).ok_or_else(|| {
                ResolutionError::OutsideKnownRanges {
                    code: postal_code.trim().to_string(),
                }
            })?;
            let catalogue = catalogue.ok_or_else(|| ResolutionError::MissingCatalogue {
                code: code.clone(),
            })?;
            catalogue
                .find_by_code(code.as_str())
                .map(|record| record.id)
                .ok_or(ResolutionError::NotInCatalogue { code })
        }
        Country::Unknown => Err(ResolutionError::MalformedPostalCode {
            input: postal_code.to_string(),
        }),
    }
}

/// Resolve an id and return the full catalogue row for it.
pub fn resolve_province_full<'a>(
    postal_code: &str,
    catalogue: &'a ProvinceCatalogue,
) -> Option<&'a ProvinceRecord> {
    let id = resolve_province(postal_code, Some(catalogue))?;
    catalogue.find_by_id(id)
}
