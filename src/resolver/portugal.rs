//! Best-effort Portuguese postal code → district code.
//!
//! Real CP4 allocation is irregular; these anchors approximate it. Callers
//! must treat the result as a hint, not an authoritative mapping.

use super::types::{digits_only, ProvinceCode};

pub struct DistrictRange {
    pub code: &'static str,
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

const fn anchor(code: &'static str, name: &'static str, start: u32) -> DistrictRange {
    DistrictRange { code, name, start, end: start + 99 }
}

/// Width-100 anchors. Checked before [`WIDE_RANGES`] so the narrower districts
/// nested inside 4000-4999 (Braga, Viana do Castelo) keep their own code.
pub const NARROW_RANGES: [DistrictRange; 18] = [
    anchor("PT01", "Aveiro", 3800),
    anchor("PT02", "Beja", 7800),
    anchor("PT03", "Braga", 4700),
    anchor("PT04", "Bragança", 5300),
    anchor("PT05", "Castelo Branco", 6000),
    anchor("PT06", "Coimbra", 3000),
    anchor("PT07", "Évora", 7000),
    anchor("PT08", "Faro", 8000),
    anchor("PT09", "Guarda", 6300),
    anchor("PT10", "Leiria", 2400),
    anchor("PT12", "Portalegre", 7300),
    anchor("PT14", "Santarém", 2000),
    anchor("PT15", "Setúbal", 2900),
    anchor("PT16", "Viana do Castelo", 4900),
    anchor("PT17", "Vila Real", 5000),
    anchor("PT18", "Viseu", 3500),
    anchor("PT19", "Madeira", 9000),
    anchor("PT20", "Açores", 9500),
];

pub const WIDE_RANGES: [DistrictRange; 2] = [
    DistrictRange { code: "PT11", name: "Lisboa", start: 1000, end: 1999 },
    DistrictRange { code: "PT13", name: "Porto", start: 4000, end: 4999 },
];

/// District code for a Portuguese postal code, from its first four digits.
pub fn resolve_portuguese_province_code(postal_code: &str) -> Option<ProvinceCode> {
    district_for(postal_code).map(|d| ProvinceCode(d.code.to_string()))
}

pub fn district_for(postal_code: &str) -> Option<&'static DistrictRange> {
    let digits = digits_only(postal_code);
    let cp4: u32 = digits.get(..4)?.parse().ok()?;

    NARROW_RANGES
        .iter()
        .chain(WIDE_RANGES.iter())
        .find(|d| (d.start..=d.end).contains(&cp4))
}

pub fn district_name(code: &ProvinceCode) -> Option<&'static str> {
    NARROW_RANGES
        .iter()
        .chain(WIDE_RANGES.iter())
        .find(|d| d.code == code.as_str())
        .map(|d| d.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Option<ProvinceCode> {
        resolve_portuguese_province_code(s)
    }

    #[test]
    fn test_lisboa_wide_range() {
        assert_eq!(code("1000999"), Some(ProvinceCode("PT11".into())));
        assert_eq!(code("1000-123"), Some(ProvinceCode("PT11".into())));
        assert_eq!(code("1999-001"), Some(ProvinceCode("PT11".into())));
    }

    #[test]
    fn test_porto_wide_range() {
        assert_eq!(code("4000-001"), Some(ProvinceCode("PT13".into())));
        assert_eq!(code("4450-100"), Some(ProvinceCode("PT13".into())));
    }

    #[test]
    fn test_narrow_anchor_inside_porto_range_wins() {
        assert_eq!(code("4700-001"), Some(ProvinceCode("PT03".into())));
        assert_eq!(code("4900-350"), Some(ProvinceCode("PT16".into())));
    }

    #[test]
    fn test_narrow_anchor_width() {
        assert_eq!(code("3000-001"), Some(ProvinceCode("PT06".into())));
        assert_eq!(code("3099-999"), Some(ProvinceCode("PT06".into())));
        assert_eq!(code("3100-001"), None);
    }

    #[test]
    fn test_islands() {
        assert_eq!(code("9000-018"), Some(ProvinceCode("PT19".into())));
        assert_eq!(code("9500-150"), Some(ProvinceCode("PT20".into())));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(code("100"), None);
    }

    #[test]
    fn test_twenty_distinct_districts() {
        let mut codes: Vec<&str> = NARROW_RANGES
            .iter()
            .chain(WIDE_RANGES.iter())
            .map(|d| d.code)
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 20);
        assert_eq!(district_name(&ProvinceCode("PT11".into())), Some("Lisboa"));
    }
}
