//! Spanish postal prefix → province table.

use super::types::{digits_only, ProvinceId, ProvinceRecord};

pub struct SpanishProvince {
    pub prefix: &'static str,
    pub id: u32,
    pub name: &'static str,
}

/// The two leading digits of a Spanish postal code identify the province
/// (50 provinces plus Ceuta and Melilla).
pub const SPANISH_PROVINCES: [SpanishProvince; 52] = [
    SpanishProvince { prefix: "01", id: 1, name: "Araba/Álava" },
    SpanishProvince { prefix: "02", id: 2, name: "Albacete" },
    SpanishProvince { prefix: "03", id: 3, name: "Alicante/Alacant" },
    SpanishProvince { prefix: "04", id: 4, name: "Almería" },
    SpanishProvince { prefix: "05", id: 5, name: "Ávila" },
    SpanishProvince { prefix: "06", id: 6, name: "Badajoz" },
    SpanishProvince { prefix: "07", id: 7, name: "Illes Balears" },
    SpanishProvince { prefix: "08", id: 8, name: "Barcelona" },
    SpanishProvince { prefix: "09", id: 9, name: "Burgos" },
    SpanishProvince { prefix: "10", id: 10, name: "Cáceres" },
    SpanishProvince { prefix: "11", id: 11, name: "Cádiz" },
    SpanishProvince { prefix: "12", id: 12, name: "Castellón/Castelló" },
    SpanishProvince { prefix: "13", id: 13, name: "Ciudad Real" },
    SpanishProvince { prefix: "14", id: 14, name: "Córdoba" },
    SpanishProvince { prefix: "15", id: 15, name: "A Coruña" },
    SpanishProvince { prefix: "16", id: 16, name: "Cuenca" },
    SpanishProvince { prefix: "17", id: 17, name: "Girona" },
    SpanishProvince { prefix: "18", id: 18, name: "Granada" },
    SpanishProvince { prefix: "19", id: 19, name: "Guadalajara" },
    SpanishProvince { prefix: "20", id: 20, name: "Gipuzkoa" },
    SpanishProvince { prefix: "21", id: 21, name: "Huelva" },
    SpanishProvince { prefix: "22", id: 22, name: "Huesca" },
    SpanishProvince { prefix: "23", id: 23, name: "Jaén" },
    SpanishProvince { prefix: "24", id: 24, name: "León" },
    SpanishProvince { prefix: "25", id: 25, name: "Lleida" },
    SpanishProvince { prefix: "26", id: 26, name: "La Rioja" },
    SpanishProvince { prefix: "27", id: 27, name: "Lugo" },
    SpanishProvince { prefix: "28", id: 28, name: "Madrid" },
    SpanishProvince { prefix: "29", id: 29, name: "Málaga" },
    SpanishProvince { prefix: "30", id: 30, name: "Murcia" },
    SpanishProvince { prefix: "31", id: 31, name: "Navarra" },
    SpanishProvince { prefix: "32", id: 32, name: "Ourense" },
    SpanishProvince { prefix: "33", id: 33, name: "Asturias" },
    SpanishProvince { prefix: "34", id: 34, name: "Palencia" },
    SpanishProvince { prefix: "35", id: 35, name: "Las Palmas" },
    SpanishProvince { prefix: "36", id: 36, name: "Pontevedra" },
    SpanishProvince { prefix: "37", id: 37, name: "Salamanca" },
    SpanishProvince { prefix: "38", id: 38, name: "Santa Cruz de Tenerife" },
    SpanishProvince { prefix: "39", id: 39, name: "Cantabria" },
    SpanishProvince { prefix: "40", id: 40, name: "Segovia" },
    SpanishProvince { prefix: "41", id: 41, name: "Sevilla" },
    SpanishProvince { prefix: "42", id: 42, name: "Soria" },
    SpanishProvince { prefix: "43", id: 43, name: "Tarragona" },
    SpanishProvince { prefix: "44", id: 44, name: "Teruel" },
    SpanishProvince { prefix: "45", id: 45, name: "Toledo" },
    SpanishProvince { prefix: "46", id: 46, name: "Valencia/València" },
    SpanishProvince { prefix: "47", id: 47, name: "Valladolid" },
    SpanishProvince { prefix: "48", id: 48, name: "Bizkaia" },
    SpanishProvince { prefix: "49", id: 49, name: "Zamora" },
    SpanishProvince { prefix: "50", id: 50, name: "Zaragoza" },
    SpanishProvince { prefix: "51", id: 51, name: "Ceuta" },
    SpanishProvince { prefix: "52", id: 52, name: "Melilla" },
];

/// Province for a Spanish postal code, from its two-digit prefix.
///
/// Non-digits are stripped first. Fewer than two digits, or a prefix outside
/// `01..=52`, yields `None`.
pub fn resolve_spanish_province(postal_code: &str) -> Option<ProvinceId> {
    let digits = digits_only(postal_code);
    let prefix = digits.get(..2)?;

    SPANISH_PROVINCES
        .iter()
        .find(|p| p.prefix == prefix)
        .map(|p| ProvinceId(p.id))
}

pub fn spanish_province_name(id: ProvinceId) -> Option<&'static str> {
    SPANISH_PROVINCES
        .iter()
        .find(|p| p.id == id.0)
        .map(|p| p.name)
}

pub(crate) fn spanish_province_records() -> Vec<ProvinceRecord> {
    SPANISH_PROVINCES
        .iter()
        .map(|p| ProvinceRecord {
            id: ProvinceId(p.id),
            code: Some(format!("ES{}", p.prefix)),
            name: p.name.to_string(),
            country: Some("ES".to_string()),
        })
        .collect()
}
