use super::cities::{CityDefaults, CityTable};
use super::neighborhoods::NeighborhoodTable;
use super::types::{PostalCode, ProvinceId};

/// City and neighborhood lookups over injected, immutable tables.
///
/// Postal-code-only operations do not need tables and live in
/// [`super::province`] as free functions.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    cities: CityTable,
    neighborhoods: NeighborhoodTable,
}

impl AddressResolver {
    pub fn new(cities: CityTable, neighborhoods: NeighborhoodTable) -> Self {
        Self {
            cities,
            neighborhoods,
        }
    }

    /// Province and default postal code for a population name.
    pub fn lookup_city_defaults(&self, population: &str) -> Option<CityDefaults> {
        self.cities.lookup(population).cloned()
    }

    /// A more specific postal code than the city default, from neighborhood
    /// keywords in `street`. Only cities with a neighborhood table refine.
    pub fn refine_by_neighborhood(&self, street: &str, population: &str) -> Option<PostalCode> {
        let city = self.cities.lookup(population)?;
        self.neighborhoods.refine(&city.name, street).cloned()
    }

    /// Non-authoritative example postal code for a province: its first city.
    pub fn example_postal_code_for_province(&self, province_id: ProvinceId) -> Option<CityDefaults> {
        self.cities.first_in_province(province_id).cloned()
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(CityTable::builtin(), NeighborhoodTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::spain::spanish_province_name;

    #[test]
    fn test_lookup_city_defaults() {
        let resolver = AddressResolver::default();
        let madrid = resolver.lookup_city_defaults("madrid").unwrap();
        assert_eq!(madrid.province_id, ProvinceId(28));
        assert_eq!(madrid.postal_code.digits(), "28001");
        assert_eq!(madrid.province, "Madrid");
        assert!(resolver.lookup_city_defaults("Atlantis").is_none());
    }

    #[test]
    fn test_refine_by_neighborhood_through_alias() {
        let resolver = AddressResolver::default();
        let cp = resolver
            .refine_by_neighborhood("Carrer de Sueca 20, Russafa", "València")
            .unwrap();
        assert_eq!(cp.digits(), "46006");
    }

    #[test]
    fn test_refine_spec_fixture() {
        let resolver = AddressResolver::default();
        let cp = resolver
            .refine_by_neighborhood("C/ Mayor 3, Triana", "Sevilla")
            .unwrap();
        assert_eq!(cp.digits(), "41010");
    }

    #[test]
    fn test_refine_unknown_city_or_keyword() {
        let resolver = AddressResolver::default();
        assert!(resolver.refine_by_neighborhood("Triana", "Zaragoza").is_none());
        assert!(resolver.refine_by_neighborhood("Calle Real 1", "Sevilla").is_none());
        assert!(resolver.refine_by_neighborhood("Triana", "").is_none());
    }

    #[test]
    fn test_example_postal_code_for_province() {
        let resolver = AddressResolver::default();
        let example = resolver.example_postal_code_for_province(ProvinceId(30)).unwrap();
        assert_eq!(example.postal_code.digits(), "30001");
        assert!(resolver.example_postal_code_for_province(ProvinceId(0)).is_none());
    }

    #[test]
    fn test_substitute_tables() {
        let city = CityDefaults {
            name: "Ricote".into(),
            province: spanish_province_name(ProvinceId(30)).unwrap().into(),
            province_id: ProvinceId(30),
            postal_code: PostalCode::parse("30610").unwrap(),
        };
        let cities = CityTable::new(vec![(vec![], city)]).unwrap();
        let neighborhoods = NeighborhoodTable::new(vec![(
            "Ricote".to_string(),
            vec![("Barrio Alto".to_string(), "30611".to_string())],
        )])
        .unwrap();
        let resolver = AddressResolver::new(cities, neighborhoods);

        assert!(resolver.lookup_city_defaults("Murcia").is_none());
        assert_eq!(
            resolver
                .refine_by_neighborhood("Calle Mayor, Barrio Alto", "Ricote")
                .unwrap()
                .digits(),
            "30611"
        );
    }
}
