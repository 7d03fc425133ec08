//! District/neighborhood keywords that narrow a city default postal code.

use super::normalize::{comparison_key, contains_words};
use super::types::{PostalCode, TableError};

pub struct BuiltinNeighborhoods {
    pub city: &'static str,
    pub keywords: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone)]
struct CityNeighborhoods {
    city_key: String,
    keywords: Vec<(String, PostalCode)>,
}

#[derive(Debug, Clone, Default)]
pub struct NeighborhoodTable {
    cities: Vec<CityNeighborhoods>,
}

impl NeighborhoodTable {
    /// Build from `(city, [(keyword, postal_code)])` rows.
    ///
    /// A keyword repeated within one city must carry the same postal code.
    pub fn new<I>(rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (String, Vec<(String, String)>)>,
    {
        let mut cities: Vec<CityNeighborhoods> = Vec::new();

        for (city, keywords) in rows {
            let city_key = comparison_key(&city);
            if city_key.is_empty() {
                return Err(TableError::EmptyAlias { entry: city });
            }

            let pos = match cities.iter().position(|c| c.city_key == city_key) {
                Some(pos) => pos,
                None => {
                    cities.push(CityNeighborhoods {
                        city_key,
                        keywords: Vec::new(),
                    });
                    cities.len() - 1
                }
            };
            let entry = &mut cities[pos];

            for (keyword, raw_cp) in keywords {
                let key = comparison_key(&keyword);
                if key.is_empty() {
                    return Err(TableError::EmptyAlias { entry: city.clone() });
                }
                let postal_code =
                    PostalCode::parse(&raw_cp).ok_or_else(|| TableError::InvalidPostalCode {
                        entry: format!("{} / {}", city, keyword),
                        postal_code: raw_cp.clone(),
                    })?;

                match entry.keywords.iter().find(|(k, _)| *k == key) {
                    Some((_, existing)) if *existing == postal_code => {}
                    Some((_, existing)) => {
                        return Err(TableError::ConflictingAlias {
                            alias: key,
                            first: format!("{} ({})", city, existing),
                            second: format!("{} ({})", city, postal_code),
                        });
                    }
                    None => entry.keywords.push((key, postal_code)),
                }
            }
        }

        Ok(Self { cities })
    }

    pub fn builtin() -> Self {
        let rows = BUILTIN_NEIGHBORHOODS.iter().map(|n| {
            let keywords = n
                .keywords
                .iter()
                .map(|(k, cp)| (k.to_string(), cp.to_string()))
                .collect();
            (n.city.to_string(), keywords)
        });

        Self::new(rows).expect("built-in neighborhood table is inconsistent")
    }

    /// Postal code of the longest neighborhood keyword found in `street`.
    ///
    /// `city` is matched by comparison key only; callers resolve aliases first.
    pub fn refine(&self, city: &str, street: &str) -> Option<&PostalCode> {
        let city_key = comparison_key(city);
        let street_key = comparison_key(street);
        if street_key.is_empty() {
            return None;
        }

        let set = self.cities.iter().find(|c| c.city_key == city_key)?;

        let mut best: Option<&(String, PostalCode)> = None;
        for candidate in &set.keywords {
            if contains_words(&street_key, &candidate.0)
                && best.map_or(true, |(k, _)| candidate.0.len() > k.len())
            {
                best = Some(candidate);
            }
        }

        best.map(|(_, cp)| cp)
    }
}

pub const BUILTIN_NEIGHBORHOODS: &[BuiltinNeighborhoods] = &[
    BuiltinNeighborhoods {
        city: "Madrid",
        keywords: &[
            ("Salamanca", "28006"),
            ("Chamberí", "28010"),
            ("Retiro", "28009"),
            ("Chamartín", "28036"),
            ("Tetuán", "28020"),
            ("Moncloa", "28008"),
            ("Argüelles", "28008"),
            ("Arganzuela", "28045"),
            ("Delicias", "28045"),
            ("Lavapiés", "28012"),
            ("Malasaña", "28004"),
            ("Chueca", "28004"),
            ("Carabanchel", "28025"),
            ("Usera", "28026"),
            ("Vallecas", "28031"),
            ("Villa de Vallecas", "28031"),
            ("Puente de Vallecas", "28053"),
            ("Latina", "28047"),
            ("Aluche", "28047"),
            ("Hortaleza", "28043"),
            ("Barajas", "28042"),
            ("Vicálvaro", "28032"),
            ("Moratalaz", "28030"),
            ("Ciudad Lineal", "28027"),
            ("La Elipa", "28017"),
            ("Fuencarral", "28034"),
            ("El Pardo", "28048"),
            ("Villaverde", "28021"),
            ("San Blas", "28037"),
            ("Canillejas", "28022"),
            ("Las Tablas", "28050"),
            ("Sanchinarro", "28050"),
            ("Valdebebas", "28055"),
            ("Prosperidad", "28002"),
        ],
    },
    BuiltinNeighborhoods {
        city: "Barcelona",
        keywords: &[
            ("Eixample", "08007"),
            ("Eixample Dreta", "08009"),
            ("Eixample Esquerra", "08011"),
            ("Sagrada Família", "08013"),
            ("Gràcia", "08012"),
            ("Sants", "08014"),
            ("Les Corts", "08028"),
            ("Sarrià", "08017"),
            ("Sant Gervasi", "08021"),
            ("Pedralbes", "08034"),
            ("Horta", "08032"),
            ("Vall d'Hebron", "08035"),
            ("Nou Barris", "08042"),
            ("Sant Andreu", "08030"),
            ("Sant Martí", "08020"),
            ("Poblenou", "08005"),
            ("Diagonal Mar", "08019"),
            ("El Clot", "08018"),
            ("Barceloneta", "08003"),
            ("El Born", "08003"),
            ("Raval", "08001"),
            ("Gòtic", "08002"),
            ("Poble Sec", "08004"),
        ],
    },
    BuiltinNeighborhoods {
        city: "Valencia",
        keywords: &[
            ("Ruzafa", "46006"),
            ("Russafa", "46006"),
            ("Benimaclet", "46020"),
            ("Campanar", "46015"),
            ("Cabanyal", "46011"),
            ("Malvarrosa", "46011"),
            ("Patraix", "46018"),
            ("Benicalap", "46025"),
            ("Algirós", "46022"),
            ("El Carmen", "46003"),
            ("El Carme", "46003"),
            ("Ciutat Vella", "46001"),
            ("Benimamet", "46035"),
            ("Orriols", "46019"),
            ("Mestalla", "46010"),
            ("Pla del Real", "46010"),
            ("Quatre Carreres", "46013"),
            ("Nazaret", "46024"),
            ("Arrancapins", "46008"),
        ],
    },
    BuiltinNeighborhoods {
        city: "Sevilla",
        keywords: &[
            ("Triana", "41010"),
            ("Los Remedios", "41011"),
            ("Nervión", "41005"),
            ("Macarena", "41009"),
            ("Santa Cruz", "41004"),
            ("Alameda", "41002"),
            ("Bellavista", "41014"),
            ("San Pablo", "41007"),
            ("Cerro del Águila", "41006"),
            ("Pino Montano", "41008"),
            ("Sevilla Este", "41020"),
            ("Heliópolis", "41012"),
            ("Bermejales", "41012"),
            ("La Cartuja", "41092"),
            ("San Bernardo", "41018"),
            ("Arenal", "41001"),
        ],
    },
    BuiltinNeighborhoods {
        city: "Murcia",
        keywords: &[
            ("La Ñora", "30830"),
            ("El Palmar", "30120"),
            ("Espinardo", "30100"),
            ("El Puntal", "30100"),
            ("Puente Tocinos", "30006"),
            ("Vistalegre", "30007"),
            ("Vista Alegre", "30007"),
            ("La Flota", "30007"),
            ("El Carmen", "30002"),
            ("Santa María de Gracia", "30009"),
            ("El Ranero", "30009"),
            ("Infante Juan Manuel", "30011"),
            ("Los Dolores", "30011"),
            ("Santiago el Mayor", "30012"),
            ("Santa Eulalia", "30004"),
            ("San Andrés", "30005"),
            ("Churra", "30110"),
            ("Cabezo de Torres", "30110"),
            ("La Alberca", "30150"),
            ("Algezares", "30157"),
            ("Beniaján", "30570"),
            ("Torreagüera", "30580"),
        ],
    },
];
