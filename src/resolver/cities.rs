//! City-level defaults (province + representative postal code).

use super::normalize::{comparison_key, contains_words};
use super::spain::spanish_province_name;
use super::types::{PostalCode, ProvinceId, TableError};
use serde::Serialize;

/// Queries shorter than this are never matched as a fragment of a longer alias.
const MIN_FRAGMENT_LEN: usize = 3;

/// Defaults for a municipality, returned by city lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityDefaults {
    pub name: String,
    pub province: String,
    pub province_id: ProvinceId,
    pub postal_code: PostalCode,
}

/// A row of the built-in dataset. `names[0]` is the display name.
pub struct BuiltinCity {
    pub names: &'static [&'static str],
    pub province_id: u32,
    pub postal_code: &'static str,
}

/// Lookup table keyed by [`comparison_key`] of every alias.
#[derive(Debug, Clone)]
pub struct CityTable {
    entries: Vec<CityDefaults>,
    aliases: Vec<(String, usize)>,
}

impl CityTable {
    /// Build a table from `(aliases, defaults)` rows.
    ///
    /// Aliases that normalize to the same key collapse when they carry the same
    /// defaults and fail with [`TableError::ConflictingAlias`] otherwise.
    pub fn new<I>(rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Vec<String>, CityDefaults)>,
    {
        let mut entries: Vec<CityDefaults> = Vec::new();
        let mut aliases: Vec<(String, usize)> = Vec::new();

        for (names, defaults) in rows {
            let idx = match entries.iter().position(|e| *e == defaults) {
                Some(existing) => existing,
                None => {
                    entries.push(defaults);
                    entries.len() - 1
                }
            };

            for name in names.iter().chain(std::iter::once(&entries[idx].name)) {
                let key = comparison_key(name);
                if key.is_empty() {
                    return Err(TableError::EmptyAlias {
                        entry: entries[idx].name.clone(),
                    });
                }

                match aliases.iter().find(|(k, _)| *k == key) {
                    Some((_, other)) if entries[*other] == entries[idx] => {}
                    Some((_, other)) => {
                        return Err(TableError::ConflictingAlias {
                            alias: key,
                            first: describe(&entries[*other]),
                            second: describe(&entries[idx]),
                        });
                    }
                    None => aliases.push((key, idx)),
                }
            }
        }

        Ok(Self { entries, aliases })
    }

    /// The built-in dataset of major Spanish municipalities.
    pub fn builtin() -> Self {
        let rows = BUILTIN_CITIES.iter().filter_map(|city| {
            let defaults = builtin_to_defaults(city)?;
            let names = city.names.iter().map(|n| n.to_string()).collect();
            Some((names, defaults))
        });

        Self::new(rows).expect("built-in city table has conflicting aliases")
    }

    /// Exact key match first, then whole-word containment in either direction.
    ///
    /// Among containment hits the longest matched fragment wins; equal lengths
    /// fall back to table order.
    pub fn lookup(&self, population: &str) -> Option<&CityDefaults> {
        let key = comparison_key(population);
        if key.is_empty() {
            return None;
        }

        if let Some((_, idx)) = self.aliases.iter().find(|(alias, _)| *alias == key) {
            return Some(&self.entries[*idx]);
        }

        let mut best: Option<(usize, usize)> = None;
        for (alias, idx) in &self.aliases {
            let matched = if contains_words(&key, alias) {
                alias.len()
            } else if key.len() >= MIN_FRAGMENT_LEN && contains_words(alias, &key) {
                key.len()
            } else {
                continue;
            };

            if best.map_or(true, |(len, _)| matched > len) {
                best = Some((matched, *idx));
            }
        }

        best.map(|(_, idx)| &self.entries[idx])
    }

    /// First entry, in table order, belonging to `province_id`.
    pub fn first_in_province(&self, province_id: ProvinceId) -> Option<&CityDefaults> {
        self.entries.iter().find(|e| e.province_id == province_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe(entry: &CityDefaults) -> String {
    format!("{} ({})", entry.name, entry.postal_code)
}

fn builtin_to_defaults(city: &BuiltinCity) -> Option<CityDefaults> {
    let province_id = ProvinceId(city.province_id);
    Some(CityDefaults {
        name: city.names.first()?.to_string(),
        province: spanish_province_name(province_id)?.to_string(),
        province_id,
        postal_code: PostalCode::parse(city.postal_code)?,
    })
}

macro_rules! city {
    ([$($name:literal),+ $(,)?], $province:literal, $cp:literal) => {
        BuiltinCity { names: &[$($name),+], province_id: $province, postal_code: $cp }
    };
}

/// Ordered so that provincial capitals precede other towns of the same province.
pub const BUILTIN_CITIES: &[BuiltinCity] = &[
    // Capitals
    city!(["Madrid"], 28, "28001"),
    city!(["Barcelona"], 8, "08001"),
    city!(["Valencia", "València"], 46, "46001"),
    city!(["Sevilla", "Seville"], 41, "41001"),
    city!(["Zaragoza"], 50, "50001"),
    city!(["Málaga"], 29, "29001"),
    city!(["Murcia"], 30, "30001"),
    city!(["Palma", "Palma de Mallorca"], 7, "07001"),
    city!(["Las Palmas de Gran Canaria", "Las Palmas"], 35, "35001"),
    city!(["Bilbao", "Bilbo"], 48, "48001"),
    city!(["Alicante", "Alacant"], 3, "03001"),
    city!(["Córdoba"], 14, "14001"),
    city!(["Valladolid"], 47, "47001"),
    city!(["Vitoria-Gasteiz", "Vitoria", "Gasteiz"], 1, "01001"),
    city!(["A Coruña", "La Coruña", "Coruña"], 15, "15001"),
    city!(["Granada"], 18, "18001"),
    city!(["Oviedo"], 33, "33001"),
    city!(["Santa Cruz de Tenerife"], 38, "38001"),
    city!(["Pamplona", "Iruña"], 31, "31001"),
    city!(["Almería"], 4, "04001"),
    city!(["San Sebastián", "Donostia", "Donostia-San Sebastián"], 20, "20001"),
    city!(["Burgos"], 9, "09001"),
    city!(["Albacete"], 2, "02001"),
    city!(["Santander"], 39, "39001"),
    city!(["Castellón de la Plana", "Castellón", "Castelló de la Plana"], 12, "12001"),
    city!(["Logroño"], 26, "26001"),
    city!(["Badajoz"], 6, "06001"),
    city!(["Salamanca"], 37, "37001"),
    city!(["Huelva"], 21, "21001"),
    city!(["Lleida", "Lérida"], 25, "25001"),
    city!(["Tarragona"], 43, "43001"),
    city!(["León"], 24, "24001"),
    city!(["Cádiz"], 11, "11001"),
    city!(["Jaén"], 23, "23001"),
    city!(["Ourense", "Orense"], 32, "32001"),
    city!(["Lugo"], 27, "27001"),
    city!(["Girona", "Gerona"], 17, "17001"),
    city!(["Cáceres"], 10, "10001"),
    city!(["Palencia"], 34, "34001"),
    city!(["Pontevedra"], 36, "36001"),
    city!(["Guadalajara"], 19, "19001"),
    city!(["Toledo"], 45, "45001"),
    city!(["Zamora"], 49, "49001"),
    city!(["Ciudad Real"], 13, "13001"),
    city!(["Segovia"], 40, "40001"),
    city!(["Ávila"], 5, "05001"),
    city!(["Cuenca"], 16, "16001"),
    city!(["Soria"], 42, "42001"),
    city!(["Teruel"], 44, "44001"),
    city!(["Huesca"], 22, "22001"),
    city!(["Ceuta"], 51, "51001"),
    city!(["Melilla"], 52, "52001"),
    // Comunidad de Madrid
    city!(["Móstoles"], 28, "28931"),
    city!(["Alcalá de Henares"], 28, "28801"),
    city!(["Fuenlabrada"], 28, "28941"),
    city!(["Leganés"], 28, "28911"),
    city!(["Getafe"], 28, "28901"),
    city!(["Alcorcón"], 28, "28921"),
    city!(["Parla"], 28, "28980"),
    city!(["Torrejón de Ardoz"], 28, "28850"),
    city!(["Alcobendas"], 28, "28100"),
    city!(["Coslada"], 28, "28820"),
    city!(["Rivas-Vaciamadrid"], 28, "28521"),
    city!(["Pozuelo de Alarcón"], 28, "28223"),
    city!(["Las Rozas de Madrid", "Las Rozas"], 28, "28230"),
    city!(["San Sebastián de los Reyes"], 28, "28700"),
    city!(["Majadahonda"], 28, "28220"),
    city!(["Aranjuez"], 28, "28300"),
    city!(["Arganda del Rey"], 28, "28500"),
    city!(["Collado Villalba"], 28, "28400"),
    city!(["Boadilla del Monte"], 28, "28660"),
    city!(["Valdemoro"], 28, "28340"),
    // Cataluña
    city!(["L'Hospitalet de Llobregat", "Hospitalet de Llobregat"], 8, "08901"),
    city!(["Terrassa"], 8, "08221"),
    city!(["Badalona"], 8, "08911"),
    city!(["Sabadell"], 8, "08201"),
    city!(["Mataró"], 8, "08301"),
    city!(["Santa Coloma de Gramenet"], 8, "08921"),
    city!(["Cornellà de Llobregat"], 8, "08940"),
    city!(["Castelldefels"], 8, "08860"),
    city!(["Granollers"], 8, "08400"),
    city!(["Manresa"], 8, "08240"),
    city!(["Rubí"], 8, "08191"),
    city!(["Vilanova i la Geltrú"], 8, "08800"),
    city!(["Viladecans"], 8, "08840"),
    city!(["Sant Cugat del Vallès", "Sant Cugat"], 8, "08172"),
    city!(["Sant Boi de Llobregat"], 8, "08830"),
    city!(["Reus"], 43, "43201"),
    // Comunitat Valenciana
    city!(["Elche", "Elx"], 3, "03201"),
    city!(["Torrevieja"], 3, "03181"),
    city!(["Orihuela"], 3, "03300"),
    city!(["Benidorm"], 3, "03501"),
    city!(["Elda"], 3, "03600"),
    city!(["Alcoy", "Alcoi"], 3, "03801"),
    city!(["San Vicente del Raspeig", "Sant Vicent del Raspeig"], 3, "03690"),
    city!(["Gandia"], 46, "46701"),
    city!(["Torrent"], 46, "46900"),
    city!(["Paterna"], 46, "46980"),
    city!(["Sagunto", "Sagunt"], 46, "46500"),
    city!(["Villarreal", "Vila-real"], 12, "12540"),
    // Región de Murcia
    city!(["Cartagena"], 30, "30201"),
    city!(["Lorca"], 30, "30800"),
    city!(["Molina de Segura"], 30, "30500"),
    city!(["Alcantarilla"], 30, "30820"),
    city!(["Águilas"], 30, "30880"),
    city!(["Yecla"], 30, "30510"),
    city!(["Jumilla"], 30, "30520"),
    city!(["Caravaca de la Cruz", "Caravaca"], 30, "30400"),
    city!(["Cieza"], 30, "30530"),
    city!(["Totana"], 30, "30850"),
    city!(["Mazarrón"], 30, "30870"),
    city!(["San Javier"], 30, "30730"),
    city!(["Torre-Pacheco"], 30, "30700"),
    city!(["San Pedro del Pinatar"], 30, "30740"),
    city!(["Mula"], 30, "30170"),
    city!(["Archena"], 30, "30600"),
    city!(["Las Torres de Cotillas"], 30, "30565"),
    city!(["La Unión"], 30, "30360"),
    city!(["Los Alcázares"], 30, "30710"),
    city!(["Cehegín"], 30, "30430"),
    city!(["Alhama de Murcia"], 30, "30840"),
    city!(["Santomera"], 30, "30140"),
    city!(["Puerto Lumbreras"], 30, "30890"),
    city!(["Fuente Álamo de Murcia", "Fuente Álamo"], 30, "30320"),
    city!(["Bullas"], 30, "30180"),
    city!(["Abarán"], 30, "30550"),
    city!(["Calasparra"], 30, "30420"),
    city!(["Beniel"], 30, "30130"),
    city!(["Ceutí"], 30, "30562"),
    city!(["Lorquí"], 30, "30564"),
    city!(["Alguazas"], 30, "30560"),
    city!(["Moratalla"], 30, "30440"),
    // Andalucía
    city!(["Jerez de la Frontera", "Jerez"], 11, "11401"),
    city!(["Marbella"], 29, "29601"),
    city!(["Dos Hermanas"], 41, "41701"),
    city!(["Alcalá de Guadaíra"], 41, "41500"),
    city!(["El Puerto de Santa María"], 11, "11500"),
    city!(["Algeciras"], 11, "11201"),
    city!(["Chiclana de la Frontera", "Chiclana"], 11, "11130"),
    city!(["San Fernando"], 11, "11100"),
    city!(["Sanlúcar de Barrameda"], 11, "11540"),
    city!(["Linares"], 23, "23700"),
    city!(["Motril"], 18, "18600"),
    city!(["Roquetas de Mar"], 4, "04740"),
    city!(["El Ejido"], 4, "04700"),
    city!(["Vélez-Málaga"], 29, "29700"),
    city!(["Fuengirola"], 29, "29640"),
    city!(["Mijas"], 29, "29650"),
    city!(["Estepona"], 29, "29680"),
    city!(["Benalmádena"], 29, "29630"),
    city!(["Torremolinos"], 29, "29620"),
    city!(["Écija"], 41, "41400"),
    city!(["Utrera"], 41, "41710"),
    city!(["Lucena"], 14, "14900"),
    // Rest
    city!(["Vigo"], 36, "36201"),
    city!(["Gijón", "Xixón"], 33, "33201"),
    city!(["Avilés"], 33, "33401"),
    city!(["Santiago de Compostela"], 15, "15701"),
    city!(["Ferrol"], 15, "15401"),
    city!(["Barakaldo"], 48, "48901"),
    city!(["Getxo"], 48, "48991"),
    city!(["Irún"], 20, "20301"),
    city!(["Ponferrada"], 24, "24401"),
    city!(["Talavera de la Reina"], 45, "45600"),
    city!(["Puertollano"], 13, "13500"),
    city!(["Alcázar de San Juan"], 13, "13600"),
    city!(["Mérida"], 6, "06800"),
    city!(["San Cristóbal de La Laguna", "La Laguna"], 38, "38201"),
    city!(["Arona"], 38, "38640"),
    city!(["Telde"], 35, "35200"),
    city!(["Santa Lucía de Tirajana"], 35, "35110"),
    city!(["Ibiza", "Eivissa"], 7, "07800"),
    city!(["Manacor"], 7, "07500"),
    city!(["Calvià"], 7, "07184"),
];
