//! Postal code / province / population resolution.
//!
//! Pure lookups over static tables: no I/O, no shared mutable state. Every
//! lookup returns `None` on failure; [`try_resolve_province`] is the typed
//! variant for callers that need to know why.

pub mod address_resolver;
pub mod catalogue;
pub mod cities;
pub mod neighborhoods;
pub mod normalize;
pub mod portugal;
pub mod province;
pub mod spain;
pub mod types;

pub use address_resolver::AddressResolver;
pub use catalogue::ProvinceCatalogue;
pub use cities::{CityDefaults, CityTable};
pub use neighborhoods::NeighborhoodTable;
pub use normalize::{comparison_key, normalize_text};
pub use portugal::resolve_portuguese_province_code;
pub use province::{
    detect_country, resolve_match, resolve_province, resolve_province_full, try_resolve_province,
};
pub use spain::resolve_spanish_province;
pub use types::{
    Country, PostalCode, ProvinceCode, ProvinceId, ProvinceMatch, ProvinceRecord,
    ResolutionError, TableError,
};
