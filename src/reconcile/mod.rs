//! Reconciliation of a client's postal code / population / province triple.
//!
//! Precedence:
//! 1. a resolvable postal code decides the province;
//! 2. without a postal code, the population supplies the city default
//!    (refined by neighborhood keywords in the street);
//! 3. postal code vs population disagreement keeps the postal code and is reported;
//! 4. with only a province, an example postal code may be filled in (opt-in).
//!
//! Fields are only written when the resolver produced a value; nothing is
//! cleared and populations are never rewritten.

use crate::resolver::{
    try_resolve_province, AddressResolver, CityDefaults, ProvinceCatalogue, ProvinceId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address fields of one client row. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAddress {
    pub postal_code: Option<String>,
    pub population: Option<String>,
    pub province_id: Option<ProvinceId>,
    pub street: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    PostalCode,
    Population,
    ProvinceId,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostalCode => write!(f, "postal_code"),
            Self::Population => write!(f, "population"),
            Self::ProvinceId => write!(f, "province_id"),
        }
    }
}

/// Where a written value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    PostalCode,
    CityDefault,
    Neighborhood,
    /// Placeholder from the city table; not authoritative.
    ExampleForProvince,
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostalCode => write!(f, "postal_code"),
            Self::CityDefault => write!(f, "city_default"),
            Self::Neighborhood => write!(f, "neighborhood"),
            Self::ExampleForProvince => write!(f, "example_for_province"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: AddressField,
    pub old: Option<String>,
    pub new: String,
    pub source: ChangeSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Stored province differs from the derived one.
    ProvinceMismatch,
    /// Population belongs to another province than the postal code.
    PopulationProvinceMismatch,
    UnresolvedPostalCode,
    UnknownPopulation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub field: AddressField,
    pub stored: Option<String>,
    pub derived: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Unchanged,
    Updated,
    Unresolved,
}

/// Values to write back. `None` means leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressUpdates {
    pub postal_code: Option<String>,
    pub province_id: Option<ProvinceId>,
}

impl AddressUpdates {
    pub fn is_empty(&self) -> bool {
        self.postal_code.is_none() && self.province_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub updates: AddressUpdates,
    pub changes: Vec<FieldChange>,
    pub discrepancies: Vec<Discrepancy>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilePolicy {
    /// Replace a stored province that contradicts the postal code.
    pub overwrite_conflicting_province: bool,
    /// Fill a placeholder postal code when only the province is known.
    pub allow_example_postal_code: bool,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            overwrite_conflicting_province: true,
            allow_example_postal_code: false,
        }
    }
}

pub struct Reconciler<'a> {
    resolver: &'a AddressResolver,
    catalogue: Option<&'a ProvinceCatalogue>,
    policy: ReconcilePolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        resolver: &'a AddressResolver,
        catalogue: Option<&'a ProvinceCatalogue>,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            resolver,
            catalogue,
            policy,
        }
    }

    pub fn reconcile(&self, address: &ClientAddress) -> Reconciliation {
        let postal_code = present(&address.postal_code);
        let population = present(&address.population);
        let street = present(&address.street);

        let city = population.and_then(|p| self.resolver.lookup_city_defaults(p));

        let mut updates = AddressUpdates::default();
        let mut changes = Vec::new();
        let mut discrepancies = Vec::new();
        let mut derived_province: Option<(ProvinceId, ChangeSource)> = None;

        if let Some(raw) = postal_code {
            match try_resolve_province(raw, self.catalogue) {
                Ok(id) => {
                    derived_province = Some((id, ChangeSource::PostalCode));
                    if let Some(city) = city.as_ref().filter(|c| c.province_id != id) {
                        discrepancies.push(Discrepancy {
                            kind: DiscrepancyKind::PopulationProvinceMismatch,
                            field: AddressField::Population,
                            stored: population.map(str::to_string),
                            derived: Some(id.to_string()),
                            message: format!(
                                "population '{}' is in province {} ({}) but postal code {} is in province {}",
                                population.unwrap_or_default(),
                                city.province_id,
                                city.province,
                                raw,
                                id
                            ),
                        });
                    }
                }
                Err(err) => {
                    discrepancies.push(Discrepancy {
                        kind: DiscrepancyKind::UnresolvedPostalCode,
                        field: AddressField::PostalCode,
                        stored: Some(raw.to_string()),
                        derived: None,
                        message: err.to_string(),
                    });
                    derived_province = city
                        .as_ref()
                        .map(|c| (c.province_id, ChangeSource::CityDefault));
                    if let (Some(population), None) = (population, city.as_ref()) {
                        discrepancies.push(unknown_population(population));
                    }
                }
            }
        } else if let Some(population) = population {
            match city.as_ref() {
                Some(city) => {
                    let (code, source) = street
                        .and_then(|s| self.resolver.refine_by_neighborhood(s, population))
                        .map(|cp| (cp, ChangeSource::Neighborhood))
                        .unwrap_or_else(|| (city.postal_code.clone(), ChangeSource::CityDefault));

                    let code = code.to_string();
                    changes.push(FieldChange {
                        field: AddressField::PostalCode,
                        old: address.postal_code.clone().filter(|s| !s.trim().is_empty()),
                        new: code.clone(),
                        source,
                    });
                    updates.postal_code = Some(code);
                    derived_province = Some((city.province_id, ChangeSource::CityDefault));
                }
                None => discrepancies.push(unknown_population(population)),
            }
        } else if let Some(province_id) = address.province_id {
            if self.policy.allow_example_postal_code {
                if let Some(example) = self.resolver.example_postal_code_for_province(province_id) {
                    let code = example.postal_code.to_string();
                    changes.push(FieldChange {
                        field: AddressField::PostalCode,
                        old: None,
                        new: code.clone(),
                        source: ChangeSource::ExampleForProvince,
                    });
                    updates.postal_code = Some(code);
                }
            }
        }

        if let Some((derived, source)) = derived_province {
            self.apply_province(
                address.province_id,
                derived,
                source,
                city.as_ref(),
                &mut updates,
                &mut changes,
                &mut discrepancies,
            );
        }

        let province_known = address.province_id.is_some() || updates.province_id.is_some();
        let outcome = if !changes.is_empty() {
            Outcome::Updated
        } else if !province_known
            || discrepancies.iter().any(|d| {
                matches!(
                    d.kind,
                    DiscrepancyKind::UnresolvedPostalCode | DiscrepancyKind::UnknownPopulation
                )
            })
        {
            Outcome::Unresolved
        } else {
            Outcome::Unchanged
        };

        Reconciliation {
            updates,
            changes,
            discrepancies,
            outcome,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_province(
        &self,
        stored: Option<ProvinceId>,
        derived: ProvinceId,
        source: ChangeSource,
        city: Option<&CityDefaults>,
        updates: &mut AddressUpdates,
        changes: &mut Vec<FieldChange>,
        discrepancies: &mut Vec<Discrepancy>,
    ) {
        match stored {
            None => {
                updates.province_id = Some(derived);
                changes.push(FieldChange {
                    field: AddressField::ProvinceId,
                    old: None,
                    new: derived.to_string(),
                    source,
                });
            }
            Some(current) if current == derived => {}
            Some(current) => {
                let origin = match (source, city) {
                    (ChangeSource::PostalCode, _) => "postal code".to_string(),
                    (_, Some(city)) => format!("population '{}'", city.name),
                    (_, None) => source.to_string(),
                };
                discrepancies.push(Discrepancy {
                    kind: DiscrepancyKind::ProvinceMismatch,
                    field: AddressField::ProvinceId,
                    stored: Some(current.to_string()),
                    derived: Some(derived.to_string()),
                    message: format!(
                        "stored province {} contradicts province {} derived from {}",
                        current, derived, origin
                    ),
                });

                if source == ChangeSource::PostalCode && self.policy.overwrite_conflicting_province {
                    updates.province_id = Some(derived);
                    changes.push(FieldChange {
                        field: AddressField::ProvinceId,
                        old: Some(current.to_string()),
                        new: derived.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

fn unknown_population(population: &str) -> Discrepancy {
    Discrepancy {
        kind: DiscrepancyKind::UnknownPopulation,
        field: AddressField::Population,
        stored: Some(population.to_string()),
        derived: None,
        message: format!("population '{}' is not in the city table", population),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ProvinceRecord;

    fn address(cp: Option<&str>, population: Option<&str>, province: Option<u32>) -> ClientAddress {
        ClientAddress {
            postal_code: cp.map(String::from),
            population: population.map(String::from),
            province_id: province.map(ProvinceId),
            street: None,
        }
    }

    fn reconcile(address: &ClientAddress) -> Reconciliation {
        let resolver = AddressResolver::default();
        Reconciler::new(&resolver, None, ReconcilePolicy::default()).reconcile(address)
    }

    #[test]
    fn test_postal_code_fills_missing_province() {
        let result = reconcile(&address(Some("30500"), None, None));
        assert_eq!(result.updates.province_id, Some(ProvinceId(30)));
        assert_eq!(result.updates.postal_code, None);
        assert_eq!(result.outcome, Outcome::Updated);
        assert_eq!(result.changes[0].source, ChangeSource::PostalCode);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_postal_code_wins_over_population() {
        let result = reconcile(&address(Some("30001"), Some("Madrid"), None));
        assert_eq!(result.updates.province_id, Some(ProvinceId(30)));
        assert_eq!(result.outcome, Outcome::Updated);
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(
            result.discrepancies[0].kind,
            DiscrepancyKind::PopulationProvinceMismatch
        );
    }

    #[test]
    fn test_stored_province_contradicting_postal_code_is_replaced() {
        let result = reconcile(&address(Some("28001"), Some("Madrid"), Some(30)));
        assert_eq!(result.updates.province_id, Some(ProvinceId(28)));
        assert_eq!(result.changes[0].old.as_deref(), Some("30"));
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::ProvinceMismatch);
    }

    #[test]
    fn test_policy_can_keep_conflicting_province() {
        let resolver = AddressResolver::default();
        let policy = ReconcilePolicy {
            overwrite_conflicting_province: false,
            ..ReconcilePolicy::default()
        };
        let result = Reconciler::new(&resolver, None, policy)
            .reconcile(&address(Some("28001"), None, Some(30)));
        assert!(result.updates.is_empty());
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::ProvinceMismatch);
        assert_eq!(result.outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_consistent_record_is_unchanged() {
        let result = reconcile(&address(Some("30001"), Some("Murcia"), Some(30)));
        assert!(result.updates.is_empty());
        assert!(result.discrepancies.is_empty());
        assert_eq!(result.outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_population_assigns_city_default() {
        let result = reconcile(&address(None, Some("Cartagena"), None));
        assert_eq!(result.updates.postal_code.as_deref(), Some("30201"));
        assert_eq!(result.updates.province_id, Some(ProvinceId(30)));
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.changes[0].source, ChangeSource::CityDefault);
    }

    #[test]
    fn test_population_refined_by_street() {
        let mut input = address(Some("  "), Some("Sevilla"), Some(41));
        input.street = Some("C/ Pureza 12, Triana".into());
        let result = reconcile(&input);
        assert_eq!(result.updates.postal_code.as_deref(), Some("41010"));
        assert_eq!(result.changes[0].source, ChangeSource::Neighborhood);
        assert_eq!(result.changes[0].old, None);
        assert_eq!(result.updates.province_id, None);
    }

    #[test]
    fn test_population_never_overwrites_stored_province() {
        let result = reconcile(&address(None, Some("Madrid"), Some(30)));
        assert_eq!(result.updates.province_id, None);
        assert_eq!(result.updates.postal_code.as_deref(), Some("28001"));
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::ProvinceMismatch);
    }

    #[test]
    fn test_unresolved_postal_code_falls_back_to_population_for_province() {
        let result = reconcile(&address(Some("99999"), Some("Lorca"), None));
        assert_eq!(result.updates.postal_code, None);
        assert_eq!(result.updates.province_id, Some(ProvinceId(30)));
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::UnresolvedPostalCode);
        assert_eq!(result.changes[0].source, ChangeSource::CityDefault);
    }

    #[test]
    fn test_unknown_population_is_unresolved() {
        let result = reconcile(&address(None, Some("Villanueva del Trabuco"), None));
        assert!(result.updates.is_empty());
        assert_eq!(result.outcome, Outcome::Unresolved);
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::UnknownPopulation);
    }

    #[test]
    fn test_unknown_population_is_fine_when_postal_code_resolves() {
        let result = reconcile(&address(Some("29320"), Some("Villanueva del Trabuco"), Some(29)));
        assert_eq!(result.outcome, Outcome::Unchanged);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_unresolved_postal_code_and_unknown_population() {
        let result = reconcile(&address(Some("123"), Some("Villanueva del Trabuco"), None));
        assert_eq!(result.outcome, Outcome::Unresolved);
        let kinds: Vec<_> = result.discrepancies.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiscrepancyKind::UnresolvedPostalCode,
                DiscrepancyKind::UnknownPopulation
            ]
        );
    }

    #[test]
    fn test_empty_record_is_unresolved() {
        let result = reconcile(&ClientAddress::default());
        assert_eq!(result.outcome, Outcome::Unresolved);
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_province_only_left_alone_by_default() {
        let result = reconcile(&address(None, None, Some(30)));
        assert!(result.updates.is_empty());
        assert_eq!(result.outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_province_only_example_postal_code_opt_in() {
        let resolver = AddressResolver::default();
        let policy = ReconcilePolicy {
            allow_example_postal_code: true,
            ..ReconcilePolicy::default()
        };
        let result =
            Reconciler::new(&resolver, None, policy).reconcile(&address(None, None, Some(30)));
        assert_eq!(result.updates.postal_code.as_deref(), Some("30001"));
        assert_eq!(result.changes[0].source, ChangeSource::ExampleForProvince);
    }

    #[test]
    fn test_portuguese_postal_code_with_catalogue() {
        let resolver = AddressResolver::default();
        let catalogue = ProvinceCatalogue::new(vec![ProvinceRecord {
            id: ProvinceId(60),
            code: Some("PT11".into()),
            name: "Lisboa".into(),
            country: Some("PT".into()),
        }]);
        let result = Reconciler::new(&resolver, Some(&catalogue), ReconcilePolicy::default())
            .reconcile(&address(Some("1000-123"), None, None));
        assert_eq!(result.updates.province_id, Some(ProvinceId(60)));
    }

    #[test]
    fn test_portuguese_postal_code_without_catalogue_is_unresolved() {
        let result = reconcile(&address(Some("1000-123"), None, None));
        assert!(result.updates.is_empty());
        assert_eq!(result.outcome, Outcome::Unresolved);
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::UnresolvedPostalCode);
    }
}
