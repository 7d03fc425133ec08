use crate::reconcile::{AddressField, ChangeSource, Discrepancy, Outcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One CSV row. `line` is the 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub line: u64,
    pub values: Vec<String>,
}

impl Record {
    pub fn get(&self, column: Option<usize>) -> Option<&str> {
        column.and_then(|idx| self.values.get(idx)).map(String::as_str)
    }

    pub fn set(&mut self, column: usize, value: String) {
        if column >= self.values.len() {
            self.values.resize(column + 1, String::new());
        }
        self.values[column] = value;
    }
}

/// Header row plus records, column order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(wanted))
    }
}

/// CSV header names for the address fields. `id` and `street` may be absent
/// from the input; the other three are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
#[serde(default)]
pub struct ColumnMapping {
    #[cfg_attr(feature = "cli", arg(long = "col-id", default_value = "Id"))]
    pub id: String,
    #[cfg_attr(
        feature = "cli",
        arg(long = "col-postal-code", default_value = "CodigoPostal")
    )]
    pub postal_code: String,
    #[cfg_attr(feature = "cli", arg(long = "col-population", default_value = "Poblacion"))]
    pub population: String,
    #[cfg_attr(
        feature = "cli",
        arg(long = "col-province-id", default_value = "Id_Provincia")
    )]
    pub province_id: String,
    #[cfg_attr(feature = "cli", arg(long = "col-street", default_value = "Direccion"))]
    pub street: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "Id".to_string(),
            postal_code: "CodigoPostal".to_string(),
            population: "Poblacion".to_string(),
            province_id: "Id_Provincia".to_string(),
            street: "Direccion".to_string(),
        }
    }
}

/// Where the province catalogue comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueSource<'a> {
    File(&'a str),
    Endpoint(&'a str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChange {
    pub line: u64,
    pub client_id: Option<String>,
    pub field: AddressField,
    pub old: Option<String>,
    pub new: String,
    pub source: ChangeSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDiscrepancy {
    pub line: u64,
    pub client_id: Option<String>,
    pub outcome: Outcome,
    #[serde(flatten)]
    pub discrepancy: Discrepancy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub total_rows: usize,
    /// Rows whose field count differs from the header.
    pub malformed_rows: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub unresolved: usize,
    pub discrepancies: usize,
    pub postal_codes_filled: usize,
    pub provinces_filled: usize,
    pub provinces_replaced: usize,
    pub catalogue_size: usize,
    pub dry_run: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataset: Dataset,
    pub changes: Vec<RowChange>,
    pub discrepancies: Vec<RowDiscrepancy>,
    pub summary: ReconcileSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_ignores_case_and_bom() {
        let dataset = Dataset {
            headers: vec!["\u{feff}Id".into(), "codigopostal".into(), " Poblacion ".into()],
            records: vec![],
        };
        assert_eq!(dataset.column_index("Id"), Some(0));
        assert_eq!(dataset.column_index("CodigoPostal"), Some(1));
        assert_eq!(dataset.column_index("Poblacion"), Some(2));
        assert_eq!(dataset.column_index("Direccion"), None);
    }

    #[test]
    fn test_record_set_pads_short_rows() {
        let mut record = Record {
            line: 2,
            values: vec!["1".into()],
        };
        record.set(3, "30001".into());
        assert_eq!(record.values, vec!["1", "", "", "30001"]);
        assert_eq!(record.get(Some(3)), Some("30001"));
        assert_eq!(record.get(None), None);
    }
}
