use super::spain::spanish_province_records;
use super::types::{ProvinceId, ProvinceRecord};
use serde::{Deserialize, Serialize};

/// Province rows owned by the CRM database, in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceCatalogue {
    records: Vec<ProvinceRecord>,
}

impl ProvinceCatalogue {
    pub fn new(records: Vec<ProvinceRecord>) -> Self {
        Self { records }
    }

    /// The 52 Spanish provinces from the built-in prefix table.
    pub fn spain() -> Self {
        Self::new(spanish_province_records())
    }

    pub fn find_by_id(&self, id: ProvinceId) -> Option<&ProvinceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Case-insensitive match on the `code` column.
    pub fn find_by_code(&self, code: &str) -> Option<&ProvinceRecord> {
        self.records.iter().find(|r| {
            r.code
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(code))
        })
    }

    pub fn records(&self) -> &[ProvinceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
