use crate::core::{ConfigProvider, Dataset, Pipeline, Record, Storage, TransformResult};
use crate::domain::model::{
    CatalogueSource, ColumnMapping, ReconcileSummary, RowChange, RowDiscrepancy,
};
use crate::reconcile::{AddressField, ClientAddress, Outcome, Reconciler};
use crate::resolver::{AddressResolver, ProvinceCatalogue, ProvinceId, ProvinceRecord};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const RECONCILED_FILE: &str = "clients_reconciled.csv";
pub const CHANGES_FILE: &str = "changes.csv";
pub const DISCREPANCIES_FILE: &str = "discrepancies.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Positions of the mapped columns in the input header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    id: Option<usize>,
    postal_code: usize,
    population: usize,
    province_id: usize,
    street: Option<usize>,
}

impl ColumnIndices {
    fn resolve(dataset: &Dataset, columns: &ColumnMapping) -> Result<Self> {
        let required = |name: &str| {
            dataset
                .column_index(name)
                .ok_or_else(|| EtlError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            id: dataset.column_index(&columns.id),
            postal_code: required(&columns.postal_code)?,
            population: required(&columns.population)?,
            province_id: required(&columns.province_id)?,
            street: dataset.column_index(&columns.street),
        })
    }

    fn for_field(&self, field: AddressField) -> usize {
        match field {
            AddressField::PostalCode => self.postal_code,
            AddressField::Population => self.population,
            AddressField::ProvinceId => self.province_id,
        }
    }
}

/// CSV client export in, corrected CSV plus change/discrepancy reports out.
pub struct ReconcilePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: Client,
    pub(crate) resolver: AddressResolver,
}

impl<S: Storage, C: ConfigProvider> ReconcilePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_resolver(storage, config, AddressResolver::default())
    }

    pub fn with_resolver(storage: S, config: C, resolver: AddressResolver) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            resolver,
        }
    }

    async fn load_catalogue(&self) -> Result<ProvinceCatalogue> {
        let catalogue = match self.config.catalogue_source() {
            None => {
                tracing::info!("No province catalogue configured, using the built-in Spanish provinces");
                return Ok(ProvinceCatalogue::spain());
            }
            Some(CatalogueSource::File(path)) => {
                tracing::debug!("Reading province catalogue from {}", path);
                let data = self.storage.read_file(path).await?;
                parse_catalogue_file(path, &data, self.config.catalogue_delimiter())?
            }
            Some(CatalogueSource::Endpoint(url)) => self.fetch_catalogue(url).await?,
        };

        if catalogue.is_empty() {
            return Err(EtlError::CatalogueError {
                message: "catalogue has no provinces".to_string(),
            });
        }

        tracing::info!("Loaded {} provinces from catalogue", catalogue.len());
        Ok(catalogue)
    }

    async fn fetch_catalogue(&self, url: &str) -> Result<ProvinceCatalogue> {
        tracing::debug!("Making catalogue request to: {}", url);
        let response = self.client.get(url).send().await?;

        tracing::debug!("Catalogue response status: {}", response.status());
        if !response.status().is_success() {
            return Err(EtlError::CatalogueError {
                message: format!("{} returned HTTP {}", url, response.status()),
            });
        }

        let records: Vec<ProvinceRecord> =
            response.json().await.map_err(|e| EtlError::CatalogueError {
                message: format!("{} did not return a province array: {}", url, e),
            })?;
        Ok(ProvinceCatalogue::new(records))
    }

    fn csv_bytes(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let width = dataset.headers.len();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter())
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&dataset.headers)?;
        for record in &dataset.records {
            // Short rows are padded to the header width; extra trailing fields are kept.
            let padding = width.saturating_sub(record.values.len());
            writer.write_record(
                record
                    .values
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::repeat("").take(padding)),
            )?;
        }
        writer
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }

    async fn write_outputs(&self, files: Vec<(&'static str, Vec<u8>)>) -> Result<String> {
        let output_dir = Path::new(self.config.output_path());

        match self.config.archive_name() {
            Some(archive_name) => {
                tracing::debug!("Creating ZIP file with {} files", files.len());

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for (name, data) in &files {
                        zip.start_file::<_, ()>(*name, FileOptions::default())?;
                        zip.write_all(data)?;
                    }
                    // 完成並取回底層 Vec<u8>
                    zip.finish()?.into_inner()
                };

                let archive_path = output_dir.join(archive_name).to_string_lossy().to_string();
                tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), archive_path);
                self.storage.write_file(&archive_path, &zip_data).await?;
                Ok(archive_path)
            }
            None => {
                for (name, data) in &files {
                    let path = output_dir.join(name).to_string_lossy().to_string();
                    tracing::debug!("Writing {} ({} bytes)", path, data.len());
                    self.storage.write_file(&path, data).await?;
                }
                Ok(self.config.output_path().to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReconcilePipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let input = self.config.input_path();
        tracing::debug!("Reading client export from {}", input);
        let data = self.storage.read_file(input).await?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter())
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row?;
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 2);
            if row.len() != headers.len() {
                tracing::warn!(
                    line,
                    fields = row.len(),
                    expected = headers.len(),
                    "row has {} fields, header has {}",
                    row.len(),
                    headers.len()
                );
            }
            records.push(Record {
                line,
                values: row.iter().map(str::to_string).collect(),
            });
        }

        let dataset = Dataset { headers, records };
        ColumnIndices::resolve(&dataset, self.config.columns())?;
        Ok(dataset)
    }

    async fn transform(&self, mut data: Dataset) -> Result<TransformResult> {
        let columns = ColumnIndices::resolve(&data, self.config.columns())?;
        let catalogue = self.load_catalogue().await?;
        let reconciler = Reconciler::new(&self.resolver, Some(&catalogue), self.config.policy());

        let malformed_rows = data
            .records
            .iter()
            .filter(|r| r.values.len() != data.headers.len())
            .count();

        let mut changes = Vec::new();
        let mut discrepancies = Vec::new();
        let (mut updated, mut unchanged, mut unresolved) = (0, 0, 0);

        for record in data.records.iter_mut() {
            let client_id = record
                .get(columns.id)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let id_label = client_id.as_deref().unwrap_or("-");

            let address = ClientAddress {
                postal_code: record.get(Some(columns.postal_code)).map(str::to_string),
                population: record.get(Some(columns.population)).map(str::to_string),
                province_id: parse_province_id(
                    record.get(Some(columns.province_id)).unwrap_or_default(),
                    record.line,
                    id_label,
                ),
                street: record.get(columns.street).map(str::to_string),
            };

            let result = reconciler.reconcile(&address);

            for change in &result.changes {
                tracing::info!(
                    line = record.line,
                    client_id = id_label,
                    field = %change.field,
                    source = %change.source,
                    "{} {} -> {}",
                    change.field,
                    change.old.as_deref().unwrap_or("<empty>"),
                    change.new
                );
                let stored = record
                    .get(Some(columns.for_field(change.field)))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                changes.push(RowChange {
                    line: record.line,
                    client_id: client_id.clone(),
                    field: change.field,
                    old: change.old.clone().or(stored),
                    new: change.new.clone(),
                    source: change.source,
                });
            }

            for discrepancy in &result.discrepancies {
                tracing::warn!(
                    line = record.line,
                    client_id = id_label,
                    field = %discrepancy.field,
                    "{}",
                    discrepancy.message
                );
                discrepancies.push(RowDiscrepancy {
                    line: record.line,
                    client_id: client_id.clone(),
                    outcome: result.outcome,
                    discrepancy: discrepancy.clone(),
                });
            }

            if let Some(postal_code) = &result.updates.postal_code {
                record.set(columns.postal_code, postal_code.clone());
            }
            if let Some(province_id) = result.updates.province_id {
                record.set(columns.province_id, province_id.to_string());
            }

            match result.outcome {
                Outcome::Updated => updated += 1,
                Outcome::Unchanged => {
                    tracing::debug!(line = record.line, client_id = id_label, "unchanged");
                    unchanged += 1;
                }
                Outcome::Unresolved => {
                    tracing::warn!(
                        line = record.line,
                        client_id = id_label,
                        "could not determine province"
                    );
                    unresolved += 1;
                }
            }
        }

        let count = |field: AddressField, replaced: bool| {
            changes
                .iter()
                .filter(|c| c.field == field && c.old.is_some() == replaced)
                .count()
        };

        let summary = ReconcileSummary {
            total_rows: data.records.len(),
            malformed_rows,
            updated,
            unchanged,
            unresolved,
            discrepancies: discrepancies.len(),
            postal_codes_filled: count(AddressField::PostalCode, false),
            provinces_filled: count(AddressField::ProvinceId, false),
            provinces_replaced: count(AddressField::ProvinceId, true),
            catalogue_size: catalogue.len(),
            dry_run: self.config.dry_run(),
            generated_at: Utc::now(),
        };

        Ok(TransformResult {
            dataset: data,
            changes,
            discrepancies,
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut files = Vec::new();

        if self.config.dry_run() {
            tracing::info!("Dry run: {} not written", RECONCILED_FILE);
        } else {
            files.push((RECONCILED_FILE, self.csv_bytes(&result.dataset)?));
        }

        files.push((CHANGES_FILE, changes_csv(&result.changes)?));
        files.push((
            DISCREPANCIES_FILE,
            serde_json::to_vec_pretty(&result.discrepancies)?,
        ));
        files.push((SUMMARY_FILE, serde_json::to_vec_pretty(&result.summary)?));

        self.write_outputs(files).await
    }
}

/// Empty and `0` mean "no province"; anything else non-numeric is treated the
/// same but logged.
fn parse_province_id(raw: &str, line: u64, client_id: &str) -> Option<ProvinceId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(0) => None,
        Ok(id) => Some(ProvinceId(id)),
        Err(_) => {
            tracing::warn!(line, client_id, "ignoring non-numeric province id '{}'", raw);
            None
        }
    }
}

fn parse_catalogue_file(path: &str, data: &[u8], delimiter: u8) -> Result<ProvinceCatalogue> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(data)
            .deserialize::<ProvinceRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| EtlError::CatalogueError {
                message: format!("{}: {}", path, e),
            })?
    } else {
        serde_json::from_slice::<Vec<ProvinceRecord>>(data).map_err(|e| {
            EtlError::CatalogueError {
                message: format!("{}: {}", path, e),
            }
        })?
    };

    Ok(ProvinceCatalogue::new(records))
}

fn changes_csv(changes: &[RowChange]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["line", "client_id", "field", "old", "new", "source"])?;
    for change in changes {
        writer.serialize(change)?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
