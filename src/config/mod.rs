pub mod cli;
pub mod toml_config;

use crate::domain::model::{CatalogueSource, ColumnMapping};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::reconcile::ReconcilePolicy;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_catalogue_source, validate_delimiter};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARCHIVE_NAME: &str = "reconcile_output.zip";
pub const DEFAULT_CATALOGUE_DELIMITER: &str = ",";

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "address-etl")]
#[command(about = "Reconcile postal code, population and province in a CRM client export")]
pub struct CliConfig {
    /// Client export (CSV with a header row)
    #[arg(short, long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Province catalogue as JSON array or CSV (id,code,name,country)
    #[arg(long)]
    pub catalogue_file: Option<String>,

    /// URL returning the province catalogue as a JSON array
    #[arg(long)]
    pub catalogue_endpoint: Option<String>,

    /// Field delimiter of a CSV catalogue file
    #[arg(long, default_value = DEFAULT_CATALOGUE_DELIMITER)]
    pub catalogue_delimiter: String,

    /// Field delimiter of the input CSV (use \t for tabs)
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Write the reports but not the corrected CSV
    #[arg(long)]
    pub dry_run: bool,

    /// Bundle the outputs into one ZIP file
    #[arg(long)]
    pub compress: bool,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// Fill a placeholder postal code when only the province is known
    #[arg(long)]
    pub allow_example_postal_code: bool,

    /// Report, but do not replace, a stored province that contradicts the postal code
    #[arg(long)]
    pub keep_conflicting_province: bool,

    #[command(flatten)]
    pub columns: ColumnMapping,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU/memory usage per phase")]
    pub monitor: bool,

    #[arg(long, value_enum, default_value = "text", help = "Log output format")]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn delimiter(&self) -> u8 {
        validate_delimiter("delimiter", &self.delimiter).unwrap_or(b',')
    }

    fn catalogue_delimiter(&self) -> u8 {
        validate_delimiter("catalogue_delimiter", &self.catalogue_delimiter).unwrap_or(b',')
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn catalogue_source(&self) -> Option<CatalogueSource<'_>> {
        catalogue_source(
            self.catalogue_file.as_deref(),
            self.catalogue_endpoint.as_deref(),
        )
    }

    fn policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            overwrite_conflicting_province: !self.keep_conflicting_province,
            allow_example_postal_code: self.allow_example_postal_code,
        }
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn archive_name(&self) -> Option<&str> {
        self.compress.then_some(self.archive_name.as_str())
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_input("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_delimiter("delimiter", &self.delimiter)?;
        validate_delimiter("catalogue_delimiter", &self.catalogue_delimiter)?;
        validate_catalogue_source(
            self.catalogue_file.as_deref(),
            self.catalogue_endpoint.as_deref(),
        )?;
        if self.compress {
            validate_file_extensions("archive_name", &[self.archive_name.as_str()], &["zip"])?;
        }
        self.columns.validate()
    }
}

impl Validate for ColumnMapping {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("columns.postal_code", &self.postal_code)?;
        validate_non_empty_string("columns.population", &self.population)?;
        validate_non_empty_string("columns.province_id", &self.province_id)?;
        validate_non_empty_string("columns.id", &self.id)?;
        validate_non_empty_string("columns.street", &self.street)
    }
}

pub(crate) fn validate_input(field: &str, input: &str) -> Result<()> {
    validate_path(field, input)?;
    validate_file_extensions(field, &[input], &["csv"])
}

/// File wins over endpoint; validation rejects setting both.
pub(crate) fn catalogue_source<'a>(
    file: Option<&'a str>,
    endpoint: Option<&'a str>,
) -> Option<CatalogueSource<'a>> {
    match (file, endpoint) {
        (Some(file), _) => Some(CatalogueSource::File(file)),
        (None, Some(endpoint)) => Some(CatalogueSource::Endpoint(endpoint)),
        (None, None) => None,
    }
}
