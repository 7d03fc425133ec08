use crate::config::{
    catalogue_source, validate_input, DEFAULT_ARCHIVE_NAME, DEFAULT_CATALOGUE_DELIMITER,
};
use crate::core::ConfigProvider;
use crate::domain::model::{CatalogueSource, ColumnMapping};
use crate::reconcile::ReconcilePolicy;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_catalogue_source, validate_delimiter, validate_file_extensions, validate_path,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub policy: ReconcilePolicy,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueConfig {
    pub file: Option<String>,
    pub endpoint: Option<String>,
    /// Only read for CSV catalogue files.
    #[serde(default = "default_catalogue_delimiter")]
    pub delimiter: String,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            file: None,
            endpoint: None,
            delimiter: default_catalogue_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default)]
    pub dry_run: bool,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    #[serde(default = "default_archive_name")]
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_catalogue_delimiter() -> String {
    DEFAULT_CATALOGUE_DELIMITER.to_string()
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CRM_EXPORT_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_input("source.input", &self.source.input)?;
        validate_delimiter("source.delimiter", &self.source.delimiter)?;
        validate_delimiter("catalogue.delimiter", &self.catalogue.delimiter)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_catalogue_source(
            self.catalogue.file.as_deref(),
            self.catalogue.endpoint.as_deref(),
        )?;

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validate_file_extensions(
                "load.compression.filename",
                &[compression.filename.as_str()],
                &["zip"],
            )?;
        }

        self.columns.validate()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .map(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn delimiter(&self) -> u8 {
        validate_delimiter("source.delimiter", &self.source.delimiter).unwrap_or(b',')
    }

    fn catalogue_delimiter(&self) -> u8 {
        validate_delimiter("catalogue.delimiter", &self.catalogue.delimiter).unwrap_or(b',')
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn catalogue_source(&self) -> Option<CatalogueSource<'_>> {
        catalogue_source(
            self.catalogue.file.as_deref(),
            self.catalogue.endpoint.as_deref(),
        )
    }

    fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    fn dry_run(&self) -> bool {
        self.load.dry_run
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[job]
name = "clientes"

[source]
input = "clientes.csv"

[load]
output_path = "./output"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.job.name, "clientes");
        assert_eq!(config.delimiter(), b',');
        assert_eq!(config.catalogue_delimiter(), b',');
        assert_eq!(config.columns, ColumnMapping::default());
        assert_eq!(config.policy, ReconcilePolicy::default());
        assert_eq!(config.catalogue_source(), None);
        assert_eq!(config.archive_name(), None);
        assert!(!config.dry_run());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[job]
name = "farmacia-clientes"
description = "Nightly reconciliation of the CRM client export"

[source]
input = "exports/clientes.csv"
delimiter = ";"

[catalogue]
endpoint = "https://crm.example.com/api/provincias"
delimiter = ";"

[columns]
postal_code = "CP"
population = "Localidad"

[policy]
overwrite_conflicting_province = false

[load]
output_path = "./out"
dry_run = true

[load.compression]
enabled = true

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.catalogue_delimiter(), b';');
        assert_eq!(config.columns().postal_code, "CP");
        assert_eq!(config.columns().province_id, "Id_Provincia");
        assert!(!config.policy().overwrite_conflicting_province);
        assert!(!config.policy().allow_example_postal_code);
        assert_eq!(
            config.catalogue_source(),
            Some(CatalogueSource::Endpoint("https://crm.example.com/api/provincias"))
        );
        assert_eq!(config.archive_name(), Some(DEFAULT_ARCHIVE_NAME));
        assert!(config.dry_run());
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ADDRESS_ETL_TEST_EXPORT_DIR", "/srv/crm");

        let toml_content = r#"
[job]
name = "env"

[source]
input = "${ADDRESS_ETL_TEST_EXPORT_DIR}/clientes.csv"

[load]
output_path = "${ADDRESS_ETL_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.input, "/srv/crm/clientes.csv");
        assert_eq!(config.load.output_path, "${ADDRESS_ETL_TEST_UNSET_VAR}");

        std::env::remove_var("ADDRESS_ETL_TEST_EXPORT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let both_sources = r#"
[job]
name = "bad"

[source]
input = "clientes.csv"

[catalogue]
file = "provincias.json"
endpoint = "https://crm.example.com/provincias"

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(both_sources).unwrap();
        assert!(config.validate().is_err());

        let bad_format = MINIMAL.replace(
            "[load]",
            "[monitoring]\nenabled = false\nlog_format = \"xml\"\n\n[load]",
        );
        let err = TomlConfig::from_toml_str(&bad_format).unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { ref field, .. } if field == "toml_parsing"));

        let bad_input = MINIMAL.replace("clientes.csv", "clientes.xlsx");
        let config = TomlConfig::from_toml_str(&bad_input).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = TomlConfig::from_toml_str("[job]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "clientes");
    }
}
