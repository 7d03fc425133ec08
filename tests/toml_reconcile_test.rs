use address_etl::core::ConfigProvider;
use address_etl::utils::validation::Validate;
use address_etl::{EtlEngine, LocalStorage, ReconcilePipeline, TomlConfig};
use anyhow::Result;
use std::io::Read;
use tempfile::TempDir;

/// 測試 TOML 設定驅動的完整流程：CSV 目錄檔 + 自訂壓縮檔名
#[tokio::test]
async fn test_toml_job_with_catalogue_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().replace('\\', "/");

    std::fs::write(
        temp_dir.path().join("clientes.csv"),
        "Id\tCP\tLocalidad\tId_Provincia\n1\t4700-001\tBraga\t\n2\t\tMurcia\t3\n",
    )?;
    std::fs::write(
        temp_dir.path().join("provincias.csv"),
        "id,code,name,country\n30,ES30,Murcia,ES\n203,PT03,Braga,PT\n213,PT13,Porto,PT\n",
    )?;

    std::env::set_var("ADDRESS_ETL_TEST_BASE", &base);
    let config_content = r#"
[job]
name = "toml-e2e"

[source]
input = "${ADDRESS_ETL_TEST_BASE}/clientes.csv"
delimiter = "\\t"

[catalogue]
file = "${ADDRESS_ETL_TEST_BASE}/provincias.csv"

[columns]
postal_code = "CP"
population = "Localidad"

[policy]
overwrite_conflicting_province = false

[load]
output_path = "${ADDRESS_ETL_TEST_BASE}/out"

[load.compression]
enabled = true
filename = "clientes_2026.zip"
"#;
    let config_path = temp_dir.path().join("reconcile.toml");
    std::fs::write(&config_path, config_content)?;

    let config = TomlConfig::from_file(&config_path)?;
    std::env::remove_var("ADDRESS_ETL_TEST_BASE");
    config.validate()?;
    assert_eq!(config.delimiter(), b'\t');

    let pipeline = ReconcilePipeline::new(LocalStorage::default(), config);
    let output = EtlEngine::new(pipeline).run().await?;
    assert!(output.ends_with("clientes_2026.zip"));

    let zip_path = temp_dir.path().join("out").join("clientes_2026.zip");
    let mut archive = zip::ZipArchive::new(std::fs::File::open(zip_path)?)?;

    let mut csv = String::new();
    archive
        .by_name("clients_reconciled.csv")?
        .read_to_string(&mut csv)?;
    let lines: Vec<&str> = csv.lines().collect();
    // Braga's narrow range beats the Porto range
    assert_eq!(lines[1], "1\t4700-001\tBraga\t203");
    // City default fills the postal code; the stored province is kept
    assert_eq!(lines[2], "2\t30001\tMurcia\t3");

    let mut discrepancies = String::new();
    archive
        .by_name("discrepancies.json")?
        .read_to_string(&mut discrepancies)?;
    let discrepancies: serde_json::Value = serde_json::from_str(&discrepancies)?;
    let mismatch = &discrepancies[0];
    assert_eq!(mismatch["kind"], "province_mismatch");
    assert_eq!(mismatch["stored"], "3");
    assert_eq!(mismatch["derived"], "30");

    Ok(())
}
