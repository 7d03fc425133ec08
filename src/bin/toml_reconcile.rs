use address_etl::core::ConfigProvider;
use address_etl::domain::model::CatalogueSource;
use address_etl::utils::{logger, validation::Validate};
use address_etl::{EtlEngine, LocalStorage, ReconcilePipeline, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-reconcile")]
#[command(about = "Address reconciliation driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "reconcile.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Write reports only, regardless of the config file
    #[arg(long)]
    dry_run: bool,

    /// Print the job plan and exit without reading any data
    #[arg(long)]
    plan: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(config.log_format(), args.verbose);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if args.dry_run {
        config.load.dry_run = true;
        tracing::info!("🔧 Dry run enabled from the command line");
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    if args.plan {
        println!("✅ Plan only. Run without --plan to process the export.");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let job_name = config.job.name.clone();
    let storage = LocalStorage::default();
    let pipeline = ReconcilePipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!(job = %job_name, "✅ Reconciliation completed successfully!");
            println!("✅ Reconciliation completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                job = %job_name,
                "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!("  Delimiter: {:?}", config.delimiter() as char);

    match config.catalogue_source() {
        Some(CatalogueSource::File(path)) => println!("  Catalogue: file {}", path),
        Some(CatalogueSource::Endpoint(url)) => println!("  Catalogue: endpoint {}", url),
        None => println!("  Catalogue: built-in Spanish provinces"),
    }

    let columns = config.columns();
    println!(
        "  Columns: id={}, postal_code={}, population={}, province_id={}, street={}",
        columns.id, columns.postal_code, columns.population, columns.province_id, columns.street
    );

    let policy = config.policy();
    println!(
        "  Policy: overwrite_conflicting_province={}, allow_example_postal_code={}",
        policy.overwrite_conflicting_province, policy.allow_example_postal_code
    );

    println!("  Output: {}", config.output_path());
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }
    if config.dry_run() {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
