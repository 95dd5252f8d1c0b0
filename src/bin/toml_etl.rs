use clap::Parser;
use langrank_etl::core::ConfigProvider;
use langrank_etl::utils::error::ErrorSeverity;
use langrank_etl::utils::{logger, validation::Validate};
use langrank_etl::{EtlEngine, LocalStorage, TomlConfig, WorkshopPipeline};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Workshop dataset ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "langrank.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the output directory from config
    #[arg(long)]
    output_path: Option<String>,

    /// Dry run - show what would be fetched without executing
    #[arg(long)]
    dry_run: bool,
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

    // 初始化日誌
    let monitoring = config.monitoring();
    let verbose = args.verbose || monitoring.verbose.unwrap_or(false);
    if monitoring.json_logs.unwrap_or(false) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based ETL tool");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(output_path) = args.output_path {
        tracing::info!("🔧 Output path overridden to: {}", output_path);
        config.load.output_path = output_path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched");
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = WorkshopPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!("📁 Output saved to: {}", summary.output_path);
            if !summary.is_complete() {
                for failure in &summary.failures {
                    eprintln!("⚠️ {} skipped: {}", failure.section, failure.message);
                }
                std::process::exit(2);
            }
            println!("✅ All datasets normalized");
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let sources = config.sources();
    let reshape = config.reshape();

    println!("📋 Configuration Summary:");
    println!("  Pipeline: {}", config.name());
    println!("  Snapshot: {}", sources.top_n);
    println!("  History: {}", sources.history);
    println!(
        "  Gapminder: {}",
        sources.gapminder.as_deref().unwrap_or("(skipped)")
    );
    println!(
        "  Prices: {}",
        sources.prices.as_deref().unwrap_or("(skipped)")
    );
    println!("  Rank marker: {}", reshape.rank_column_marker);
    println!("  Excluded: {}", reshape.exclusion_list.join(", "));
    println!("  Output: {}/{}", config.output_path(), config.bundle_name());
    println!();
}
