use clap::Parser;
use langrank_etl::utils::error::ErrorSeverity;
use langrank_etl::utils::{logger, validation::Validate};
use langrank_etl::{CliConfig, EtlEngine, LocalStorage, WorkshopPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting langrank-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = config.to_settings();

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(settings.output_path.clone());
    let pipeline = WorkshopPipeline::new(storage, settings);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!("📁 Output saved to: {}", summary.output_path);
            if summary.is_complete() {
                println!("✅ All datasets normalized");
            } else {
                for failure in &summary.failures {
                    eprintln!("⚠️ {} skipped: {}", failure.section, failure.message);
                }
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

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
