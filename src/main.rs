use clap::Parser;
use eyecare_scout::utils::error::ErrorSeverity;
use eyecare_scout::utils::{logger, validation::Validate};
use eyecare_scout::{app, CliConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();
    let loaded = cli.load_service_config();

    // 初始化日誌：設定檔載入失敗時用預設等級回報錯誤
    let mut logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    logging.json |= cli.json_logs;
    logger::init_logger(&logging, cli.verbose);

    tracing::info!("Starting eyecare-scout server");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                "❌ Failed to load configuration: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    app::server::run(config).await?;
    Ok(())
}
