use crate::config::toml_config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 沒有 RUST_LOG 時的預設過濾規則；`verbose` 會把本服務的等級提高到 debug
pub fn default_directives(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        config.level.trim()
    };
    format!(
        "eyecare_scout={},actix_web={},warn",
        level,
        config.http_level.trim()
    )
}

pub fn init_logger(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config, verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        // 部署環境輸出 JSON，方便集中收集
        registry
            .with(fmt::layer().with_target(true).json())
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}
