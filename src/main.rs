use clap::Parser;
use server_mode_diff::utils::error::ErrorCategory;
use server_mode_diff::utils::logger;
use server_mode_diff::{CliConfig, HarnessEngine};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.debug && !cli.no_debug);
    tracing::debug!("CLI config: {:?}", cli);

    // 解析並驗證配置
    let settings = match cli.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let engine = HarnessEngine::new(settings);
    if let Err(e) = engine.run().await {
        match e.category() {
            ErrorCategory::Configuration => tracing::error!("{}", e),
            category => tracing::error!("❌ Server mode test aborted ({:?}): {}", category, e),
        }
        std::process::exit(e.exit_code());
    }
}
