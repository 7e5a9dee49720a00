use anyhow::Context as _;
use clap::Parser;
use docpress::core::normalize::normalize_tree;
use docpress::domain::model::PayloadNode;
use docpress::domain::ports::ConfigProvider;
use docpress::utils::{logger, monitor::SystemMonitor, validation::Validate};
use docpress::{
    BlockConverter, CliConfig, CommandConverter, ContextTransformer, RequestContext, TomlConfig,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting docpress CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let monitor = SystemMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 有 TOML 配置檔時以它為準,否則用命令列參數
    let result = match &config.config {
        Some(path) => {
            let file_config = TomlConfig::from_file(path)
                .with_context(|| format!("cannot load config file {}", path))?;
            run(&file_config, &config.payload, &monitor).await
        }
        None => run(&config, &config.payload, &monitor).await,
    };

    match result {
        Ok(output_file) => {
            tracing::info!("✅ Transform completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_file);
            println!("✅ Transform completed: {}", output_file);
        }
        Err(e) => {
            tracing::error!("❌ Transform failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// 讀 payload、轉換上下文樹、輸出結果 JSON(富葉以描述性物件呈現)
async fn run<P: ConfigProvider>(
    provider: &P,
    payload_path: &str,
    monitor: &SystemMonitor,
) -> anyhow::Result<String> {
    let converter = CommandConverter::new(provider.converter_command());
    let block = BlockConverter::new(
        converter,
        provider.scratch_dir(),
        Duration::from_secs(provider.timeout_seconds()),
    );
    let transformer = ContextTransformer::new(block, provider.conversion_mode());

    let raw = tokio::fs::read_to_string(payload_path)
        .await
        .with_context(|| format!("cannot read payload {}", payload_path))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    monitor.log_stats("Transform started");

    let context = RequestContext::new();
    let tree = normalize_tree(PayloadNode::from_json(value));
    let tree = transformer.transform(tree, &context).await;

    monitor.log_stats("Transform finished");

    let diagnostics = context.diagnostics();
    if !diagnostics.is_empty() {
        tracing::warn!(
            "🔶 {} leaves degraded to their original values",
            diagnostics.len()
        );
        for diagnostic in &diagnostics {
            tracing::warn!("  {}: {}", diagnostic.path, diagnostic.detail);
        }
    }

    let output_file = std::path::Path::new(provider.output_path())
        .join(format!("context_{}.json", context.request_id));
    if let Some(parent) = output_file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(
        &output_file,
        serde_json::to_string_pretty(&tree.to_json())?,
    )
    .await?;

    monitor.log_final_stats();
    Ok(output_file.display().to_string())
}
