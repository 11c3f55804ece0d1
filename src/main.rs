use anyhow::Context;
use channel_finder::utils::error::{ErrorSeverity, ScanError};
use channel_finder::utils::{logger, validation::Validate};
use channel_finder::core::ConfigProvider;
use channel_finder::config::load_env_file;
use channel_finder::{ChannelFinderPipeline, CliConfig, LocalStorage, ScanEngine};
use clap::Parser;

fn report_failure(e: &ScanError) -> i32 {
    tracing::error!(
        "❌ Channel scan failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting channel-finder");

    let loaded = load_env_file(args.env_file.as_deref())
        .and_then(|_| args.load())
        .and_then(|config| {
            config.validate()?;
            Ok(config)
        });

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            std::process::exit(report_failure(&e).max(1));
        }
    };

    tracing::debug!(
        "Config: input={}, output={}, report={:?}, api={}, variations={}",
        config.input_path(),
        config.output_path(),
        config.report,
        config.api_base_url(),
        !config.no_variations
    );

    let api = config
        .telegram_client()
        .context("failed to build the Telegram client")?;
    let storage = LocalStorage::new(config.base_path.clone());
    let monitor_enabled = config.monitor;
    let pipeline = ChannelFinderPipeline::new(storage, config, api);
    let engine = ScanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Channel scan completed successfully!");
            println!("✅ Channel list saved to: {}", output_path);
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
