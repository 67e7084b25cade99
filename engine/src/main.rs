// IntelliCode tool server
// Main entry point for the intellicode binary

use clap::Parser;
use intellicode_engine::cli::{Cli, Command};
use intellicode_engine::config::Config;
use intellicode_engine::handlers::{
    handle_call, handle_init, handle_serve, handle_summarize, handle_tools, handle_workflow,
    OutputFormat,
};
use intellicode_engine::telemetry::init_telemetry_with_level;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(level);

    tracing::info!(
        "IntelliCode v{} (workspace {})",
        env!("CARGO_PKG_VERSION"),
        config.core.workspace.display()
    );

    let config = Arc::new(config);

    // Handle commands
    match cli.command {
        Command::Serve {
            no_schedule,
            no_watch,
        } => {
            tracing::info!("Starting tool server...");
            handle_serve(config, no_schedule, no_watch).await
        }

        Command::Workflow {
            workflow_type,
            files,
            priority,
            web_search,
            rate,
        } => {
            tracing::info!("Running workflow {:?}", workflow_type);
            handle_workflow(
                config,
                workflow_type.into(),
                files,
                priority.map(Into::into),
                web_search,
                rate,
                format,
            )
            .await
        }

        Command::Call { tool, arguments } => {
            tracing::info!("Calling tool {}", tool);
            handle_call(config, &tool, &arguments, format).await
        }

        Command::Tools => handle_tools(config, format).await,

        Command::Init => {
            tracing::info!("Initializing memory bank...");
            handle_init(config, format).await
        }

        Command::Summarize {
            file,
            summary_type,
            output,
            rate,
        } => {
            tracing::info!("Summarizing {}", file.display());
            handle_summarize(config, &file, summary_type.into(), output, rate, format).await
        }
    }
}
