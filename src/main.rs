//! loadgen - paced load-generation tool

use anyhow::Result;
use clap::Parser;

use loadgen_core::{CallResult, OrchestratorBuilder};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    let registry = loadgen_drivers::builtin_registry();
    let driver = registry.create(&cli.driver, &cli.driver_config())?;

    let orchestrator = OrchestratorBuilder::new()
        .config(cli.load_config())
        .driver(driver)
        .build()?;

    let mut print_result = |result: CallResult| {
        println!(
            "call_id:{} status:{} elapsed:{} ns",
            result.request_id,
            result.status,
            result.elapsed.as_nanos()
        );
    };

    let summary = orchestrator.run_with_signal_handling(&mut print_result).await?;

    println!("total calls:{}", summary.total_calls);

    Ok(())
}
