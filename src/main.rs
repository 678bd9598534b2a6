use anyhow::Context;
use clap::Parser;
use log::info;

use pummel::config::{load_config, Cli};
use pummel::runner;
use pummel::stats::TestReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_config(&cli).context("Failed to load configuration")?;
    settings.init_logging();

    // Setup failure and interruption both land here and exit non-zero
    // without a report; every completed run prints one.
    let report = runner::run(&settings).await?;
    print_report(&report, settings.json)?;
    Ok(())
}

fn print_report(report: &TestReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        info!("Load test results:");
        info!("Total requests: {}", report.total);
        info!("Successful requests: {}", report.success);
        info!("Failed requests: {}", report.errors);
        info!("Success rate: {:.2}%", report.success_rate);
    }
    Ok(())
}
