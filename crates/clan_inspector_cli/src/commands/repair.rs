use std::sync::Arc;

use clan_inspector::connect_and_migrate;
use clan_inspector::repair::repair_incomplete;
use console::style;

use crate::commands::shared::build_source;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Handle `clan-inspector repair`.
pub(crate) async fn handle_repair(
    batch_size: u64,
    no_rate_limit: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = build_source(config, no_rate_limit || config.sync.no_rate_limit)?;
    let db = connect_and_migrate(database_url).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let result = repair_incomplete(&*source, &db, batch_size, Some(&*callback)).await;
    reporter.finish();
    let summary = result?;

    if summary.found == 0 {
        println!("No incomplete activities found.");
        return Ok(());
    }

    println!(
        "{} of {} repaired, {} still incomplete, {} failed",
        style(summary.repaired).green(),
        summary.found,
        summary.still_incomplete,
        style(summary.errors.len()).red()
    );
    for (instance_id, error) in &summary.errors {
        println!("  {} {}: {}", style("✗").red(), instance_id, error);
    }

    Ok(())
}
