use std::sync::Arc;

use clan_inspector::connect_and_migrate;
use clan_inspector::roster::refresh_roster;
use console::style;

use crate::commands::shared::build_source;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Handle `clan-inspector roster`.
pub(crate) async fn handle_roster(
    config: &Config,
    database_url: &str,
    no_rate_limit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.bungie.clan_id.is_none() {
        return Err("No clan configured. Set bungie.clan_id or CLAN_INSPECTOR_BUNGIE__CLAN_ID.".into());
    }

    let source = build_source(config, no_rate_limit || config.sync.no_rate_limit)?;
    let db = connect_and_migrate(database_url).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let result = refresh_roster(&*source, &db, Some(&*callback)).await;
    reporter.finish();
    let summary = result?;

    println!(
        "{} members, {} characters tracked",
        style(summary.members).green(),
        summary.characters
    );
    if !summary.disabled.is_empty() {
        println!(
            "{} no longer in the clan: {}",
            summary.disabled.len(),
            summary.disabled.join(", ")
        );
    }
    for (membership_id, error) in &summary.errors {
        println!("{} {}: {}", style("✗").red(), membership_id, error);
    }

    Ok(())
}
