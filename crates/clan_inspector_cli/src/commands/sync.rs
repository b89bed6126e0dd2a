//! `clan-inspector sync`: fetch new activities for every tracked character.

use std::sync::Arc;

use clan_inspector::connect_and_migrate;
use clan_inspector::sync::{
    ActivityStore, CharacterSyncDriver, CharacterSyncOutcome, DbActivityStore, SyncOptions,
    SyncSummary,
};
use console::style;

use crate::commands::shared::build_source;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::is_shutdown_requested;

/// Flags that override the `[sync]` config section.
#[derive(Debug, Default)]
pub(crate) struct SyncArgs {
    pub(crate) age_cutoff_hours: Option<i64>,
    pub(crate) page_limit: Option<u32>,
    pub(crate) no_rate_limit: bool,
}

impl SyncArgs {
    fn options(&self, config: &Config) -> SyncOptions {
        SyncOptions {
            activity_age_cutoff_hours: self
                .age_cutoff_hours
                .unwrap_or(config.sync.activity_age_cutoff_hours),
            page_limit: self.page_limit.or(config.sync.page_limit),
        }
    }
}

#[derive(tabled::Tabled)]
struct ResultRow {
    #[tabled(rename = "Character")]
    character_id: String,
    #[tabled(rename = "Member")]
    membership_id: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "New")]
    inserted: String,
    #[tabled(rename = "Duplicates")]
    duplicates: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn result_rows(summary: &SyncSummary) -> Vec<ResultRow> {
    summary
        .results
        .iter()
        .map(|r| {
            let (result, inserted, duplicates, detail) = match &r.outcome {
                CharacterSyncOutcome::Synced(report) if report.truncated => (
                    "partial",
                    report.inserted.to_string(),
                    report.duplicates.to_string(),
                    "page limit reached, watermark kept".to_string(),
                ),
                CharacterSyncOutcome::Synced(report) => (
                    "synced",
                    report.inserted.to_string(),
                    report.duplicates.to_string(),
                    report
                        .watermark
                        .last_instance_id
                        .clone()
                        .unwrap_or_default(),
                ),
                CharacterSyncOutcome::Skipped {
                    hours_since_last_sync,
                } => (
                    "skipped",
                    "-".to_string(),
                    "-".to_string(),
                    format!("{}h since last sync", hours_since_last_sync),
                ),
                CharacterSyncOutcome::Failed { error } => {
                    ("failed", "-".to_string(), "-".to_string(), error.clone())
                }
            };
            ResultRow {
                character_id: r.character_id.clone(),
                membership_id: r.membership_id.clone(),
                result: result.to_string(),
                inserted,
                duplicates,
                detail,
            }
        })
        .collect()
}

fn print_summary(summary: &SyncSummary) {
    if !summary.results.is_empty() {
        let mut table = tabled::Table::new(result_rows(summary));
        table.with(tabled::settings::Style::rounded());
        println!("{}", table);
    }

    println!(
        "{} synced, {} skipped, {} failed, {} activities retrieved",
        style(summary.synced()).green(),
        summary.skipped(),
        style(summary.failed()).red(),
        summary.activities_retrieved()
    );
    if summary.interrupted() {
        println!(
            "{} Interrupted; {} characters left for the next run.",
            style("!").yellow(),
            summary.remaining
        );
    }
}

/// Handle `clan-inspector sync`.
///
/// Returns an error when any character failed so scripts see a non-zero exit.
pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options(config);
    let source = build_source(config, args.no_rate_limit || config.sync.no_rate_limit)?;
    let store = DbActivityStore::new(connect_and_migrate(database_url).await?);

    let characters = store.list_tracked_characters().await?;
    if characters.is_empty() {
        println!("No tracked characters. Run `clan-inspector roster` first.");
        return Ok(());
    }

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let summary = CharacterSyncDriver::new(&*source, &store, &options)
        .with_progress(Some(&*callback))
        .with_stop_check(&is_shutdown_requested)
        .run(characters)
        .await;
    reporter.finish();

    print_summary(&summary);

    if summary.failed() > 0 {
        return Err(format!("{} character(s) failed to sync", summary.failed()).into());
    }
    Ok(())
}
