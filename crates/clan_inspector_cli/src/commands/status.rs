use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clan_inspector::connect_and_migrate;
use clan_inspector::repository;
use clan_inspector::sync::SyncWatermark;
use clan_inspector::{CharacterModel, MemberModel};

use crate::commands::shared::{OutputFormat, format_time};
use crate::config::Config;

/// One tracked character and where its sync stands.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct CharacterStatus {
    #[tabled(rename = "Member")]
    pub member: String,
    #[tabled(rename = "Character")]
    pub character_id: String,
    #[tabled(rename = "Class")]
    pub class: String,
    #[tabled(rename = "Last Played")]
    pub last_played: String,
    #[tabled(rename = "Last Activity")]
    pub last_activity: String,
    #[tabled(rename = "Synced Through")]
    pub synced_through: String,
    #[tabled(rename = "Due")]
    pub due: bool,
}

fn character_rows(
    members: &[MemberModel],
    characters: &[CharacterModel],
    cutoff_hours: i64,
) -> Vec<CharacterStatus> {
    let names: HashMap<&str, &str> = members
        .iter()
        .map(|m| (m.membership_id.as_str(), m.display_name.as_str()))
        .collect();

    let mut rows: Vec<CharacterStatus> = characters
        .iter()
        .map(|c| {
            let last_played: DateTime<Utc> = c.date_last_played_utc();
            let watermark = SyncWatermark {
                last_instance_id: c.last_retrieved_activity.clone(),
                last_retrieved_date: c.last_retrieved_date_utc(),
            };
            CharacterStatus {
                member: names
                    .get(c.membership_id.as_str())
                    .map_or_else(|| c.membership_id.clone(), |n| (*n).to_string()),
                character_id: c.character_id.clone(),
                class: format!("{:?}", c.class),
                last_played: format_time(Some(last_played)),
                last_activity: watermark
                    .last_instance_id
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                synced_through: format_time(watermark.last_retrieved_date),
                due: watermark.is_due(last_played, cutoff_hours),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.member
            .to_lowercase()
            .cmp(&b.member.to_lowercase())
            .then_with(|| a.character_id.cmp(&b.character_id))
    });
    rows
}

/// Handle `clan-inspector status`.
pub(crate) async fn handle_status(
    age_cutoff_hours: Option<i64>,
    output: OutputFormat,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_and_migrate(database_url).await?;
    let members = repository::member::list_enabled(&db).await?;
    let characters = repository::character::list_enabled(&db).await?;
    let cutoff = age_cutoff_hours.unwrap_or(config.sync.activity_age_cutoff_hours);

    let rows = character_rows(&members, &characters, cutoff);

    match output {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No tracked characters. Run `clan-inspector roster` first.");
                return Ok(());
            }
            let due = rows.iter().filter(|r| r.due).count();
            let mut table = tabled::Table::new(&rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
            println!("{} of {} characters due for sync", due, rows.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
