//! Reports over stored activities.
//!
//! - [`social_graph`] - who plays with whom, as a force-graph JSON document
//! - [`play_hours`] - when each member plays, as a 24-hour histogram

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::entity::member::Model as Member;
use crate::repository::{self, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub group: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Activities both members took part in.
    pub value: u64,
}

/// Co-play graph. Serializes to `{"nodes": [...], "links": [...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SocialGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Build the co-play graph for enabled members over activities in `(from, to)`.
///
/// Each unordered pair with at least one shared activity yields one link.
/// With `include_reverse`, both directions are emitted. A member is never
/// linked to themselves.
pub async fn social_graph(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    include_reverse: bool,
) -> Result<SocialGraph> {
    let members = repository::member::list_enabled(db).await?;
    let activities = repository::activity::find_in_period(db, from, to).await?;

    let index: HashMap<&str, usize> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.membership_id.as_str(), i))
        .collect();

    let mut shared: BTreeMap<(usize, usize), u64> = BTreeMap::new();
    for activity in &activities {
        let mut present: Vec<usize> = activity
            .participants
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|id| id.as_str().and_then(|id| index.get(id).copied()))
            .collect();
        present.sort_unstable();
        present.dedup();

        for (n, &a) in present.iter().enumerate() {
            for &b in &present[n + 1..] {
                *shared.entry((a, b)).or_default() += 1;
            }
        }
    }

    let nodes = members
        .iter()
        .map(|m| GraphNode {
            id: m.display_name.clone(),
            group: 1,
        })
        .collect();

    let mut links = Vec::new();
    for a in 0..members.len() {
        let start = if include_reverse { 0 } else { a + 1 };
        for b in start..members.len() {
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if let Some(&value) = shared.get(&key) {
                links.push(GraphLink {
                    source: members[a].display_name.clone(),
                    target: members[b].display_name.clone(),
                    value,
                });
            }
        }
    }

    tracing::debug!(
        members = members.len(),
        activities = activities.len(),
        links = links.len(),
        "Built social graph"
    );
    Ok(SocialGraph { nodes, links })
}

/// One member's play-time histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHours {
    pub player: String,
    /// Activities overlapping each local hour of the day.
    pub slots: [u32; 24],
}

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Local hours an activity overlapped, starting from its start hour.
///
/// A zero-length activity overlaps nothing. The span is capped at a full day.
fn overlapped_hours<Z: TimeZone>(start: DateTime<Z>, seconds_played: f64) -> impl Iterator<Item = usize> {
    // NaN and negatives count as zero; anything past a day is one day.
    let minutes = (seconds_played.max(0.0) / 60.0).min(MINUTES_PER_DAY) as u32;
    let span = if minutes == 0 {
        0
    } else {
        ((start.minute() + minutes - 1) / 60 + 1).min(24)
    };
    let first = start.hour();
    (0..span).map(move |k| ((first + k) % 24) as usize)
}

/// Build play-hour histograms for enabled members over activities in
/// `(from, to)`, bucketed by local time in `zone`.
///
/// With a zone like `chrono_tz::Europe::London` each activity is placed by
/// the offset in force on its own date, so daylight saving is honoured.
pub async fn play_hours<Z: TimeZone>(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    zone: &Z,
) -> Result<Vec<PlayerHours>> {
    let members = repository::member::list_enabled(db).await?;
    let activities = repository::activity::find_in_period(db, from, to).await?;

    let mut result = Vec::with_capacity(members.len());
    for member in &members {
        result.push(member_hours(member, &activities, zone)?);
    }
    Ok(result)
}

fn member_hours<Z: TimeZone>(
    member: &Member,
    activities: &[crate::entity::activity::Model],
    zone: &Z,
) -> Result<PlayerHours> {
    let mut slots = [0u32; 24];
    for activity in activities
        .iter()
        .filter(|a| a.has_participant(&member.membership_id))
    {
        let detail = activity.detail()?;
        let Some(entry) = detail.entry_for(&member.membership_id) else {
            continue;
        };
        let start = detail.period.with_timezone(zone);
        for hour in overlapped_hours(start, entry.time_played_seconds()) {
            slots[hour] += 1;
        }
    }
    Ok(PlayerHours {
        player: member.display_name.clone(),
        slots,
    })
}

/// Render histograms as `player\thour\tvalue` rows with a header line.
pub fn play_hours_tsv(hours: &[PlayerHours]) -> String {
    let mut out = String::from("player\thour\tvalue\n");
    for player in hours {
        for (hour, value) in player.slots.iter().enumerate() {
            let _ = writeln!(out, "{}\t{}\t{}", player.player, hour, value);
        }
    }
    out
}
