use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::guardian::{CharacterClass, Gender, Race};

use super::errors::Result;

/// One row of a character's activity history, as listed page by page.
///
/// Summaries are only used to discover instance ids and are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub instance_id: String,
    /// When the activity started.
    pub period: DateTime<Utc>,
    pub mode: i32,
    pub director_activity_hash: i64,
}

/// Full post-game report for one activity instance.
///
/// Once fetched the report never changes, so it is stored as-is keyed by
/// `instance_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub instance_id: String,
    pub period: DateTime<Utc>,
    pub reference_id: i64,
    pub director_activity_hash: i64,
    pub mode: i32,
    #[serde(default)]
    pub modes: Vec<i32>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub entries: Vec<ActivityEntry>,
}

/// One participant in an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub standing: i32,
    pub score: f64,

    // ─── Player ──────────────────────────────────────────────────────────────
    pub membership_id: String,
    pub membership_type: i32,
    pub display_name: String,
    pub character_id: String,
    pub character_class: Option<String>,
    pub class_hash: i64,
    pub light_level: i32,

    // ─── Stats ───────────────────────────────────────────────────────────────
    /// Basic stat values keyed by stat id (`kills`, `timePlayedSeconds`, ...).
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
    #[serde(default)]
    pub extended_values: BTreeMap<String, f64>,
    #[serde(default)]
    pub weapons: Vec<WeaponStats>,
}

/// Per-weapon stats from an entry's extended block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub reference_id: i64,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl ActivityDetail {
    /// Membership ids of everyone who took part.
    pub fn participant_ids(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|e| e.membership_id.clone())
            .collect()
    }

    /// The first entry for a member, if they took part.
    pub fn entry_for(&self, membership_id: &str) -> Option<&ActivityEntry> {
        self.entries
            .iter()
            .find(|e| e.membership_id == membership_id)
    }

    /// A report is complete when it lists participants and each of them
    /// carries a character id. Older API responses sometimes omitted both.
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| !e.character_id.is_empty())
    }
}

impl ActivityEntry {
    /// Look up a basic stat value.
    pub fn value(&self, stat: &str) -> Option<f64> {
        self.values.get(stat).copied()
    }

    /// Seconds this participant spent in the activity.
    pub fn time_played_seconds(&self) -> f64 {
        self.value("timePlayedSeconds").unwrap_or_default()
    }
}

/// A member of the clan as listed by the group endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanMember {
    pub membership_id: String,
    pub membership_type: i32,
    pub display_name: String,
    pub icon_path: Option<String>,
}

/// A character as listed on a member's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterCharacter {
    pub character_id: String,
    pub membership_id: String,
    pub race: Race,
    pub gender: Gender,
    pub class: CharacterClass,
    pub date_last_played: DateTime<Utc>,
}

/// Read access to a character's activity history.
///
/// Both methods are single round trips; pagination and retry policy belong to
/// the caller.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// List one page of activity summaries, most recent first.
    ///
    /// An empty page means the end of the character's history.
    async fn list_activity_summaries(
        &self,
        membership_id: &str,
        character_id: &str,
        page: u32,
    ) -> Result<Vec<ActivitySummary>>;

    /// Fetch the full report for one activity instance.
    async fn fetch_activity_detail(&self, instance_id: &str) -> Result<ActivityDetail>;
}

/// Read access to the clan roster.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// List the current members of the configured clan.
    async fn list_clan_members(&self) -> Result<Vec<ClanMember>>;

    /// List the characters on a member's profile.
    async fn list_member_characters(&self, member: &ClanMember) -> Result<Vec<RosterCharacter>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(membership_id: &str, character_id: &str, seconds: f64) -> ActivityEntry {
        ActivityEntry {
            standing: 0,
            score: 0.0,
            membership_id: membership_id.to_string(),
            membership_type: 3,
            display_name: format!("player-{membership_id}"),
            character_id: character_id.to_string(),
            character_class: Some("Hunter".to_string()),
            class_hash: 671679327,
            light_level: 1810,
            values: BTreeMap::from([("timePlayedSeconds".to_string(), seconds)]),
            extended_values: BTreeMap::new(),
            weapons: Vec::new(),
        }
    }

    fn detail(entries: Vec<ActivityEntry>) -> ActivityDetail {
        ActivityDetail {
            instance_id: "100".to_string(),
            period: Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap(),
            reference_id: 1,
            director_activity_hash: 2,
            mode: 4,
            modes: vec![4, 7],
            is_private: false,
            entries,
        }
    }

    #[test]
    fn test_participant_ids_are_deduplicated() {
        let d = detail(vec![entry("a", "1", 60.0), entry("b", "2", 60.0), entry("a", "3", 10.0)]);
        let ids: Vec<_> = d.participant_ids().into_iter().collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_entry_for_returns_first_match() {
        let d = detail(vec![entry("a", "1", 60.0), entry("a", "3", 10.0)]);
        let e = d.entry_for("a").expect("entry");
        assert_eq!(e.character_id, "1");
        assert!(d.entry_for("zzz").is_none());
    }

    #[test]
    fn test_is_complete() {
        assert!(detail(vec![entry("a", "1", 60.0)]).is_complete());
        assert!(!detail(vec![]).is_complete());
        assert!(!detail(vec![entry("a", "", 60.0)]).is_complete());
    }

    #[test]
    fn test_time_played_defaults_to_zero() {
        let mut e = entry("a", "1", 95.0);
        assert_eq!(e.time_played_seconds(), 95.0);
        e.values.clear();
        assert_eq!(e.time_played_seconds(), 0.0);
    }

    #[test]
    fn test_detail_json_roundtrip_tolerates_missing_optional_fields() {
        let json = serde_json::json!({
            "instance_id": "42",
            "period": "2024-03-01T20:00:00Z",
            "reference_id": 1,
            "director_activity_hash": 2,
            "mode": 5
        });
        let d: ActivityDetail = serde_json::from_value(json).expect("decode");
        assert!(d.entries.is_empty());
        assert!(d.modes.is_empty());
        assert!(!d.is_private);
    }
}
