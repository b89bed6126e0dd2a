//! Bungie.net wire types.
//!
//! Only the fields this tool reads are declared; serde ignores the rest,
//! which keeps decoding resilient to additions on the API side.
//!
//! API docs: https://bungie-net.github.io/multi/

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Bungie's platform success code.
pub const ERROR_CODE_SUCCESS: i32 = 1;

/// The envelope every platform endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BungieEnvelope<T> {
    pub response: Option<T>,
    pub error_code: i32,
    #[serde(default)]
    pub throttle_seconds: u64,
    #[serde(default)]
    pub error_status: String,
    #[serde(default)]
    pub message: String,
}

/// A stat in `{ "basic": { "value": .., "displayValue": .. } }` form.
#[derive(Debug, Clone, Deserialize)]
pub struct StatValue {
    pub basic: BasicValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicValue {
    pub value: f64,
    #[serde(default)]
    pub display_value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub membership_id: String,
    pub membership_type: i32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub icon_path: Option<String>,
}

// ─── Activity History ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    #[serde(default)]
    pub reference_id: i64,
    #[serde(default)]
    pub director_activity_hash: i64,
    pub instance_id: String,
    #[serde(default)]
    pub mode: i32,
    #[serde(default)]
    pub modes: Vec<i32>,
    #[serde(default)]
    pub is_private: bool,
}

/// `GET /Destiny2/{mt}/Account/{member}/Character/{char}/Stats/Activities/`
#[derive(Debug, Default, Deserialize)]
pub struct ActivityHistory {
    /// Absent (not empty) once the page is past the end of history.
    #[serde(default)]
    pub activities: Vec<HistoricalActivity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalActivity {
    pub period: DateTime<Utc>,
    pub activity_details: ActivityDetails,
}

// ─── Post Game Carnage Report ────────────────────────────────────────────────

/// `GET /Destiny2/Stats/PostGameCarnageReport/{instance}/`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGameCarnageReport {
    pub period: DateTime<Utc>,
    pub activity_details: ActivityDetails,
    #[serde(default)]
    pub entries: Vec<PgcrEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PgcrEntry {
    #[serde(default)]
    pub standing: i32,
    pub score: Option<StatValue>,
    pub player: PgcrPlayer,
    #[serde(default)]
    pub character_id: String,
    #[serde(default)]
    pub values: HashMap<String, StatValue>,
    pub extended: Option<PgcrExtended>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PgcrPlayer {
    pub destiny_user_info: UserInfo,
    pub character_class: Option<String>,
    #[serde(default)]
    pub class_hash: i64,
    #[serde(default)]
    pub light_level: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PgcrExtended {
    #[serde(default)]
    pub weapons: Vec<PgcrWeapon>,
    #[serde(default)]
    pub values: HashMap<String, StatValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PgcrWeapon {
    pub reference_id: i64,
    #[serde(default)]
    pub values: HashMap<String, StatValue>,
}

// ─── Clan ────────────────────────────────────────────────────────────────────

/// `GET /GroupV2/{clan}/Members/`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembers {
    #[serde(default)]
    pub results: Vec<GroupMember>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub destiny_user_info: UserInfo,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /Destiny2/{mt}/Profile/{member}/?components=200`
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub characters: Option<ProfileCharacters>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileCharacters {
    /// Keyed by character id.
    #[serde(default)]
    pub data: HashMap<String, ProfileCharacter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCharacter {
    pub membership_id: String,
    pub character_id: String,
    pub date_last_played: DateTime<Utc>,
    pub race_type: i32,
    pub gender_type: i32,
    pub class_type: i32,
}
