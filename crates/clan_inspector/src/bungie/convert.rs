//! Conversion from Bungie wire types to platform types.

use std::collections::{BTreeMap, HashMap};

use super::types::{
    GroupMember, HistoricalActivity, PgcrEntry, PostGameCarnageReport, ProfileCharacter, StatValue,
};
use crate::entity::guardian::{CharacterClass, Gender, Race};
use crate::platform::{
    ActivityDetail, ActivityEntry, ActivitySummary, ClanMember, RosterCharacter, WeaponStats,
};

fn flatten(values: &HashMap<String, StatValue>) -> BTreeMap<String, f64> {
    values
        .iter()
        .map(|(k, v)| (k.clone(), v.basic.value))
        .collect()
}

pub fn to_activity_summary(activity: &HistoricalActivity) -> ActivitySummary {
    ActivitySummary {
        instance_id: activity.activity_details.instance_id.clone(),
        period: activity.period,
        mode: activity.activity_details.mode,
        director_activity_hash: activity.activity_details.director_activity_hash,
    }
}

fn to_activity_entry(entry: &PgcrEntry) -> ActivityEntry {
    let user = &entry.player.destiny_user_info;
    let (extended_values, weapons) = match &entry.extended {
        Some(ext) => (
            flatten(&ext.values),
            ext.weapons
                .iter()
                .map(|w| WeaponStats {
                    reference_id: w.reference_id,
                    values: flatten(&w.values),
                })
                .collect(),
        ),
        None => (BTreeMap::new(), Vec::new()),
    };

    ActivityEntry {
        standing: entry.standing,
        score: entry.score.as_ref().map(|s| s.basic.value).unwrap_or_default(),
        membership_id: user.membership_id.clone(),
        membership_type: user.membership_type,
        display_name: user.display_name.clone(),
        character_id: entry.character_id.clone(),
        character_class: entry.player.character_class.clone(),
        class_hash: entry.player.class_hash,
        light_level: entry.player.light_level,
        values: flatten(&entry.values),
        extended_values,
        weapons,
    }
}

pub fn to_activity_detail(report: &PostGameCarnageReport) -> ActivityDetail {
    let details = &report.activity_details;
    ActivityDetail {
        instance_id: details.instance_id.clone(),
        period: report.period,
        reference_id: details.reference_id,
        director_activity_hash: details.director_activity_hash,
        mode: details.mode,
        modes: details.modes.clone(),
        is_private: details.is_private,
        entries: report.entries.iter().map(to_activity_entry).collect(),
    }
}

pub fn to_clan_member(member: &GroupMember) -> ClanMember {
    let user = &member.destiny_user_info;
    ClanMember {
        membership_id: user.membership_id.clone(),
        membership_type: user.membership_type,
        display_name: user.display_name.clone(),
        icon_path: user.icon_path.clone(),
    }
}

pub fn to_roster_character(character: &ProfileCharacter) -> RosterCharacter {
    RosterCharacter {
        character_id: character.character_id.clone(),
        membership_id: character.membership_id.clone(),
        race: Race::from_code(character.race_type),
        gender: Gender::from_code(character.gender_type),
        class: CharacterClass::from_code(character.class_type),
        date_last_played: character.date_last_played,
    }
}
