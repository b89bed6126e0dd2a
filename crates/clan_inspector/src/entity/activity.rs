//! Activity entity - one stored post-game report.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::platform::ActivityDetail;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    /// Activity instance id. Unique: a second insert of the same instance is
    /// rejected by the database and treated as already synced.
    #[sea_orm(primary_key, auto_increment = false)]
    pub instance_id: String,

    // ─── Activity ────────────────────────────────────────────────────────────
    /// When the activity started.
    pub period: DateTimeWithTimeZone,
    pub mode: i32,
    pub director_activity_hash: i64,
    pub reference_id: i64,
    #[sea_orm(default_value = false)]
    pub is_private: bool,

    // ─── Participants ────────────────────────────────────────────────────────
    /// Number of participant entries in the report. Zero marks a report that
    /// needs repair.
    pub entry_count: i32,
    /// Participant membership ids (JSON array), for report queries.
    #[sea_orm(column_type = "Json")]
    pub participants: serde_json::Value,

    // ─── Report ──────────────────────────────────────────────────────────────
    /// The full report as JSON.
    #[sea_orm(column_type = "Json")]
    pub report: serde_json::Value,

    // ─── Tracking ────────────────────────────────────────────────────────────
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored report.
    pub fn detail(&self) -> Result<ActivityDetail, serde_json::Error> {
        serde_json::from_value(self.report.clone())
    }

    /// Whether a member appears in the participant list.
    pub fn has_participant(&self, membership_id: &str) -> bool {
        self.participants
            .as_array()
            .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(membership_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_model(participants: serde_json::Value) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            instance_id: "9001".to_string(),
            period: now,
            mode: 4,
            director_activity_hash: 1,
            reference_id: 2,
            is_private: false,
            entry_count: 0,
            participants,
            report: serde_json::json!({
                "instance_id": "9001",
                "period": "2024-03-01T20:00:00Z",
                "reference_id": 2,
                "director_activity_hash": 1,
                "mode": 4
            }),
            synced_at: now,
        }
    }

    #[test]
    fn test_has_participant() {
        let model = make_model(serde_json::json!(["a", "b"]));
        assert!(model.has_participant("a"));
        assert!(!model.has_participant("c"));
        assert!(!make_model(serde_json::json!({})).has_participant("a"));
    }

    #[test]
    fn test_detail_decodes_stored_report() {
        let detail = make_model(serde_json::json!([])).detail().expect("decode");
        assert_eq!(detail.instance_id, "9001");
        assert!(detail.entries.is_empty());
    }
}
