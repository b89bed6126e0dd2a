//! Character entity - a tracked character and its sync watermark.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::guardian::{CharacterClass, Gender, Race};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub character_id: String,
    /// Owning member.
    pub membership_id: String,

    // ─── Attributes ──────────────────────────────────────────────────────────
    pub race: Race,
    pub gender: Gender,
    pub class: CharacterClass,
    /// Last time the character was played, as reported by the profile.
    pub date_last_played: DateTimeWithTimeZone,

    // ─── Watermark ───────────────────────────────────────────────────────────
    /// Instance id of the newest activity already stored. `None` until the
    /// first successful sync.
    pub last_retrieved_activity: Option<String>,
    /// Period of that activity, or the last-played date after a sync that
    /// found nothing new.
    pub last_retrieved_date: Option<DateTimeWithTimeZone>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    #[sea_orm(default_value = true)]
    pub enabled: bool,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MembershipId",
        to = "super::member::Column::MembershipId"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn date_last_played_utc(&self) -> DateTime<Utc> {
        self.date_last_played.with_timezone(&Utc)
    }

    pub fn last_retrieved_date_utc(&self) -> Option<DateTime<Utc>> {
        self.last_retrieved_date.map(|d| d.with_timezone(&Utc))
    }
}
