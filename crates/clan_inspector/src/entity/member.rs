//! Member entity - one Bungie.net account that is or was in the clan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Destiny membership id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub membership_id: String,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// Platform the membership lives on (1 Xbox, 2 PSN, 3 Steam, ...).
    pub membership_type: i32,
    pub display_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub icon_path: Option<String>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// False once the member has left the clan. Rows are never deleted so
    /// stored activities keep resolving to a name.
    #[sea_orm(default_value = true)]
    pub enabled: bool,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::character::Entity")]
    Character,
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Character.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
