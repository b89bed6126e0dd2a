use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::character::{ActiveModel, Column, Entity as Character, Model};
use crate::platform::RosterCharacter;

use super::errors::{RepositoryError, Result};

/// List enabled characters ordered by character id.
pub async fn list_enabled(db: &DatabaseConnection) -> Result<Vec<Model>> {
    Character::find()
        .filter(Column::Enabled.eq(true))
        .order_by_asc(Column::CharacterId)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// List every character belonging to a member.
pub async fn list_for_member(db: &DatabaseConnection, membership_id: &str) -> Result<Vec<Model>> {
    Character::find()
        .filter(Column::MembershipId.eq(membership_id))
        .order_by_asc(Column::CharacterId)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Find a character by id.
pub async fn find_by_id(db: &DatabaseConnection, character_id: &str) -> Result<Option<Model>> {
    Character::find_by_id(character_id.to_string())
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

/// Insert or refresh a character from the roster.
///
/// Attributes and `date_last_played` are overwritten and the character is
/// re-enabled. The watermark columns are left alone on update.
pub async fn upsert_from_roster(db: &DatabaseConnection, character: &RosterCharacter) -> Result<()> {
    let model = ActiveModel {
        character_id: Set(character.character_id.clone()),
        membership_id: Set(character.membership_id.clone()),
        race: Set(character.race),
        gender: Set(character.gender),
        class: Set(character.class),
        date_last_played: Set(character.date_last_played.fixed_offset()),
        last_retrieved_activity: Set(None),
        last_retrieved_date: Set(None),
        enabled: Set(true),
        updated_at: Set(Utc::now().fixed_offset()),
    };

    Character::insert(model)
        .on_conflict(
            OnConflict::column(Column::CharacterId)
                .update_columns([
                    Column::MembershipId,
                    Column::Race,
                    Column::Gender,
                    Column::Class,
                    Column::DateLastPlayed,
                    Column::Enabled,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Overwrite a character's watermark.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if the character does not exist.
pub async fn update_watermark(
    db: &DatabaseConnection,
    character_id: &str,
    last_retrieved_activity: Option<String>,
    last_retrieved_date: Option<DateTime<Utc>>,
) -> Result<()> {
    let result = Character::update_many()
        .col_expr(Column::LastRetrievedActivity, Expr::value(last_retrieved_activity))
        .col_expr(
            Column::LastRetrievedDate,
            Expr::value(last_retrieved_date.map(|d| d.fixed_offset())),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::CharacterId.eq(character_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(RepositoryError::character_not_found(character_id));
    }
    Ok(())
}
