use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entity::character::{Column as CharacterColumn, Entity as Character};
use crate::entity::member::{ActiveModel, Column, Entity as Member, Model};
use crate::platform::ClanMember;

use super::errors::{RepositoryError, Result};

/// List members still in the clan, ordered by membership id.
pub async fn list_enabled(db: &DatabaseConnection) -> Result<Vec<Model>> {
    Member::find()
        .filter(Column::Enabled.eq(true))
        .order_by_asc(Column::MembershipId)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Find a member by membership id.
pub async fn find_by_id(db: &DatabaseConnection, membership_id: &str) -> Result<Option<Model>> {
    Member::find_by_id(membership_id.to_string())
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

fn to_active_model(member: &ClanMember) -> ActiveModel {
    ActiveModel {
        membership_id: Set(member.membership_id.clone()),
        membership_type: Set(member.membership_type),
        display_name: Set(member.display_name.clone()),
        icon_path: Set(member.icon_path.clone()),
        enabled: Set(true),
        updated_at: Set(Utc::now().fixed_offset()),
    }
}

/// Insert a clan member, or refresh and re-enable an existing row.
///
/// Members who left and rejoined keep their row and come back enabled.
pub async fn upsert(db: &DatabaseConnection, member: &ClanMember) -> Result<()> {
    Member::insert(to_active_model(member))
        .on_conflict(
            OnConflict::column(Column::MembershipId)
                .update_columns([
                    Column::MembershipType,
                    Column::DisplayName,
                    Column::IconPath,
                    Column::Enabled,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Disable a member and all of their characters.
///
/// Returns the number of characters disabled.
pub async fn disable(db: &DatabaseConnection, membership_id: &str) -> Result<u64> {
    let now = Utc::now().fixed_offset();
    let txn = db.begin().await?;

    let updated = Member::update_many()
        .col_expr(Column::Enabled, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::MembershipId.eq(membership_id))
        .exec(&txn)
        .await?;
    if updated.rows_affected == 0 {
        txn.rollback().await?;
        return Err(RepositoryError::NotFound {
            context: format!("membership_id={}", membership_id),
        });
    }

    let characters = Character::update_many()
        .col_expr(CharacterColumn::Enabled, Expr::value(false))
        .col_expr(CharacterColumn::UpdatedAt, Expr::value(now))
        .filter(CharacterColumn::MembershipId.eq(membership_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(characters.rows_affected)
}
