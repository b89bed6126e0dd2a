use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::activity::{ActiveModel, Column, Entity as Activity, Model};
use crate::platform::ActivityDetail;

use super::errors::{RepositoryError, Result};

/// Build the row for a report.
pub fn to_active_model(detail: &ActivityDetail, synced_at: DateTime<Utc>) -> Result<ActiveModel> {
    let entry_count = if detail.is_complete() {
        i32::try_from(detail.entries.len()).map_err(|_| RepositoryError::InvalidInput {
            message: format!("too many entries in activity {}", detail.instance_id),
        })?
    } else {
        0
    };

    Ok(ActiveModel {
        instance_id: Set(detail.instance_id.clone()),
        period: Set(detail.period.fixed_offset()),
        mode: Set(detail.mode),
        director_activity_hash: Set(detail.director_activity_hash),
        reference_id: Set(detail.reference_id),
        is_private: Set(detail.is_private),
        entry_count: Set(entry_count),
        participants: Set(serde_json::to_value(detail.participant_ids())?),
        report: Set(serde_json::to_value(detail)?),
        synced_at: Set(synced_at.fixed_offset()),
    })
}

/// Store a report unless one with the same instance id already exists.
///
/// # Errors
/// Returns `RepositoryError::Duplicate` if the instance is already stored,
/// `RepositoryError::Database` for any other failure.
pub async fn insert_if_absent(db: &DatabaseConnection, detail: &ActivityDetail) -> Result<()> {
    let model = to_active_model(detail, Utc::now())?;

    let inserted = Activity::insert(model)
        .on_conflict(
            OnConflict::column(Column::InstanceId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted == 0 {
        return Err(RepositoryError::Duplicate {
            instance_id: detail.instance_id.clone(),
        });
    }
    Ok(())
}

/// Replace a stored report with a freshly fetched one.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if the instance is not stored.
pub async fn replace(db: &DatabaseConnection, detail: &ActivityDetail) -> Result<Model> {
    if find_by_instance_id(db, &detail.instance_id).await?.is_none() {
        return Err(RepositoryError::activity_not_found(&detail.instance_id));
    }

    let model = to_active_model(detail, Utc::now())?;
    model.update(db).await.map_err(RepositoryError::from)
}

/// Find a stored report by instance id.
pub async fn find_by_instance_id(db: &DatabaseConnection, instance_id: &str) -> Result<Option<Model>> {
    Activity::find_by_id(instance_id.to_string())
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

/// Reports with no usable participant list, oldest first.
///
/// `offset` lets a caller step past rows it already failed to repair.
pub async fn find_incomplete(db: &DatabaseConnection, offset: u64, limit: u64) -> Result<Vec<Model>> {
    Activity::find()
        .filter(Column::EntryCount.eq(0))
        .order_by_asc(Column::Period)
        .order_by_asc(Column::InstanceId)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Count reports with no usable participant list.
pub async fn count_incomplete(db: &DatabaseConnection) -> Result<u64> {
    Activity::find()
        .filter(Column::EntryCount.eq(0))
        .count(db)
        .await
        .map_err(RepositoryError::from)
}

/// Reports whose period lies strictly between `from` and `to`.
pub async fn find_in_period(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Model>> {
    Activity::find()
        .filter(Column::Period.gt(from.fixed_offset()))
        .filter(Column::Period.lt(to.fixed_offset()))
        .order_by_asc(Column::Period)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Count all stored reports.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    Activity::find()
        .count(db)
        .await
        .map_err(RepositoryError::from)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::platform::ActivityEntry;

    fn detail(instance_id: &str, day: u32, members: &[&str]) -> ActivityDetail {
        ActivityDetail {
            instance_id: instance_id.to_string(),
            period: Utc.with_ymd_and_hms(2024, 3, day, 20, 0, 0).unwrap(),
            reference_id: 1,
            director_activity_hash: 2,
            mode: 4,
            modes: vec![4],
            is_private: false,
            entries: members
                .iter()
                .enumerate()
                .map(|(i, m)| ActivityEntry {
                    standing: 0,
                    score: 0.0,
                    membership_id: m.to_string(),
                    membership_type: 3,
                    display_name: m.to_string(),
                    character_id: format!("char-{i}"),
                    character_class: None,
                    class_hash: 0,
                    light_level: 0,
                    values: BTreeMap::new(),
                    extended_values: BTreeMap::new(),
                    weapons: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_to_active_model_counts_entries_only_when_complete() {
        let now = Utc::now();
        let complete = to_active_model(&detail("1", 1, &["a", "b"]), now).expect("model");
        assert_eq!(complete.entry_count.unwrap(), 2);
        assert_eq!(
            complete.participants.unwrap(),
            serde_json::json!(["a", "b"])
        );

        let mut broken = detail("2", 1, &["a"]);
        broken.entries[0].character_id.clear();
        let model = to_active_model(&broken, now).expect("model");
        assert_eq!(model.entry_count.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_duplicate_when_nothing_inserted() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                rows_affected: 0,
                last_insert_id: 0,
            }])
            .into_connection();

        let err = insert_if_absent(&db, &detail("77", 1, &["a"]))
            .await
            .expect_err("duplicate");
        match err {
            RepositoryError::Duplicate { instance_id } => assert_eq!(instance_id, "77"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_sql_uses_do_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                rows_affected: 1,
                last_insert_id: 0,
            }])
            .into_connection();

        insert_if_absent(&db, &detail("78", 1, &["a"]))
            .await
            .expect("insert");

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ON CONFLICT"), "unexpected SQL: {sql}");
        assert!(sql.contains("DO NOTHING"), "unexpected SQL: {sql}");
    }
}
