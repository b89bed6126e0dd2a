//! Re-fetch stored reports that came back without participants.
//!
//! Older API responses sometimes returned a report with no entries, or with
//! entries missing their character ids. Such rows are stored with
//! `entry_count = 0`; a repair pass fetches them again and replaces them.

use sea_orm::DatabaseConnection;

use crate::platform::{ActivitySource, short_error_message};
use crate::repository::{self, RepositoryError};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Rows fetched per query.
pub const DEFAULT_REPAIR_BATCH_SIZE: u64 = 100;

#[derive(Debug, Default)]
pub struct RepairSummary {
    /// Incomplete reports found at the start.
    pub found: u64,
    /// Reports replaced with a complete version.
    pub repaired: usize,
    /// Reports re-fetched but still incomplete.
    pub still_incomplete: usize,
    /// `(instance_id, error)` for reports that could not be re-fetched or
    /// stored.
    pub errors: Vec<(String, String)>,
}

/// Repair every incomplete stored report.
///
/// Failures are recorded per report and never stop the pass. Rows that stay
/// incomplete are stepped over with the query offset, so each row is visited
/// at most once.
#[tracing::instrument(skip(source, db, on_progress))]
pub async fn repair_incomplete<S: ActivitySource + ?Sized>(
    source: &S,
    db: &DatabaseConnection,
    batch_size: u64,
    on_progress: Option<&ProgressCallback>,
) -> Result<RepairSummary, RepositoryError> {
    let batch_size = batch_size.max(1);
    let mut summary = RepairSummary {
        found: repository::activity::count_incomplete(db).await?,
        ..RepairSummary::default()
    };
    emit(
        on_progress,
        SyncProgress::RepairingActivities {
            total: summary.found,
        },
    );

    let mut skip = 0u64;
    loop {
        let batch = repository::activity::find_incomplete(db, skip, batch_size).await?;
        if batch.is_empty() {
            break;
        }

        for row in batch {
            let instance_id = row.instance_id;
            let result = match source.fetch_activity_detail(&instance_id).await {
                Ok(detail) => repository::activity::replace(db, &detail)
                    .await
                    .map(|_| detail.is_complete())
                    .map_err(|e| short_error_message(&e)),
                Err(e) => Err(short_error_message(&e)),
            };

            match result {
                Ok(true) => {
                    summary.repaired += 1;
                    emit(
                        on_progress,
                        SyncProgress::ActivityRepaired {
                            instance_id,
                            complete: true,
                        },
                    );
                }
                Ok(false) => {
                    skip += 1;
                    summary.still_incomplete += 1;
                    emit(
                        on_progress,
                        SyncProgress::ActivityRepaired {
                            instance_id,
                            complete: false,
                        },
                    );
                }
                Err(error) => {
                    skip += 1;
                    tracing::warn!(instance_id = %instance_id, error = %error, "Repair failed");
                    emit(
                        on_progress,
                        SyncProgress::RepairError {
                            instance_id: instance_id.clone(),
                            error: error.clone(),
                        },
                    );
                    summary.errors.push((instance_id, error));
                }
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::RepairComplete {
            repaired: summary.repaired,
            failed: summary.errors.len(),
        },
    );
    Ok(summary)
}
