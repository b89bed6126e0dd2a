//! Incremental activity sync for one character.
//!
//! A pass has two phases. Discovery walks the character's history from the
//! newest page backwards, collecting instance ids until it meets the
//! watermark's last stored activity or runs out of history. Retrieval then
//! fetches and stores each collected report in discovery order.
//!
//! Any fetch error, and any store error other than a duplicate, ends the
//! pass. Reports stored before the failure stay stored, and the watermark is
//! not advanced, so the next pass picks up where this one failed.
//!
//! A pass whose discovery is cut short by `page_limit` stores what it found
//! but keeps the old watermark. Moving it would put the unvisited older
//! pages behind the boundary for good.

use thiserror::Error;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::store::{ActivityStore, StoreError};
use super::types::{CharacterSyncReport, SyncOptions, TrackedCharacter};
use super::watermark::SyncWatermark;
use crate::platform::{ActivityDetail, ActivitySource, ActivitySummary, PlatformError};

/// Errors that end a character pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] PlatformError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

/// Activities found by discovery, newest first.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub pending: Vec<ActivitySummary>,
    /// Discovery stopped at `page_limit` rather than at the boundary or the
    /// end of history.
    pub truncated: bool,
}

/// Drives one character pass against an activity source and a store.
pub struct ActivitySyncEngine<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    store: &'a T,
    options: &'a SyncOptions,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a, S, T> ActivitySyncEngine<'a, S, T>
where
    S: ActivitySource + ?Sized,
    T: ActivityStore + ?Sized,
{
    pub fn new(source: &'a S, store: &'a T, options: &'a SyncOptions) -> Self {
        Self {
            source,
            store,
            options,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: Option<&'a ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Collect the activities newer than the watermark, newest first.
    ///
    /// The boundary activity itself is excluded. Hitting `page_limit` ends
    /// discovery and marks the result as truncated.
    pub async fn discover_pending(
        &self,
        character: &TrackedCharacter,
        watermark: &SyncWatermark,
    ) -> Result<Discovery, SyncError> {
        let mut pending = Vec::new();
        let mut page = 0u32;
        let mut boundary_found = false;
        let mut truncated = false;

        loop {
            if let Some(limit) = self.options.page_limit
                && page >= limit
            {
                let message = format!(
                    "character {}: stopped discovery after {} pages, watermark kept",
                    character.character_id, limit
                );
                tracing::warn!(character_id = %character.character_id, page_limit = limit, "Page limit reached");
                emit(self.on_progress, SyncProgress::Warning { message });
                truncated = true;
                break;
            }

            let summaries = self
                .source
                .list_activity_summaries(&character.membership_id, &character.character_id, page)
                .await?;

            if summaries.is_empty() {
                break;
            }
            let count = summaries.len();

            for summary in summaries {
                if watermark.is_boundary(&summary.instance_id) {
                    boundary_found = true;
                    break;
                }
                pending.push(summary);
            }

            emit(
                self.on_progress,
                SyncProgress::FetchedSummaryPage {
                    character_id: character.character_id.clone(),
                    page,
                    count,
                    pending_so_far: pending.len(),
                },
            );

            if boundary_found {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            character_id = %character.character_id,
            pending = pending.len(),
            pages = page + 1,
            boundary_found,
            truncated,
            "Discovery complete"
        );
        emit(
            self.on_progress,
            SyncProgress::DiscoveryComplete {
                character_id: character.character_id.clone(),
                pending: pending.len(),
                boundary_found,
            },
        );

        Ok(Discovery { pending, truncated })
    }

    /// Run a full pass and compute the next watermark.
    ///
    /// The watermark is returned, not saved. A truncated pass returns the
    /// watermark it started from.
    #[tracing::instrument(skip_all, fields(character_id = %character.character_id))]
    pub async fn sync_character(
        &self,
        character: &TrackedCharacter,
        watermark: &SyncWatermark,
    ) -> Result<CharacterSyncReport, SyncError> {
        let Discovery { pending, truncated } = self.discover_pending(character, watermark).await?;

        let mut inserted = 0usize;
        let mut duplicates = 0usize;
        let mut newest: Option<ActivityDetail> = None;

        for summary in &pending {
            let detail = self.source.fetch_activity_detail(&summary.instance_id).await?;

            let duplicate = match self.store.insert_activity_if_absent(&detail).await {
                Ok(()) => false,
                Err(StoreError::DuplicateKey { .. }) => true,
                Err(e) => {
                    tracing::warn!(
                        instance_id = %detail.instance_id,
                        inserted,
                        error = %e,
                        "Aborting pass on store error"
                    );
                    return Err(e.into());
                }
            };

            if duplicate {
                duplicates += 1;
            } else {
                inserted += 1;
            }
            emit(
                self.on_progress,
                SyncProgress::ActivityStored {
                    character_id: character.character_id.clone(),
                    instance_id: detail.instance_id.clone(),
                    duplicate,
                },
            );

            if newest.as_ref().is_none_or(|n| detail.period > n.period) {
                newest = Some(detail);
            }
        }

        let next = if truncated {
            watermark.clone()
        } else {
            watermark.advance(
                newest.as_ref(),
                inserted + duplicates,
                character.date_last_played,
            )
        };

        Ok(CharacterSyncReport {
            pending: pending.len(),
            inserted,
            duplicates,
            watermark: next,
            truncated,
        })
    }
}
