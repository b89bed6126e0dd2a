//! Sequential sync over every tracked character.

use super::engine::ActivitySyncEngine;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::store::ActivityStore;
use super::types::{
    CharacterSyncOutcome, CharacterSyncResult, SyncOptions, SyncSummary, TrackedCharacter,
};
use crate::platform::{ActivitySource, short_error_message};

/// Checked between characters; returning true stops the run.
pub type StopCheck = dyn Fn() -> bool + Send + Sync;

/// Runs the engine for each due character and persists the watermarks.
///
/// Characters are visited one at a time in character id order. A failure is
/// recorded against its character and the run moves on.
pub struct CharacterSyncDriver<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    store: &'a T,
    options: &'a SyncOptions,
    on_progress: Option<&'a ProgressCallback>,
    should_stop: Option<&'a StopCheck>,
}

impl<'a, S, T> CharacterSyncDriver<'a, S, T>
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
            should_stop: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: Option<&'a ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    #[must_use]
    pub fn with_stop_check(mut self, should_stop: &'a StopCheck) -> Self {
        self.should_stop = Some(should_stop);
        self
    }

    #[tracing::instrument(skip_all, fields(character_count = characters.len()))]
    pub async fn run(&self, mut characters: Vec<TrackedCharacter>) -> SyncSummary {
        characters.sort_by(|a, b| a.character_id.cmp(&b.character_id));

        emit(
            self.on_progress,
            SyncProgress::SyncingCharacters {
                count: characters.len(),
            },
        );

        let mut summary = SyncSummary::default();
        let total = characters.len();

        for (visited, character) in characters.into_iter().enumerate() {
            if self.should_stop.is_some_and(|stop| stop()) {
                summary.remaining = total - visited;
                tracing::info!(remaining = summary.remaining, "Stop requested, ending sync run");
                emit(
                    self.on_progress,
                    SyncProgress::Interrupted {
                        remaining: summary.remaining,
                    },
                );
                break;
            }

            let outcome = self.sync_one(&character).await;
            summary.results.push(CharacterSyncResult {
                character_id: character.character_id,
                membership_id: character.membership_id,
                outcome,
            });
        }

        emit(
            self.on_progress,
            SyncProgress::SyncComplete {
                synced: summary.synced(),
                skipped: summary.skipped(),
                failed: summary.failed(),
            },
        );
        summary
    }

    async fn sync_one(&self, character: &TrackedCharacter) -> CharacterSyncOutcome {
        let id = &character.character_id;

        let watermark = match self.store.load_watermark(id).await {
            Ok(w) => w,
            Err(e) => return self.failed(id, &e),
        };

        if !watermark.is_due(
            character.date_last_played,
            self.options.activity_age_cutoff_hours,
        ) {
            let hours_since_last_sync = watermark
                .hours_since_last_sync(character.date_last_played)
                .unwrap_or_default();
            tracing::debug!(character_id = %id, hours_since_last_sync, "Character not due");
            emit(
                self.on_progress,
                SyncProgress::CharacterSkipped {
                    character_id: id.clone(),
                    hours_since_last_sync,
                },
            );
            return CharacterSyncOutcome::Skipped {
                hours_since_last_sync,
            };
        }

        emit(
            self.on_progress,
            SyncProgress::CharacterStarted {
                character_id: id.clone(),
                membership_id: character.membership_id.clone(),
            },
        );

        let engine = ActivitySyncEngine::new(self.source, self.store, self.options)
            .with_progress(self.on_progress);
        let report = match engine.sync_character(character, &watermark).await {
            Ok(report) => report,
            Err(e) => return self.failed(id, &e),
        };

        if report.truncated {
            tracing::warn!(
                character_id = %id,
                inserted = report.inserted,
                "Page limit reached before the last synced activity, watermark not saved"
            );
        } else if let Err(e) = self.store.save_watermark(id, &report.watermark).await {
            return self.failed(id, &e);
        }

        tracing::info!(
            character_id = %id,
            inserted = report.inserted,
            duplicates = report.duplicates,
            "Character synced"
        );
        emit(
            self.on_progress,
            SyncProgress::CharacterSynced {
                character_id: id.clone(),
                inserted: report.inserted,
                duplicates: report.duplicates,
            },
        );
        CharacterSyncOutcome::Synced(report)
    }

    fn failed(&self, character_id: &str, err: &impl std::error::Error) -> CharacterSyncOutcome {
        let error = short_error_message(err);
        tracing::error!(character_id, error = %error, "Character sync failed");
        emit(
            self.on_progress,
            SyncProgress::CharacterFailed {
                character_id: character_id.to_string(),
                error: error.clone(),
            },
        );
        CharacterSyncOutcome::Failed { error }
    }
}
