//! Sync options and result types.

use chrono::{DateTime, Utc};

use super::watermark::SyncWatermark;
use crate::entity::guardian::CharacterClass;

/// Hours a character must have been played past its last sync to be due.
pub const DEFAULT_ACTIVITY_AGE_CUTOFF_HOURS: i64 = 1;

/// Options for a sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Skip characters played no more than this many hours after their last
    /// sync.
    pub activity_age_cutoff_hours: i64,
    /// Stop discovery after this many summary pages. `None` walks until the
    /// boundary or the end of history. A pass cut short by the limit keeps the
    /// old watermark, so a later pass starts from the same boundary.
    pub page_limit: Option<u32>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            activity_age_cutoff_hours: DEFAULT_ACTIVITY_AGE_CUTOFF_HOURS,
            page_limit: None,
        }
    }
}

/// A character the driver iterates over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCharacter {
    pub character_id: String,
    pub membership_id: String,
    pub class: CharacterClass,
    pub date_last_played: DateTime<Utc>,
}

/// What one engine pass did for a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSyncReport {
    /// New activities found during discovery.
    pub pending: usize,
    /// Reports newly stored.
    pub inserted: usize,
    /// Reports that were already stored.
    pub duplicates: usize,
    /// Watermark to persist.
    pub watermark: SyncWatermark,
    /// Discovery stopped at `page_limit` before reaching the boundary or the
    /// end of history. `watermark` is then the one the pass started from.
    pub truncated: bool,
}

impl CharacterSyncReport {
    /// Activities retrieved, counting duplicates.
    pub fn retrieved(&self) -> usize {
        self.inserted + self.duplicates
    }
}

/// Outcome of one character in a driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterSyncOutcome {
    Synced(CharacterSyncReport),
    Skipped { hours_since_last_sync: i64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSyncResult {
    pub character_id: String,
    pub membership_id: String,
    pub outcome: CharacterSyncOutcome,
}

/// Result of a driver run.
#[derive(Debug, Default)]
pub struct SyncSummary {
    /// One entry per visited character, in visiting order.
    pub results: Vec<CharacterSyncResult>,
    /// Characters not visited because a stop was requested.
    pub remaining: usize,
}

impl SyncSummary {
    pub fn synced(&self) -> usize {
        self.count(|o| matches!(o, CharacterSyncOutcome::Synced(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CharacterSyncOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CharacterSyncOutcome::Failed { .. }))
    }

    pub fn interrupted(&self) -> bool {
        self.remaining > 0
    }

    /// Activities retrieved across all synced characters.
    pub fn activities_retrieved(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                CharacterSyncOutcome::Synced(report) => Some(report.retrieved()),
                _ => None,
            })
            .sum()
    }

    /// `(character_id, error)` for every failed character.
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                CharacterSyncOutcome::Failed { error } => {
                    Some((r.character_id.as_str(), error.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&CharacterSyncOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}
