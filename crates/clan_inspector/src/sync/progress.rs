//! Progress reporting types for sync, roster and repair runs.
//!
//! Library code never prints. It emits [`SyncProgress`] events through an
//! optional callback and the caller decides how to render them.

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    // ─── Activity sync ───────────────────────────────────────────────────────
    /// Starting a pass over the tracked characters.
    SyncingCharacters {
        /// Number of characters in the pass.
        count: usize,
    },

    /// Starting a character.
    CharacterStarted {
        character_id: String,
        membership_id: String,
    },

    /// Character played too recently (or not at all) since its last sync.
    CharacterSkipped {
        character_id: String,
        /// Hours between the last sync and the last time it was played.
        hours_since_last_sync: i64,
    },

    /// Fetched a page of activity summaries.
    FetchedSummaryPage {
        character_id: String,
        /// Page number (0-indexed).
        page: u32,
        /// Number of summaries on this page.
        count: usize,
        /// Running total of new activities found so far.
        pending_so_far: usize,
    },

    /// Discovery finished.
    DiscoveryComplete {
        character_id: String,
        /// Number of new activities to retrieve.
        pending: usize,
        /// True if the last synced activity was seen, false if history ran out.
        boundary_found: bool,
    },

    /// An activity report was stored or found to be stored already.
    ActivityStored {
        character_id: String,
        instance_id: String,
        /// True if the report was already in the store.
        duplicate: bool,
    },

    /// A character pass finished. Its watermark was saved unless the pass
    /// stopped at the page limit.
    CharacterSynced {
        character_id: String,
        inserted: usize,
        duplicates: usize,
    },

    /// A character pass failed.
    CharacterFailed { character_id: String, error: String },

    /// All characters processed (or the run was stopped).
    SyncComplete {
        synced: usize,
        skipped: usize,
        failed: usize,
    },

    /// Stop requested; the remaining characters are left for the next run.
    Interrupted {
        /// Characters not visited.
        remaining: usize,
    },

    // ─── Roster ──────────────────────────────────────────────────────────────
    /// Fetching the clan member list.
    FetchingRoster,

    /// Fetched the clan member list.
    RosterFetched {
        /// Members currently in the clan.
        members: usize,
    },

    /// A member and their characters were refreshed.
    MemberRefreshed {
        membership_id: String,
        display_name: String,
        characters: usize,
    },

    /// A member who left the clan was disabled.
    MemberDisabled {
        membership_id: String,
        /// Characters disabled with them.
        characters: u64,
    },

    /// Could not refresh one member's characters.
    MemberError { membership_id: String, error: String },

    /// Roster refresh complete.
    RosterComplete {
        members: usize,
        characters: usize,
        disabled: usize,
        errors: usize,
    },

    // ─── Repair ──────────────────────────────────────────────────────────────
    /// Starting a repair pass.
    RepairingActivities {
        /// Incomplete activities found.
        total: u64,
    },

    /// An incomplete activity was re-fetched and replaced.
    ActivityRepaired {
        instance_id: String,
        /// True if the fresh report is complete.
        complete: bool,
    },

    /// Could not repair an activity.
    RepairError { instance_id: String, error: String },

    /// Repair pass complete.
    RepairComplete { repaired: usize, failed: usize },

    // ─── General ─────────────────────────────────────────────────────────────
    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },
}

/// Callback for progress updates.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use clan_inspector::sync::{emit, SyncProgress, ProgressCallback};
///
/// fn my_pass(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, SyncProgress::SyncingCharacters { count: 3 });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), SyncProgress::SyncingCharacters { count: 2 });
        emit(
            Some(&callback),
            SyncProgress::CharacterSynced {
                character_id: "c1".to_string(),
                inserted: 3,
                duplicates: 0,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(None, SyncProgress::FetchingRoster);
    }

    #[test]
    fn test_sync_progress_debug() {
        let event = SyncProgress::CharacterFailed {
            character_id: "2305843009200000001".to_string(),
            error: "API error 1653".to_string(),
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("CharacterFailed"));
        assert!(debug_str.contains("2305843009200000001"));
        assert!(debug_str.contains("1653"));
    }
}
