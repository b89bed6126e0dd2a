//! Progress reporting for roster, sync and repair runs.
//!
//! Two modes:
//! - Interactive (TTY): indicatif bars, one for the run and one for the
//!   character or batch in flight
//! - Logging (non-TTY): structured `tracing` events

mod interactive;
mod logging;

use std::sync::Arc;

use clan_inspector::sync::{ProgressCallback, SyncProgress};
use console::Term;

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    Interactive(InteractiveReporter),
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a callback the library can call from any task.
    pub fn as_callback(self: &Arc<Self>) -> Arc<ProgressCallback> {
        let reporter = Arc::clone(self);
        Arc::new(Box::new(move |event| {
            reporter.handle(event);
        }))
    }

    /// Finish any bars still running (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_run() -> Vec<SyncProgress> {
        vec![
            SyncProgress::SyncingCharacters { count: 2 },
            SyncProgress::CharacterStarted {
                character_id: "c1".to_string(),
                membership_id: "m1".to_string(),
            },
            SyncProgress::FetchedSummaryPage {
                character_id: "c1".to_string(),
                page: 0,
                count: 3,
                pending_so_far: 3,
            },
            SyncProgress::DiscoveryComplete {
                character_id: "c1".to_string(),
                pending: 3,
                boundary_found: true,
            },
            SyncProgress::ActivityStored {
                character_id: "c1".to_string(),
                instance_id: "A1".to_string(),
                duplicate: false,
            },
            SyncProgress::ActivityStored {
                character_id: "c1".to_string(),
                instance_id: "A2".to_string(),
                duplicate: true,
            },
            SyncProgress::CharacterFailed {
                character_id: "c1".to_string(),
                error: "disk I/O error".to_string(),
            },
            SyncProgress::CharacterSkipped {
                character_id: "c2".to_string(),
                hours_since_last_sync: 0,
            },
            SyncProgress::Warning {
                message: "page limit reached".to_string(),
            },
            SyncProgress::SyncComplete {
                synced: 0,
                skipped: 1,
                failed: 1,
            },
        ]
    }

    fn roster_and_repair_run() -> Vec<SyncProgress> {
        vec![
            SyncProgress::FetchingRoster,
            SyncProgress::RosterFetched { members: 1 },
            SyncProgress::MemberDisabled {
                membership_id: "m9".to_string(),
                characters: 2,
            },
            SyncProgress::MemberRefreshed {
                membership_id: "m1".to_string(),
                display_name: "Ikora".to_string(),
                characters: 3,
            },
            SyncProgress::RosterComplete {
                members: 1,
                characters: 3,
                disabled: 1,
                errors: 0,
            },
            SyncProgress::RepairingActivities { total: 2 },
            SyncProgress::ActivityRepaired {
                instance_id: "A1".to_string(),
                complete: true,
            },
            SyncProgress::RepairError {
                instance_id: "A2".to_string(),
                error: "Not found".to_string(),
            },
            SyncProgress::RepairComplete {
                repaired: 1,
                failed: 1,
            },
        ]
    }

    #[test]
    fn logging_reporter_handles_every_event() {
        let reporter = ProgressReporter::Logging(LoggingReporter::new());
        for event in sync_run().into_iter().chain(roster_and_repair_run()) {
            reporter.handle(event);
        }
        reporter.finish();
    }

    #[test]
    fn interactive_reporter_handles_every_event() {
        let reporter = ProgressReporter::Interactive(InteractiveReporter::hidden());
        for event in sync_run().into_iter().chain(roster_and_repair_run()) {
            reporter.handle(event);
        }
        reporter.finish();
    }

    #[test]
    fn interactive_reporter_tolerates_events_without_a_run() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::ActivityStored {
            character_id: "c1".to_string(),
            instance_id: "A1".to_string(),
            duplicate: false,
        });
        reporter.handle(SyncProgress::Interrupted { remaining: 3 });
        reporter.finish();
    }

    #[test]
    fn callback_forwards_to_reporter() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let callback = reporter.as_callback();
        callback(SyncProgress::SyncingCharacters { count: 0 });
    }
}
