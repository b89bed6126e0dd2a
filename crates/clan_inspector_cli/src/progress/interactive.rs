use std::sync::Mutex;
use std::time::Duration;

use clan_inspector::sync::SyncProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Bars for the run in progress, behind a single lock.
#[derive(Default)]
struct ProgressState {
    /// Overall bar: characters, members or incomplete reports.
    run_bar: Option<ProgressBar>,
    /// Current character: a spinner during discovery, then a bar over the
    /// activities to retrieve.
    character_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn start_run_bar(&self, state: &mut ProgressState, prefix: &str, len: Option<u64>) {
        if let Some(old) = state.run_bar.take()
            && !old.is_finished()
        {
            old.finish();
        }

        let pb = match len {
            Some(len) => {
                let bar = self.multi.add(ProgressBar::new(len));
                bar.set_style(Self::bar_style());
                bar
            }
            None => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(TICK);
                bar
            }
        };
        pb.set_prefix(format!("{:12}", prefix));
        state.run_bar = Some(pb);
    }

    fn println(&self, line: String) {
        self.multi.println(line).ok();
    }

    fn clear_character_bar(state: &mut ProgressState) {
        if let Some(pb) = state.character_bar.take() {
            pb.finish_and_clear();
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            // ─── Activity sync ───────────────────────────────────────────────
            SyncProgress::SyncingCharacters { count } => {
                self.start_run_bar(&mut state, "Characters", Some(count as u64));
            }

            SyncProgress::CharacterStarted { character_id, .. } => {
                Self::clear_character_bar(&mut state);
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(TICK);
                pb.set_prefix(format!("{:12}", short_id(&character_id)));
                pb.set_message("Discovering activities...");
                state.character_bar = Some(pb);
            }

            SyncProgress::FetchedSummaryPage {
                page,
                pending_so_far,
                ..
            } => {
                if let Some(ref pb) = state.character_bar {
                    pb.set_message(format!("Page {} ({} new)", page + 1, pending_so_far));
                }
            }

            SyncProgress::DiscoveryComplete { pending, .. } => {
                if let Some(ref pb) = state.character_bar {
                    pb.disable_steady_tick();
                    pb.set_length(pending as u64);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                    pb.set_message("retrieving");
                }
            }

            SyncProgress::ActivityStored { .. } => {
                if let Some(ref pb) = state.character_bar {
                    pb.inc(1);
                }
            }

            SyncProgress::CharacterSynced {
                inserted,
                duplicates,
                ..
            } => {
                Self::clear_character_bar(&mut state);
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                    pb.set_message(format!("+{} activities ({} dup)", inserted, duplicates));
                }
            }

            SyncProgress::CharacterSkipped { .. } => {
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                }
            }

            SyncProgress::CharacterFailed {
                character_id,
                error,
            } => {
                Self::clear_character_bar(&mut state);
                self.println(format!("✗ {}: {}", character_id, error));
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                }
            }

            SyncProgress::SyncComplete {
                synced,
                skipped,
                failed,
            } => {
                Self::clear_character_bar(&mut state);
                if let Some(ref pb) = state.run_bar {
                    pb.finish_with_message(format!(
                        "✓ {} synced, {} skipped, {} failed",
                        synced, skipped, failed
                    ));
                }
            }

            SyncProgress::Interrupted { remaining } => {
                Self::clear_character_bar(&mut state);
                if let Some(ref pb) = state.run_bar {
                    pb.abandon_with_message(format!("Stopped, {} characters left", remaining));
                }
            }

            // ─── Roster ──────────────────────────────────────────────────────
            SyncProgress::FetchingRoster => {
                self.start_run_bar(&mut state, "Roster", None);
                if let Some(ref pb) = state.run_bar {
                    pb.set_message("Fetching clan members...");
                }
            }

            SyncProgress::RosterFetched { members } => {
                if let Some(ref pb) = state.run_bar {
                    pb.disable_steady_tick();
                    pb.set_length(members as u64);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                }
            }

            SyncProgress::MemberRefreshed {
                display_name,
                characters,
                ..
            } => {
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                    pb.set_message(format!("{} ({} characters)", display_name, characters));
                }
            }

            SyncProgress::MemberDisabled {
                membership_id,
                characters,
            } => {
                self.println(format!(
                    "- {} left the clan ({} characters disabled)",
                    membership_id, characters
                ));
            }

            SyncProgress::MemberError {
                membership_id,
                error,
            } => {
                self.println(format!("✗ {}: {}", membership_id, error));
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                }
            }

            SyncProgress::RosterComplete {
                members,
                characters,
                ..
            } => {
                if let Some(ref pb) = state.run_bar {
                    pb.finish_with_message(format!(
                        "✓ {} members, {} characters",
                        members, characters
                    ));
                }
            }

            // ─── Repair ──────────────────────────────────────────────────────
            SyncProgress::RepairingActivities { total } => {
                self.start_run_bar(&mut state, "Repair", Some(total));
            }

            SyncProgress::ActivityRepaired { instance_id, .. } => {
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                    pb.set_message(instance_id);
                }
            }

            SyncProgress::RepairError { instance_id, error } => {
                self.println(format!("✗ {}: {}", instance_id, error));
                if let Some(ref pb) = state.run_bar {
                    pb.inc(1);
                }
            }

            SyncProgress::RepairComplete { repaired, failed } => {
                if let Some(ref pb) = state.run_bar {
                    pb.finish_with_message(format!("✓ {} repaired, {} failed", repaired, failed));
                }
            }

            SyncProgress::Warning { message } => {
                self.println(format!("⚠ {}", message));
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Self::clear_character_bar(&mut state);
        if let Some(ref pb) = state.run_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS)
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Last eight digits of a character id, enough to tell a member's
/// characters apart in a prefix column.
fn short_id(id: &str) -> &str {
    let start = id.char_indices().rev().nth(7).map_or(0, |(i, _)| i);
    &id[start..]
}
