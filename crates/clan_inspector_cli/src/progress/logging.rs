use clan_inspector::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::SyncingCharacters { count } => {
                tracing::info!(count, "Syncing characters");
            }

            SyncProgress::CharacterStarted {
                character_id,
                membership_id,
            } => {
                tracing::debug!(character_id = %character_id, membership_id = %membership_id, "Character started");
            }

            SyncProgress::CharacterSkipped {
                character_id,
                hours_since_last_sync,
            } => {
                tracing::debug!(character_id = %character_id, hours_since_last_sync, "Not due, skipped");
            }

            SyncProgress::FetchedSummaryPage {
                character_id,
                page,
                count,
                pending_so_far,
            } => {
                tracing::debug!(character_id = %character_id, page, count, pending_so_far, "Fetched history page");
            }

            SyncProgress::DiscoveryComplete {
                character_id,
                pending,
                boundary_found,
            } => {
                tracing::info!(character_id = %character_id, pending, boundary_found, "Discovery complete");
            }

            SyncProgress::ActivityStored {
                character_id,
                instance_id,
                duplicate,
            } => {
                if duplicate {
                    tracing::debug!(character_id = %character_id, instance_id = %instance_id, "Already stored");
                } else {
                    tracing::debug!(character_id = %character_id, instance_id = %instance_id, "Stored activity");
                }
            }

            SyncProgress::CharacterSynced {
                character_id,
                inserted,
                duplicates,
            } => {
                tracing::info!(character_id = %character_id, inserted, duplicates, "Character synced");
            }

            SyncProgress::CharacterFailed {
                character_id,
                error,
            } => {
                tracing::warn!(character_id = %character_id, error = %error, "Character failed");
            }

            SyncProgress::SyncComplete {
                synced,
                skipped,
                failed,
            } => {
                tracing::info!(synced, skipped, failed, "Sync complete");
            }

            SyncProgress::Interrupted { remaining } => {
                tracing::warn!(remaining, "Sync interrupted");
            }

            SyncProgress::FetchingRoster => {
                tracing::info!("Fetching clan roster");
            }

            SyncProgress::RosterFetched { members } => {
                tracing::info!(members, "Fetched clan roster");
            }

            SyncProgress::MemberRefreshed {
                membership_id,
                display_name,
                characters,
            } => {
                tracing::debug!(membership_id = %membership_id, display_name = %display_name, characters, "Member refreshed");
            }

            SyncProgress::MemberDisabled {
                membership_id,
                characters,
            } => {
                tracing::info!(membership_id = %membership_id, characters, "Member disabled");
            }

            SyncProgress::MemberError {
                membership_id,
                error,
            } => {
                tracing::warn!(membership_id = %membership_id, error = %error, "Member refresh failed");
            }

            SyncProgress::RosterComplete {
                members,
                characters,
                disabled,
                errors,
            } => {
                tracing::info!(members, characters, disabled, errors, "Roster refresh complete");
            }

            SyncProgress::RepairingActivities { total } => {
                tracing::info!(total, "Repairing incomplete activities");
            }

            SyncProgress::ActivityRepaired {
                instance_id,
                complete,
            } => {
                tracing::debug!(instance_id = %instance_id, complete, "Activity repaired");
            }

            SyncProgress::RepairError { instance_id, error } => {
                tracing::warn!(instance_id = %instance_id, error = %error, "Repair failed");
            }

            SyncProgress::RepairComplete { repaired, failed } => {
                tracing::info!(repaired, failed, "Repair complete");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!("{}", message);
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
