//! Clan roster refresh.
//!
//! Brings the `members` and `characters` tables in line with the clan as the
//! API currently lists it. Members who left are disabled together with their
//! characters. Members still in the clan are upserted and re-enabled, and
//! their characters are refreshed without touching sync watermarks.

use std::collections::BTreeSet;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::platform::{PlatformError, RosterSource, short_error_message};
use crate::repository::{self, RepositoryError};
use crate::sync::{ProgressCallback, SyncProgress, emit};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to list clan members: {0}")]
    Fetch(#[from] PlatformError),

    #[error("failed to store roster: {0}")]
    Store(#[from] RepositoryError),
}

/// Counts from a roster refresh.
#[derive(Debug, Default)]
pub struct RosterSummary {
    /// Members currently in the clan.
    pub members: usize,
    /// Characters refreshed across those members.
    pub characters: usize,
    /// Membership ids disabled because they left the clan.
    pub disabled: Vec<String>,
    /// `(membership_id, error)` for members whose characters could not be
    /// fetched.
    pub errors: Vec<(String, String)>,
}

/// Refresh members and characters from the roster source.
///
/// A failure listing one member's characters is recorded and skipped. Failing
/// to list the clan, or any database error, ends the refresh.
#[tracing::instrument(skip_all)]
pub async fn refresh_roster<R: RosterSource + ?Sized>(
    source: &R,
    db: &DatabaseConnection,
    on_progress: Option<&ProgressCallback>,
) -> Result<RosterSummary, RosterError> {
    let mut summary = RosterSummary::default();

    let known = repository::member::list_enabled(db).await?;

    emit(on_progress, SyncProgress::FetchingRoster);
    let mut clan = source.list_clan_members().await?;
    clan.sort_by(|a, b| a.membership_id.cmp(&b.membership_id));
    clan.dedup_by(|a, b| a.membership_id == b.membership_id);
    summary.members = clan.len();
    emit(
        on_progress,
        SyncProgress::RosterFetched {
            members: clan.len(),
        },
    );

    let current: BTreeSet<&str> = clan.iter().map(|m| m.membership_id.as_str()).collect();
    for departed in known
        .iter()
        .filter(|m| !current.contains(m.membership_id.as_str()))
    {
        let characters = repository::member::disable(db, &departed.membership_id).await?;
        tracing::info!(
            membership_id = %departed.membership_id,
            display_name = %departed.display_name,
            characters,
            "Member left the clan"
        );
        emit(
            on_progress,
            SyncProgress::MemberDisabled {
                membership_id: departed.membership_id.clone(),
                characters,
            },
        );
        summary.disabled.push(departed.membership_id.clone());
    }

    for member in &clan {
        repository::member::upsert(db, member).await?;

        let characters = match source.list_member_characters(member).await {
            Ok(characters) => characters,
            Err(e) => {
                let error = short_error_message(&e);
                tracing::warn!(membership_id = %member.membership_id, error = %error, "Could not list characters");
                emit(
                    on_progress,
                    SyncProgress::MemberError {
                        membership_id: member.membership_id.clone(),
                        error: error.clone(),
                    },
                );
                summary.errors.push((member.membership_id.clone(), error));
                continue;
            }
        };

        for character in &characters {
            repository::character::upsert_from_roster(db, character).await?;
        }
        summary.characters += characters.len();

        emit(
            on_progress,
            SyncProgress::MemberRefreshed {
                membership_id: member.membership_id.clone(),
                display_name: member.display_name.clone(),
                characters: characters.len(),
            },
        );
    }

    emit(
        on_progress,
        SyncProgress::RosterComplete {
            members: summary.members,
            characters: summary.characters,
            disabled: summary.disabled.len(),
            errors: summary.errors.len(),
        },
    );
    Ok(summary)
}
