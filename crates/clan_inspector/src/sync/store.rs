//! Persistence boundary for the sync engine.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use super::types::TrackedCharacter;
use super::watermark::SyncWatermark;
use crate::platform::ActivityDetail;
use crate::repository::{self, RepositoryError};

/// Errors from an [`ActivityStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The activity is already stored. Callers treat this as success.
    #[error("activity {instance_id} is already stored")]
    DuplicateKey { instance_id: String },

    #[error("unknown character: {character_id}")]
    UnknownCharacter { character_id: String },

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate { instance_id } => StoreError::DuplicateKey { instance_id },
            other => StoreError::Persistence(other.to_string()),
        }
    }
}

/// Where tracked characters, watermarks and activity reports live.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Characters to sync, in no particular order.
    async fn list_tracked_characters(&self) -> Result<Vec<TrackedCharacter>, StoreError>;

    async fn load_watermark(&self, character_id: &str) -> Result<SyncWatermark, StoreError>;

    async fn save_watermark(
        &self,
        character_id: &str,
        watermark: &SyncWatermark,
    ) -> Result<(), StoreError>;

    /// Store a report unless one with the same instance id exists, in which
    /// case return [`StoreError::DuplicateKey`].
    async fn insert_activity_if_absent(&self, detail: &ActivityDetail) -> Result<(), StoreError>;
}

/// [`ActivityStore`] backed by the sea-orm repositories.
///
/// Owns its connection; use [`DbActivityStore::connection`] for other
/// queries against the same database.
pub struct DbActivityStore {
    db: DatabaseConnection,
}

impl DbActivityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ActivityStore for DbActivityStore {
    async fn list_tracked_characters(&self) -> Result<Vec<TrackedCharacter>, StoreError> {
        let characters = repository::character::list_enabled(&self.db).await?;
        Ok(characters
            .into_iter()
            .map(|c| TrackedCharacter {
                date_last_played: c.date_last_played_utc(),
                character_id: c.character_id,
                membership_id: c.membership_id,
                class: c.class,
            })
            .collect())
    }

    async fn load_watermark(&self, character_id: &str) -> Result<SyncWatermark, StoreError> {
        let character = repository::character::find_by_id(&self.db, character_id)
            .await?
            .ok_or_else(|| StoreError::UnknownCharacter {
                character_id: character_id.to_string(),
            })?;

        Ok(SyncWatermark {
            last_retrieved_date: character.last_retrieved_date_utc(),
            last_instance_id: character.last_retrieved_activity,
        })
    }

    async fn save_watermark(
        &self,
        character_id: &str,
        watermark: &SyncWatermark,
    ) -> Result<(), StoreError> {
        repository::character::update_watermark(
            &self.db,
            character_id,
            watermark.last_instance_id.clone(),
            watermark.last_retrieved_date,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound { .. } => StoreError::UnknownCharacter {
                character_id: character_id.to_string(),
            },
            other => other.into(),
        })
    }

    async fn insert_activity_if_absent(&self, detail: &ActivityDetail) -> Result<(), StoreError> {
        repository::activity::insert_if_absent(&self.db, detail).await?;
        Ok(())
    }
}
