use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Record not found.
    #[error("Record not found: {context}")]
    NotFound { context: String },

    /// The activity is already stored.
    #[error("Activity already exists: {instance_id}")]
    Duplicate { instance_id: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A stored or outgoing JSON document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Create a NotFound error for a character lookup.
    pub fn character_not_found(character_id: &str) -> Self {
        Self::NotFound {
            context: format!("character_id={}", character_id),
        }
    }

    /// Create a NotFound error for an activity lookup.
    pub fn activity_not_found(instance_id: &str) -> Self {
        Self::NotFound {
            context: format!("instance_id={}", instance_id),
        }
    }

    /// Whether this is a duplicate-key rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
