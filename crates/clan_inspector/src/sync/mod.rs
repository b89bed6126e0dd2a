//! Incremental activity sync.
//!
//! # Module Structure
//!
//! - [`watermark`] - The per-character cursor: `SyncWatermark`
//! - [`store`] - Persistence boundary: `ActivityStore`, `DbActivityStore`
//! - [`engine`] - One character pass: `ActivitySyncEngine`
//! - [`driver`] - A run over all characters: `CharacterSyncDriver`
//! - `types` / `progress` - Options, results and progress events
//!
//! # Example
//!
//! ```ignore
//! use clan_inspector::sync::{ActivityStore, CharacterSyncDriver, DbActivityStore, SyncOptions};
//!
//! let store = DbActivityStore::new(db);
//! let options = SyncOptions::default();
//! let characters = store.list_tracked_characters().await?;
//! let summary = CharacterSyncDriver::new(&client, &store, &options)
//!     .with_progress(Some(&progress))
//!     .run(characters)
//!     .await;
//! ```

pub mod driver;
pub mod engine;
mod progress;
pub mod store;
mod types;
pub mod watermark;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{CharacterSyncDriver, StopCheck};
pub use engine::{ActivitySyncEngine, Discovery, SyncError};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use store::{ActivityStore, DbActivityStore, StoreError};
pub use types::{
    CharacterSyncOutcome, CharacterSyncReport, CharacterSyncResult, DEFAULT_ACTIVITY_AGE_CUTOFF_HOURS,
    SyncOptions, SyncSummary, TrackedCharacter,
};
pub use watermark::SyncWatermark;
