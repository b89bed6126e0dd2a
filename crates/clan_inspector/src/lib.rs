//! Clan Inspector - incremental clan activity sync for Destiny 2.
//!
//! This library pulls the clan roster, character list and post-game carnage
//! reports from the Bungie.net platform API and persists them, keeping a
//! per-character watermark so repeated runs only fetch what is new.
//!
//! # Features
//!
//! - `bungie` - The reqwest-backed Bungie.net client ([`bungie::BungieClient`]).
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//! - `sqlite` / `postgres` - Database backends.
//!
//! # Example
//!
//! ```ignore
//! use clan_inspector::bungie::BungieClient;
//! use clan_inspector::sync::{CharacterSyncDriver, DbActivityStore, SyncOptions};
//! use clan_inspector::connect_and_migrate;
//!
//! let db = connect_and_migrate("sqlite://clan.db?mode=rwc").await?;
//! let client = BungieClient::new(&api_key, 3)?;
//! let store = DbActivityStore::new(db);
//! let options = SyncOptions::default();
//!
//! let characters = store.list_tracked_characters().await?;
//! let summary = CharacterSyncDriver::new(&client, &store, &options)
//!     .run(characters)
//!     .await;
//! println!("{} characters synced", summary.synced());
//! ```

pub mod db;
pub mod entity;
pub mod http;
pub mod platform;
pub mod repair;
pub mod report;
pub mod repository;
pub mod roster;
pub mod sync;

#[cfg(feature = "bungie")]
pub mod bungie;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use platform::{
    ActivityDetail, ActivitySource, ActivitySummary, ApiRateLimiter, PlatformError,
    RateLimitedSource, RosterSource,
};
pub use repository::RepositoryError;
