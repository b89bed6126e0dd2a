//! Source-agnostic view of the remote stats API.
//!
//! The sync engine only talks to the traits defined here, so it can be driven
//! by the Bungie.net client in production and by in-memory fakes in tests.
//!
//! # Example
//!
//! ```ignore
//! use clan_inspector::platform::{ActivitySource, PlatformError};
//!
//! async fn newest<S: ActivitySource>(source: &S) -> Result<(), PlatformError> {
//!     let page = source.list_activity_summaries("4611686018400000001", "2305843009200000001", 0).await?;
//!     if let Some(first) = page.first() {
//!         let detail = source.fetch_activity_detail(&first.instance_id).await?;
//!         println!("{} players in {}", detail.entries.len(), detail.instance_id);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
mod rate_limit;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use rate_limit::{ApiRateLimiter, RateLimitedSource, rate_limits};
pub use types::{
    ActivityDetail, ActivityEntry, ActivitySource, ActivitySummary, ClanMember, RosterCharacter,
    RosterSource, WeaponStats,
};
