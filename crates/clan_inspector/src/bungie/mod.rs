//! Bungie.net platform API client.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for Bungie API operations
//! - [`types`] - Wire types for the endpoints this tool reads
//! - [`client`] - The client and its `ActivitySource`/`RosterSource` impls
//! - `convert` - Wire type to platform type conversion
//!
//! ```ignore
//! use clan_inspector::bungie::BungieClient;
//! use clan_inspector::platform::{RateLimitedSource, rate_limits};
//!
//! let client = BungieClient::new(&api_key, 3)?.with_clan_id("1234567");
//! let client = RateLimitedSource::new(client, rate_limits::BUNGIE_DEFAULT_RPS);
//! ```

pub mod client;
mod convert;
pub mod error;
pub mod types;

pub use client::{BungieClient, DEFAULT_ACTIVITY_BATCH_SIZE, DEFAULT_BASE_URL};
pub use error::{BungieError, short_error_message};
