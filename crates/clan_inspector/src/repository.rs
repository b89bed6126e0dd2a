//! Persistence operations for members, characters and activities.
//!
//! Functions take a `&DatabaseConnection` and return [`RepositoryError`] on
//! failure. Duplicate activity inserts surface as
//! [`RepositoryError::Duplicate`] so callers can treat them as already synced.

pub mod activity;
pub mod character;
mod errors;
pub mod member;

pub use errors::{RepositoryError, Result};
