//! SeaORM entity definitions for the clan database schema.

pub mod activity;
pub mod character;
pub mod guardian;
pub mod member;
pub mod prelude;
