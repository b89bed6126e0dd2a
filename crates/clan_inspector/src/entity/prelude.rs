//! Common re-exports for convenient entity usage.

pub use super::activity::{
    ActiveModel as ActivityActiveModel, Column as ActivityColumn, Entity as Activity,
    Model as ActivityModel,
};
pub use super::character::{
    ActiveModel as CharacterActiveModel, Column as CharacterColumn, Entity as Character,
    Model as CharacterModel,
};
pub use super::guardian::{CharacterClass, Gender, Race};
pub use super::member::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as Member,
    Model as MemberModel,
};
