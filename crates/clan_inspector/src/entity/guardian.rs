//! Character attribute enums.
//!
//! The API reports race, gender and class as small integers. Codes the game
//! adds later map to the `Unknown` variant instead of failing the roster
//! refresh.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Character race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Race {
    #[sea_orm(num_value = 0)]
    Human,
    #[sea_orm(num_value = 1)]
    Awoken,
    #[sea_orm(num_value = 2)]
    Exo,
    #[sea_orm(num_value = 3)]
    Unknown,
}

/// Character gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Gender {
    #[sea_orm(num_value = 0)]
    Male,
    #[sea_orm(num_value = 1)]
    Female,
    #[sea_orm(num_value = 2)]
    Unknown,
}

/// Character class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CharacterClass {
    #[sea_orm(num_value = 0)]
    Titan,
    #[sea_orm(num_value = 1)]
    Hunter,
    #[sea_orm(num_value = 2)]
    Warlock,
    #[sea_orm(num_value = 3)]
    Unknown,
}

impl Race {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Race::Human,
            1 => Race::Awoken,
            2 => Race::Exo,
            _ => Race::Unknown,
        }
    }
}

impl Gender {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

impl CharacterClass {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CharacterClass::Titan,
            1 => CharacterClass::Hunter,
            2 => CharacterClass::Warlock,
            _ => CharacterClass::Unknown,
        }
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Race::Human => write!(f, "Human"),
            Race::Awoken => write!(f, "Awoken"),
            Race::Exo => write!(f, "Exo"),
            Race::Unknown => write!(f, "Unknown Race"),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unknown => write!(f, "Genderless"),
        }
    }
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterClass::Titan => write!(f, "Titan"),
            CharacterClass::Hunter => write!(f, "Hunter"),
            CharacterClass::Warlock => write!(f, "Warlock"),
            CharacterClass::Unknown => write!(f, "Unknown Class"),
        }
    }
}

impl std::str::FromStr for CharacterClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "titan" => Ok(CharacterClass::Titan),
            "hunter" => Ok(CharacterClass::Hunter),
            "warlock" => Ok(CharacterClass::Warlock),
            _ => Err(format!("Unknown character class: {}", s)),
        }
    }
}
