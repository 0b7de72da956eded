//! Grid coordinates: recipe identifiers, slot keys and dish roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::meal_time::MealTime;

/// Stable numeric identifier of a catalog recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u32);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecipeId)
    }
}

impl From<u32> for RecipeId {
    fn from(id: u32) -> Self {
        RecipeId(id)
    }
}

/// Errors produced when building or parsing a slot key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotKeyError {
    #[error("Invalid day {0}: days start at 1")]
    InvalidDay(u32),

    #[error("Invalid slot '{0}'. Expected <day>-<meal time>, e.g. 2-dinner")]
    Malformed(String),

    #[error("{0}")]
    MealTime(String),
}

/// A (day, meal time) coordinate in the plan grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MealSlotKey {
    day: u32,
    meal_time: MealTime,
}

impl MealSlotKey {
    pub fn new(day: u32, meal_time: MealTime) -> Result<Self, SlotKeyError> {
        if day == 0 {
            return Err(SlotKeyError::InvalidDay(day));
        }
        Ok(Self { day, meal_time })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn meal_time(&self) -> MealTime {
        self.meal_time
    }
}

impl fmt::Display for MealSlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.meal_time)
    }
}

impl FromStr for MealSlotKey {
    type Err = SlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, meal_time) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| SlotKeyError::Malformed(s.to_string()))?;
        let day: u32 = day
            .parse()
            .map_err(|_| SlotKeyError::Malformed(s.to_string()))?;
        let meal_time: MealTime = meal_time.parse().map_err(SlotKeyError::MealTime)?;
        Self::new(day, meal_time)
    }
}

/// Which dish of a slot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DishRole {
    Main,
    Side,
}

impl fmt::Display for DishRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DishRole::Main => write!(f, "main"),
            DishRole::Side => write!(f, "side"),
        }
    }
}

impl FromStr for DishRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" => Ok(DishRole::Main),
            "side" => Ok(DishRole::Side),
            _ => Err(format!("Invalid dish role '{}'. Valid options: main, side", s)),
        }
    }
}
