use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal-time column of the plan grid, ordered as the day unfolds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealTime {
    Breakfast,
    Snack,
    Lunch,
    Dinner,
}

impl MealTime {
    /// All meal times in grid order.
    pub const ALL: [MealTime; 4] = [
        MealTime::Breakfast,
        MealTime::Snack,
        MealTime::Lunch,
        MealTime::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealTime::Breakfast => "breakfast",
            MealTime::Snack => "snack",
            MealTime::Lunch => "lunch",
            MealTime::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealTime::Breakfast),
            "snack" => Ok(MealTime::Snack),
            "lunch" => Ok(MealTime::Lunch),
            "dinner" => Ok(MealTime::Dinner),
            _ => Err(format!(
                "Invalid meal time '{}'. Valid options: breakfast, snack, lunch, dinner",
                s
            )),
        }
    }
}
