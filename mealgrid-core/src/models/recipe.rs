use serde::{Deserialize, Serialize};
use std::fmt;

use super::nutrient::NutritionFacts;
use super::slot::RecipeId;

/// Read-only recipe metadata as provided by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Nutrition per serving
    #[serde(default)]
    pub nutrition: NutritionFacts,
    #[serde(default)]
    pub ingredient_count: u32,
    #[serde(default)]
    pub time_estimate: Option<u32>, // minutes
}

impl Recipe {
    pub fn new(id: impl Into<RecipeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: None,
            nutrition: NutritionFacts::zero(),
            ingredient_count: 0,
            time_estimate: None,
        }
    }

    pub fn with_nutrition(mut self, nutrition: NutritionFacts) -> Self {
        self.nutrition = nutrition;
        self
    }

    pub fn with_time_estimate(mut self, minutes: u32) -> Self {
        self.time_estimate = Some(minutes);
        self
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (#{})", self.title, self.id)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;

        if let Some(minutes) = self.time_estimate {
            writeln!(f, "Time: {} min", minutes)?;
        }
        writeln!(f, "Ingredients: {}", self.ingredient_count)?;
        writeln!(f, "Nutrition (per serving): {}", self.nutrition)?;

        Ok(())
    }
}
