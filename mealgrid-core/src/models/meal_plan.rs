use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::assignment::PlannedMeal;
use super::slot::RecipeId;

/// Persisted form of one leftover ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverRecord {
    pub recipe_id: RecipeId,
    pub remaining_portions: u32,
    pub serving: u32,
}

/// Full plan snapshot as exchanged with the persistence store.
///
/// The store receives the whole snapshot on every write; there are no
/// partial updates. Slots are flattened into one `PlannedMeal` per
/// occupied (day, meal time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSnapshot {
    pub id: Uuid,
    pub title: String,
    /// Number of days covered by the plan
    pub days: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    /// Recipes picked for this plan
    #[serde(default)]
    pub recipe_ids: Vec<RecipeId>,
    #[serde(default)]
    pub meals: Vec<PlannedMeal>,
    #[serde(default)]
    pub leftovers: Vec<LeftoverRecord>,
}

impl PlanSnapshot {
    pub fn new(title: impl Into<String>, days: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            days,
            created_at: now,
            updated_at: now,
            preferences: Vec::new(),
            exclusions: Vec::new(),
            recipe_ids: Vec::new(),
            meals: Vec::new(),
            leftovers: Vec::new(),
        }
    }

    pub fn with_recipe_ids(mut self, recipe_ids: Vec<RecipeId>) -> Self {
        self.recipe_ids = recipe_ids;
        self
    }

    pub fn with_preferences(mut self, preferences: Vec<String>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }
}

impl fmt::Display for PlanSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Days: {}", self.days)?;
        writeln!(f, "Updated: {}", self.updated_at.format("%Y-%m-%d %H:%M"))?;

        if !self.preferences.is_empty() {
            writeln!(f, "Preferences: {}", self.preferences.join(", "))?;
        }
        if !self.exclusions.is_empty() {
            writeln!(f, "Exclusions: {}", self.exclusions.join(", "))?;
        }

        writeln!(f, "\nMeals: {} slot(s) filled", self.meals.len())?;
        if !self.leftovers.is_empty() {
            writeln!(f, "Leftovers: {} recipe(s) banked", self.leftovers.len())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealTime;

    #[test]
    fn test_plan_snapshot_new() {
        let plan = PlanSnapshot::new("Week 1", 7);
        assert_eq!(plan.title, "Week 1");
        assert_eq!(plan.days, 7);
        assert_eq!(plan.created_at, plan.updated_at);
        assert!(plan.meals.is_empty());
        assert!(plan.leftovers.is_empty());
    }

    #[test]
    fn test_plan_snapshot_builders() {
        let plan = PlanSnapshot::new("Cut", 5)
            .with_recipe_ids(vec![RecipeId(1), RecipeId(2)])
            .with_preferences(vec!["high protein".into()])
            .with_exclusions(vec!["peanuts".into()]);

        assert_eq!(plan.recipe_ids.len(), 2);
        assert_eq!(plan.preferences, vec!["high protein".to_string()]);
        assert_eq!(plan.exclusions, vec!["peanuts".to_string()]);
    }

    #[test]
    fn test_plan_snapshot_display() {
        let plan = PlanSnapshot::new("Bulk Week", 7).with_exclusions(vec!["shellfish".into()]);
        let output = format!("{}", plan);
        assert!(output.contains("Bulk Week"));
        assert!(output.contains("Days: 7"));
        assert!(output.contains("Exclusions: shellfish"));
    }

    #[test]
    fn test_plan_snapshot_json_roundtrip() {
        let mut plan = PlanSnapshot::new("Test", 3);
        plan.meals.push(PlannedMeal {
            day: 1,
            meal_time: MealTime::Dinner,
            main_recipe_id: Some(RecipeId(7)),
            main_portion: 3,
            main_serving: 1,
            main_is_leftover: true,
            main_is_from_leftover: false,
            side_recipe_id: None,
            side_portion: 1,
            side_serving: 1,
            side_is_leftover: false,
            side_is_from_leftover: false,
        });
        plan.leftovers.push(LeftoverRecord {
            recipe_id: RecipeId(7),
            remaining_portions: 2,
            serving: 1,
        });

        let json = serde_json::to_string(&plan).unwrap();
        let parsed: PlanSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
    }
}
