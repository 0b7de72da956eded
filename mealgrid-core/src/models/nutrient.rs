use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Macronutrient totals. On a recipe these are per serving.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl NutritionFacts {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns these facts multiplied by a serving multiplier.
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
            fiber: self.fiber * multiplier,
        }
    }
}

impl Add for NutritionFacts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
        }
    }
}

impl AddAssign for NutritionFacts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for NutritionFacts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for NutritionFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} kcal, protein {:.1} g, carbs {:.1} g, fat {:.1} g, fiber {:.1} g",
            self.calories, self.protein, self.carbs, self.fat, self.fiber
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled() {
        let facts = NutritionFacts::new(200.0, 10.0, 30.0, 5.0, 4.0).scaled(2.0);
        assert_eq!(facts, NutritionFacts::new(400.0, 20.0, 60.0, 10.0, 8.0));
    }

    #[test]
    fn test_sum() {
        let total: NutritionFacts = vec![
            NutritionFacts::new(100.0, 1.0, 2.0, 3.0, 4.0),
            NutritionFacts::new(50.0, 1.0, 1.0, 1.0, 1.0),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, NutritionFacts::new(150.0, 2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: NutritionFacts = Vec::new().into_iter().sum();
        assert_eq!(total, NutritionFacts::zero());
    }

    #[test]
    fn test_display() {
        let facts = NutritionFacts::new(250.0, 15.5, 30.0, 8.0, 3.0);
        assert_eq!(
            format!("{}", facts),
            "250 kcal, protein 15.5 g, carbs 30.0 g, fat 8.0 g, fiber 3.0 g"
        );
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let facts: NutritionFacts = serde_json::from_str(r#"{"calories": 120}"#).unwrap();
        assert_eq!(facts.calories, 120.0);
        assert_eq!(facts.fiber, 0.0);
    }
}
