//! Derived nutrition totals.
//!
//! Pure read-side computation over the grid and the catalog; safe to call on
//! every render.

use crate::catalog::RecipeCatalog;
use crate::grid::MealGrid;
use crate::models::{DishAssignment, NutritionFacts};

fn dish_nutrition<C: RecipeCatalog + ?Sized>(catalog: &C, dish: &DishAssignment) -> NutritionFacts {
    match catalog.get(dish.recipe_id) {
        Some(recipe) => recipe.nutrition.scaled(f64::from(dish.serving)),
        None => {
            tracing::debug!("Recipe {} not in catalog, counted as zero", dish.recipe_id);
            NutritionFacts::zero()
        }
    }
}

/// Sums per-serving nutrition times serving over every main and side on `day`.
pub fn day_totals<C: RecipeCatalog + ?Sized>(
    grid: &MealGrid,
    catalog: &C,
    day: u32,
) -> NutritionFacts {
    grid.slots_for_day(day)
        .flat_map(|(_, entry)| [entry.main.as_ref(), entry.side.as_ref()])
        .flatten()
        .map(|dish| dish_nutrition(catalog, dish))
        .sum()
}

/// Totals for each day `1..=days`, including empty days.
pub fn plan_totals<C: RecipeCatalog + ?Sized>(
    grid: &MealGrid,
    catalog: &C,
    days: u32,
) -> Vec<(u32, NutritionFacts)> {
    (1..=days)
        .map(|day| (day, day_totals(grid, catalog, day)))
        .collect()
}

/// Mean of the daily totals over `days`; zero for an empty plan.
pub fn average_daily<C: RecipeCatalog + ?Sized>(
    grid: &MealGrid,
    catalog: &C,
    days: u32,
) -> NutritionFacts {
    if days == 0 {
        return NutritionFacts::zero();
    }
    let total: NutritionFacts = plan_totals(grid, catalog, days)
        .into_iter()
        .map(|(_, facts)| facts)
        .sum();
    total.scaled(1.0 / f64::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::models::{MealSlotKey, MealTime, Recipe, RecipeId};

    fn key(day: u32, meal_time: MealTime) -> MealSlotKey {
        MealSlotKey::new(day, meal_time).unwrap()
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            Recipe::new(1, "Oats").with_nutrition(NutritionFacts::new(300.0, 10.0, 50.0, 6.0, 8.0)),
            Recipe::new(2, "Salad").with_nutrition(NutritionFacts::new(100.0, 2.0, 10.0, 5.0, 4.0)),
            Recipe::new(3, "Steak").with_nutrition(NutritionFacts::new(500.0, 40.0, 0.0, 30.0, 0.0)),
        ])
    }

    #[test]
    fn test_empty_day_is_zero() {
        let grid = MealGrid::new();
        assert_eq!(day_totals(&grid, &catalog(), 1), NutritionFacts::zero());
    }

    #[test]
    fn test_day_totals_scale_by_serving_and_include_sides() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Breakfast), RecipeId(1), 1, 2).unwrap();
        grid.set_main(key(1, MealTime::Dinner), RecipeId(3), 3, 1).unwrap();
        grid.set_side(key(1, MealTime::Dinner), RecipeId(2), 1, 1).unwrap();
        grid.set_main(key(2, MealTime::Dinner), RecipeId(3), 1, 1).unwrap();

        let totals = day_totals(&grid, &catalog(), 1);
        // 2 x oats + steak + salad; portions do not count
        assert_eq!(totals, NutritionFacts::new(1200.0, 62.0, 110.0, 47.0, 20.0));
    }

    #[test]
    fn test_unknown_recipes_count_as_zero() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Lunch), RecipeId(99), 1, 1).unwrap();
        grid.set_side(key(1, MealTime::Lunch), RecipeId(2), 1, 1).unwrap();

        assert_eq!(day_totals(&grid, &catalog(), 1).calories, 100.0);
    }

    #[test]
    fn test_day_totals_is_idempotent() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Lunch), RecipeId(1), 1, 1).unwrap();
        let before = grid.clone();
        let catalog = catalog();

        let first = day_totals(&grid, &catalog, 1);
        let second = day_totals(&grid, &catalog, 1);
        assert_eq!(first, second);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_plan_totals_and_average() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Lunch), RecipeId(1), 1, 1).unwrap();
        grid.set_main(key(3, MealTime::Lunch), RecipeId(2), 1, 1).unwrap();
        let catalog = catalog();

        let totals = plan_totals(&grid, &catalog, 4);
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[1], (2, NutritionFacts::zero()));
        assert_eq!(totals[2].1.calories, 100.0);

        assert_eq!(average_daily(&grid, &catalog, 4).calories, 100.0);
        assert_eq!(average_daily(&grid, &catalog, 0), NutritionFacts::zero());
    }
}
