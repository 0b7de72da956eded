mod assignment;
mod meal_plan;
mod meal_time;
mod nutrient;
mod recipe;
mod slot;

pub use assignment::{DishAssignment, MealAssignment, PlannedMeal};
pub use meal_plan::{LeftoverRecord, PlanSnapshot};
pub use meal_time::MealTime;
pub use nutrient::NutritionFacts;
pub use recipe::Recipe;
pub use slot::{DishRole, MealSlotKey, RecipeId, SlotKeyError};
