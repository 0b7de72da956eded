//! Slot contents: the main/side dish assignments held at a grid slot, and the
//! flattened per-slot record used in persisted plan snapshots.

use serde::{Deserialize, Serialize};

use super::meal_time::MealTime;
use super::slot::{DishRole, MealSlotKey, RecipeId, SlotKeyError};

/// One dish placed in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishAssignment {
    pub recipe_id: RecipeId,
    /// Number of portions cooked in this instance
    pub portion: u32,
    /// Multiplier applied to nutrition per serving
    pub serving: u32,
    /// Surplus portions are banked in the leftover ledger
    pub is_leftover: bool,
    /// This dish was populated by consuming a leftover
    pub is_from_leftover: bool,
}

impl DishAssignment {
    pub fn new(recipe_id: RecipeId) -> Self {
        Self {
            recipe_id,
            portion: 1,
            serving: 1,
            is_leftover: false,
            is_from_leftover: false,
        }
    }

    /// A single reheated portion taken from the leftover ledger.
    pub fn from_leftover(recipe_id: RecipeId, serving: u32) -> Self {
        Self {
            serving,
            is_from_leftover: true,
            ..Self::new(recipe_id)
        }
    }

    pub fn with_portion(mut self, portion: u32) -> Self {
        self.portion = portion;
        self
    }

    pub fn with_serving(mut self, serving: u32) -> Self {
        self.serving = serving;
        self
    }

    /// Whether the surplus of this dish may be banked as leftovers.
    pub fn can_bank_leftovers(&self) -> bool {
        self.portion > 1 && !self.is_from_leftover
    }

    /// Portions beyond the one eaten in this slot.
    pub fn surplus(&self) -> u32 {
        self.portion.saturating_sub(1)
    }
}

/// The contents of an occupied slot. A slot with neither dish is represented
/// by absence from the grid, never by an empty assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAssignment {
    pub main: Option<DishAssignment>,
    pub side: Option<DishAssignment>,
}

impl MealAssignment {
    pub fn with_main(main: DishAssignment) -> Self {
        Self {
            main: Some(main),
            side: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.side.is_none()
    }

    pub fn dish(&self, role: DishRole) -> Option<&DishAssignment> {
        match role {
            DishRole::Main => self.main.as_ref(),
            DishRole::Side => self.side.as_ref(),
        }
    }

    pub fn dish_mut(&mut self, role: DishRole) -> Option<&mut DishAssignment> {
        self.slot_mut(role).as_mut()
    }

    pub(crate) fn slot_mut(&mut self, role: DishRole) -> &mut Option<DishAssignment> {
        match role {
            DishRole::Main => &mut self.main,
            DishRole::Side => &mut self.side,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// Flattened per-slot record as stored in a plan snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub day: u32,
    pub meal_time: MealTime,
    #[serde(default)]
    pub main_recipe_id: Option<RecipeId>,
    #[serde(default = "default_quantity")]
    pub main_portion: u32,
    #[serde(default = "default_quantity")]
    pub main_serving: u32,
    #[serde(default)]
    pub main_is_leftover: bool,
    #[serde(default)]
    pub main_is_from_leftover: bool,
    #[serde(default)]
    pub side_recipe_id: Option<RecipeId>,
    #[serde(default = "default_quantity")]
    pub side_portion: u32,
    #[serde(default = "default_quantity")]
    pub side_serving: u32,
    #[serde(default)]
    pub side_is_leftover: bool,
    #[serde(default)]
    pub side_is_from_leftover: bool,
}

impl PlannedMeal {
    pub fn from_assignment(key: MealSlotKey, assignment: &MealAssignment) -> Self {
        let main = assignment.main.as_ref();
        let side = assignment.side.as_ref();
        Self {
            day: key.day(),
            meal_time: key.meal_time(),
            main_recipe_id: main.map(|d| d.recipe_id),
            main_portion: main.map_or(1, |d| d.portion),
            main_serving: main.map_or(1, |d| d.serving),
            main_is_leftover: main.is_some_and(|d| d.is_leftover),
            main_is_from_leftover: main.is_some_and(|d| d.is_from_leftover),
            side_recipe_id: side.map(|d| d.recipe_id),
            side_portion: side.map_or(1, |d| d.portion),
            side_serving: side.map_or(1, |d| d.serving),
            side_is_leftover: side.is_some_and(|d| d.is_leftover),
            side_is_from_leftover: side.is_some_and(|d| d.is_from_leftover),
        }
    }

    /// Splits the record back into its slot key and assignment.
    ///
    /// Dish fields without a recipe id are ignored. Invariant checks on the
    /// resulting dishes are left to the grid.
    pub fn to_assignment(&self) -> Result<(MealSlotKey, MealAssignment), SlotKeyError> {
        let key = MealSlotKey::new(self.day, self.meal_time)?;
        let main = self.main_recipe_id.map(|recipe_id| DishAssignment {
            recipe_id,
            portion: self.main_portion,
            serving: self.main_serving,
            is_leftover: self.main_is_leftover,
            is_from_leftover: self.main_is_from_leftover,
        });
        let side = self.side_recipe_id.map(|recipe_id| DishAssignment {
            recipe_id,
            portion: self.side_portion,
            serving: self.side_serving,
            is_leftover: self.side_is_leftover,
            is_from_leftover: self.side_is_from_leftover,
        });
        Ok((key, MealAssignment { main, side }))
    }
}
