//! Slot assignment store.
//!
//! `MealGrid` is the plan value: the mapping from (day, meal time) to the
//! dishes placed there, together with the leftover ledger those dishes feed.
//! It is mutated only through the operations below, each of which keeps the
//! slot invariants:
//!
//! - a slot with neither a main nor a side is absent from the grid
//! - a dish flagged as a leftover source has more than one portion and was
//!   not itself taken from a leftover
//! - a side is only added next to an existing main, except for leftover drops
//!   and for slots whose main was removed

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ledger::LeftoverLedger;
use crate::models::{
    DishAssignment, DishRole, LeftoverRecord, MealAssignment, MealSlotKey, PlanSnapshot,
    PlannedMeal, RecipeId, SlotKeyError,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("{0} must be at least 1")]
    ZeroQuantity(&'static str),

    #[error("No {role} dish at {key}")]
    NoDish { key: MealSlotKey, role: DishRole },

    #[error(transparent)]
    SlotKey(#[from] SlotKeyError),

    #[error("Slot {0} appears more than once")]
    DuplicateSlot(MealSlotKey),

    #[error("Slot {0} has neither a main nor a side")]
    EmptySlot(MealSlotKey),

    #[error("The {role} at {key} is flagged as a leftover source but cannot bank leftovers")]
    InvalidLeftoverFlag { key: MealSlotKey, role: DishRole },

    #[error("Leftovers of recipe {0} have an invalid serving")]
    InvalidLeftover(RecipeId),

    #[error("A plan must cover at least one day")]
    NoDays,

    #[error("Slot {key} is outside the plan ({days} day(s))")]
    SlotOutOfRange { key: MealSlotKey, days: u32 },
}

fn check_quantity(what: &'static str, value: u32) -> Result<(), GridError> {
    if value == 0 {
        return Err(GridError::ZeroQuantity(what));
    }
    Ok(())
}

fn dish_entry(
    slots: &mut BTreeMap<MealSlotKey, MealAssignment>,
    key: MealSlotKey,
    role: DishRole,
) -> Result<&mut DishAssignment, GridError> {
    slots
        .get_mut(&key)
        .and_then(|entry| entry.dish_mut(role))
        .ok_or(GridError::NoDish { key, role })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealGrid {
    slots: BTreeMap<MealSlotKey, MealAssignment>,
    ledger: LeftoverLedger,
}

impl MealGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a grid from persisted records, rejecting records that break
    /// the slot invariants.
    pub fn from_records(
        meals: &[PlannedMeal],
        leftovers: &[LeftoverRecord],
    ) -> Result<Self, GridError> {
        let mut slots = BTreeMap::new();
        for meal in meals {
            let (key, assignment) = meal.to_assignment()?;
            if assignment.is_empty() {
                return Err(GridError::EmptySlot(key));
            }
            if slots.insert(key, assignment).is_some() {
                return Err(GridError::DuplicateSlot(key));
            }
        }

        let grid = Self {
            slots,
            ledger: LeftoverLedger::from_records(leftovers),
        };
        grid.check_invariants()?;
        Ok(grid)
    }

    /// Builds the grid of a stored plan. Every slot must fall on one of the
    /// plan's days.
    pub fn from_plan(plan: &PlanSnapshot) -> Result<Self, GridError> {
        if plan.days == 0 {
            return Err(GridError::NoDays);
        }
        let grid = Self::from_records(&plan.meals, &plan.leftovers)?;
        if let Some((key, _)) = grid.iter().find(|(key, _)| key.day() > plan.days) {
            return Err(GridError::SlotOutOfRange {
                key,
                days: plan.days,
            });
        }
        Ok(grid)
    }

    /// Flattens the grid into one record per occupied slot, in grid order.
    pub fn to_meals(&self) -> Vec<PlannedMeal> {
        self.slots
            .iter()
            .map(|(key, assignment)| PlannedMeal::from_assignment(*key, assignment))
            .collect()
    }

    pub fn leftover_records(&self) -> Vec<LeftoverRecord> {
        self.ledger.to_records()
    }

    pub fn check_invariants(&self) -> Result<(), GridError> {
        for (key, assignment) in &self.slots {
            if assignment.is_empty() {
                return Err(GridError::EmptySlot(*key));
            }
            for role in [DishRole::Main, DishRole::Side] {
                let Some(dish) = assignment.dish(role) else {
                    continue;
                };
                check_quantity("portion", dish.portion)?;
                check_quantity("serving", dish.serving)?;
                if dish.is_leftover && !dish.can_bank_leftovers() {
                    return Err(GridError::InvalidLeftoverFlag { key: *key, role });
                }
            }
        }
        for (recipe_id, entry) in self.ledger.iter() {
            if entry.serving == 0 {
                return Err(GridError::InvalidLeftover(recipe_id));
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "grid invariant violated: {:?}",
            self.check_invariants()
        );
    }

    pub fn get(&self, key: MealSlotKey) -> Option<&MealAssignment> {
        self.slots.get(&key)
    }

    pub fn dish(&self, key: MealSlotKey, role: DishRole) -> Option<&DishAssignment> {
        self.get(key).and_then(|entry| entry.dish(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealSlotKey, &MealAssignment)> {
        self.slots.iter().map(|(key, entry)| (*key, entry))
    }

    pub fn slots_for_day(&self, day: u32) -> impl Iterator<Item = (MealSlotKey, &MealAssignment)> {
        self.iter().filter(move |(key, _)| key.day() == day)
    }

    pub fn leftovers(&self) -> &LeftoverLedger {
        &self.ledger
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Creates or overwrites the main dish of `key`.
    ///
    /// Leftovers banked by a replaced main stay in the ledger: they belong to
    /// the recipe, not to the slot.
    pub fn set_main(
        &mut self,
        key: MealSlotKey,
        recipe_id: RecipeId,
        portion: u32,
        serving: u32,
    ) -> Result<(), GridError> {
        check_quantity("portion", portion)?;
        check_quantity("serving", serving)?;

        let dish = DishAssignment::new(recipe_id)
            .with_portion(portion)
            .with_serving(serving);
        self.slots.entry(key).or_default().main = Some(dish);
        tracing::debug!("Grid: main of {} set to recipe {}", key, recipe_id);

        self.debug_check();
        Ok(())
    }

    /// Creates or overwrites the side dish of `key`.
    ///
    /// Returns `Ok(false)` without changes when the slot has no main.
    pub fn set_side(
        &mut self,
        key: MealSlotKey,
        recipe_id: RecipeId,
        portion: u32,
        serving: u32,
    ) -> Result<bool, GridError> {
        check_quantity("portion", portion)?;
        check_quantity("serving", serving)?;

        let Some(entry) = self.slots.get_mut(&key).filter(|e| e.main.is_some()) else {
            tracing::debug!("Grid: side for {} ignored, slot has no main", key);
            return Ok(false);
        };
        entry.side = Some(
            DishAssignment::new(recipe_id)
                .with_portion(portion)
                .with_serving(serving),
        );
        tracing::debug!("Grid: side of {} set to recipe {}", key, recipe_id);

        self.debug_check();
        Ok(true)
    }

    /// Removes the main of `key`, keeping the slot when a side remains.
    ///
    /// A removed dish that was banking leftovers takes its ledger entry with
    /// it; other dishes of the same recipe leave the ledger alone.
    pub fn remove_main(&mut self, key: MealSlotKey) -> Option<DishAssignment> {
        self.remove_dish(key, DishRole::Main)
    }

    /// Removes the side of `key`, keeping the slot when a main remains.
    pub fn remove_side(&mut self, key: MealSlotKey) -> Option<DishAssignment> {
        self.remove_dish(key, DishRole::Side)
    }

    fn remove_dish(&mut self, key: MealSlotKey, role: DishRole) -> Option<DishAssignment> {
        let entry = self.slots.get_mut(&key)?;
        let removed = entry.slot_mut(role).take()?;
        if entry.is_empty() {
            self.slots.remove(&key);
        }
        if removed.is_leftover {
            self.ledger.remove(removed.recipe_id);
        }
        tracing::debug!("Grid: removed {} recipe {} from {}", role, removed.recipe_id, key);

        self.debug_check();
        Some(removed)
    }

    /// Turns leftover banking on or off for a dish.
    ///
    /// Turning it on records `portion - 1` portions at the dish's serving.
    /// Dishes with a single portion or taken from a leftover cannot bank;
    /// for those the call returns `Ok(false)`. Returns whether the flag changed.
    pub fn set_leftover_flag(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        enabled: bool,
    ) -> Result<bool, GridError> {
        let dish = dish_entry(&mut self.slots, key, role)?;

        let changed = if enabled {
            if !dish.can_bank_leftovers() {
                tracing::debug!("Grid: {} at {} cannot bank leftovers", role, key);
                return Ok(false);
            }
            let changed = !dish.is_leftover;
            dish.is_leftover = true;
            self.ledger
                .record_leftover(dish.recipe_id, dish.surplus(), dish.serving);
            changed
        } else {
            if !dish.is_leftover {
                return Ok(false);
            }
            dish.is_leftover = false;
            self.ledger.remove(dish.recipe_id);
            true
        };

        self.debug_check();
        Ok(changed)
    }

    /// Changes the number of portions cooked for a dish.
    ///
    /// Dropping to a single portion ends leftover banking; a banking dish
    /// with more portions has its ledger entry rewritten to the new surplus.
    pub fn set_portion(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        portion: u32,
    ) -> Result<(), GridError> {
        check_quantity("portion", portion)?;
        let dish = dish_entry(&mut self.slots, key, role)?;
        dish.portion = portion;

        if dish.is_leftover {
            if portion == 1 {
                dish.is_leftover = false;
                self.ledger.remove(dish.recipe_id);
            } else {
                self.ledger
                    .record_leftover(dish.recipe_id, dish.surplus(), dish.serving);
            }
        }
        tracing::debug!("Grid: {} at {} now {} portion(s)", role, key, portion);

        self.debug_check();
        Ok(())
    }

    /// Changes the serving multiplier of a dish. The ledger is not touched.
    pub fn set_serving(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        serving: u32,
    ) -> Result<(), GridError> {
        check_quantity("serving", serving)?;
        let dish = dish_entry(&mut self.slots, key, role)?;
        dish.serving = serving;
        tracing::debug!("Grid: {} at {} now serving {}", role, key, serving);
        Ok(())
    }

    /// Moves the contents of `source` onto `target`.
    ///
    /// An empty target receives the whole source entry. An occupied target
    /// swaps mains with the source; sides stay where they are. Returns
    /// whether anything changed.
    pub fn move_slot(&mut self, source: MealSlotKey, target: MealSlotKey) -> bool {
        if source == target {
            return false;
        }
        let Some(mut from) = self.slots.remove(&source) else {
            return false;
        };

        let Some(mut to) = self.slots.remove(&target) else {
            self.slots.insert(target, from);
            tracing::debug!("Grid: moved {} to {}", source, target);
            self.debug_check();
            return true;
        };

        let changed = from.main.is_some() || to.main.is_some();
        std::mem::swap(&mut from.main, &mut to.main);
        if !from.is_empty() {
            self.slots.insert(source, from);
        }
        if !to.is_empty() {
            self.slots.insert(target, to);
        }
        if changed {
            tracing::debug!("Grid: swapped mains of {} and {}", source, target);
        }

        self.debug_check();
        changed
    }

    /// Role a dish dropped onto `key` takes: the side when the slot holds
    /// only a main, the main otherwise (an existing side is kept).
    pub fn drop_role(&self, key: MealSlotKey) -> DishRole {
        match self.get(key) {
            Some(entry) if entry.main.is_some() && entry.side.is_none() => DishRole::Side,
            _ => DishRole::Main,
        }
    }

    /// Takes one leftover portion of `recipe_id` and places it at `key`.
    ///
    /// The new dish has one portion at the serving the leftover was cooked
    /// at. Returns `false` without changes when nothing is banked.
    pub fn consume_leftover_into(&mut self, key: MealSlotKey, recipe_id: RecipeId) -> bool {
        self.place_leftover(key, self.drop_role(key), recipe_id)
    }

    /// Takes one leftover portion of `recipe_id` and places it as the given
    /// role of `key`, overwriting any dish already there.
    pub fn place_leftover(&mut self, key: MealSlotKey, role: DishRole, recipe_id: RecipeId) -> bool {
        let Some(serving) = self.ledger.consume(recipe_id) else {
            tracing::debug!("Grid: no leftovers of recipe {} to place at {}", recipe_id, key);
            return false;
        };

        *self.slots.entry(key).or_default().slot_mut(role) =
            Some(DishAssignment::from_leftover(recipe_id, serving));
        tracing::debug!("Grid: leftover of recipe {} placed as {} at {}", recipe_id, role, key);

        self.debug_check();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealTime;

    const X: RecipeId = RecipeId(10);
    const Y: RecipeId = RecipeId(20);
    const Z: RecipeId = RecipeId(30);

    fn key(day: u32, meal_time: MealTime) -> MealSlotKey {
        MealSlotKey::new(day, meal_time).unwrap()
    }

    fn assert_leftover_invariant(grid: &MealGrid) {
        for (_, entry) in grid.iter() {
            for dish in [&entry.main, &entry.side].into_iter().flatten() {
                if dish.is_leftover {
                    assert!(dish.portion > 1);
                    assert!(!dish.is_from_leftover);
                }
            }
        }
        for (_, entry) in grid.leftovers().iter() {
            assert!(entry.remaining_portions > 0);
        }
    }

    #[test]
    fn test_set_main_defaults() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 1, 1).unwrap();

        let main = grid.dish(k, DishRole::Main).unwrap();
        assert_eq!(main.recipe_id, X);
        assert_eq!(main.portion, 1);
        assert!(!main.is_leftover);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_set_main_rejects_zero_quantities() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        assert_eq!(grid.set_main(k, X, 0, 1), Err(GridError::ZeroQuantity("portion")));
        assert_eq!(grid.set_main(k, X, 1, 0), Err(GridError::ZeroQuantity("serving")));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_set_main_overwrite_keeps_side_and_ledger() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Dinner);
        grid.set_main(k, X, 3, 1).unwrap();
        grid.set_side(k, Z, 1, 1).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();

        grid.set_main(k, Y, 1, 2).unwrap();

        let entry = grid.get(k).unwrap();
        assert_eq!(entry.main.as_ref().unwrap().recipe_id, Y);
        assert_eq!(entry.side.as_ref().unwrap().recipe_id, Z);
        // Leftovers persist by recipe, not by slot
        assert_eq!(grid.leftovers().remaining(X), 2);
    }

    #[test]
    fn test_set_side_requires_main() {
        let mut grid = MealGrid::new();
        let k = key(2, MealTime::Lunch);

        assert_eq!(grid.set_side(k, Z, 1, 1), Ok(false));
        assert!(grid.get(k).is_none());

        grid.set_main(k, X, 1, 1).unwrap();
        assert_eq!(grid.set_side(k, Z, 1, 1), Ok(true));
        assert_eq!(grid.dish(k, DishRole::Side).unwrap().recipe_id, Z);
    }

    #[test]
    fn test_remove_main_keeps_side_only_entry() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Lunch);
        grid.set_main(k, X, 1, 1).unwrap();
        grid.set_side(k, Z, 1, 1).unwrap();

        let removed = grid.remove_main(k).unwrap();
        assert_eq!(removed.recipe_id, X);
        let entry = grid.get(k).unwrap();
        assert!(entry.main.is_none());
        assert_eq!(entry.side.as_ref().unwrap().recipe_id, Z);
    }

    #[test]
    fn test_remove_main_deletes_empty_entry_and_is_idempotent() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Lunch);
        grid.set_main(k, X, 1, 1).unwrap();

        assert!(grid.remove_main(k).is_some());
        let after_once = grid.clone();
        assert!(grid.remove_main(k).is_none());
        assert_eq!(grid, after_once);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_remove_bulk_main_clears_ledger() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Dinner);
        grid.set_main(k, X, 4, 1).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();
        assert_eq!(grid.leftovers().remaining(X), 3);

        grid.remove_main(k);
        assert!(grid.leftovers().get(X).is_none());
    }

    #[test]
    fn test_remove_unbanked_dish_keeps_other_slots_leftovers() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        let other = key(2, MealTime::Dinner);
        grid.set_main(source, X, 3, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        grid.set_main(other, X, 2, 1).unwrap();

        grid.remove_main(other);
        assert_eq!(grid.leftovers().remaining(X), 2);
        assert!(grid.dish(source, DishRole::Main).unwrap().is_leftover);
    }

    #[test]
    fn test_remove_side_keeps_main() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Lunch);
        grid.set_main(k, X, 1, 1).unwrap();
        grid.set_side(k, Z, 1, 1).unwrap();

        assert!(grid.remove_side(k).is_some());
        assert!(grid.remove_side(k).is_none());
        assert_eq!(grid.dish(k, DishRole::Main).unwrap().recipe_id, X);
    }

    #[test]
    fn test_bank_leftovers_records_surplus() {
        // setMain(day1-breakfast, X, portion 3) then flag main as leftover
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 3, 1).unwrap();

        assert_eq!(grid.set_leftover_flag(k, DishRole::Main, true), Ok(true));

        let entry = grid.leftovers().get(X).unwrap();
        assert_eq!(entry.remaining_portions, 2);
        assert_eq!(entry.serving, 1);
        assert!(grid.dish(k, DishRole::Main).unwrap().is_leftover);
    }

    #[test]
    fn test_single_portion_cannot_bank() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 1, 1).unwrap();

        assert_eq!(grid.set_leftover_flag(k, DishRole::Main, true), Ok(false));
        assert!(!grid.dish(k, DishRole::Main).unwrap().is_leftover);
        assert!(grid.leftovers().is_empty());
    }

    #[test]
    fn test_leftover_flag_on_missing_dish_errors() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        assert_eq!(
            grid.set_leftover_flag(k, DishRole::Side, true),
            Err(GridError::NoDish {
                key: k,
                role: DishRole::Side
            })
        );
    }

    #[test]
    fn test_unflag_removes_ledger_entry() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 3, 2).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();

        assert_eq!(grid.set_leftover_flag(k, DishRole::Main, false), Ok(true));
        assert!(grid.leftovers().is_empty());
        assert_eq!(grid.set_leftover_flag(k, DishRole::Main, false), Ok(false));
    }

    #[test]
    fn test_side_banks_leftovers_too() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Dinner);
        grid.set_main(k, X, 1, 1).unwrap();
        grid.set_side(k, Z, 2, 3).unwrap();

        grid.set_leftover_flag(k, DishRole::Side, true).unwrap();
        let entry = grid.leftovers().get(Z).unwrap();
        assert_eq!(entry.remaining_portions, 1);
        assert_eq!(entry.serving, 3);
    }

    #[test]
    fn test_portion_to_one_clears_leftover() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 3, 1).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();

        grid.set_portion(k, DishRole::Main, 1).unwrap();

        let main = grid.dish(k, DishRole::Main).unwrap();
        assert_eq!(main.portion, 1);
        assert!(!main.is_leftover);
        assert!(grid.leftovers().get(X).is_none());
    }

    #[test]
    fn test_portion_change_rewrites_banked_surplus() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 3, 1).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();

        grid.set_portion(k, DishRole::Main, 5).unwrap();
        assert_eq!(grid.leftovers().remaining(X), 4);
    }

    #[test]
    fn test_portion_change_without_flag_leaves_ledger() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        let other = key(2, MealTime::Dinner);
        grid.set_main(source, X, 3, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        grid.consume_leftover_into(other, X);

        grid.set_portion(other, DishRole::Main, 1).unwrap();
        assert_eq!(grid.leftovers().remaining(X), 1);
    }

    #[test]
    fn test_set_serving_does_not_touch_ledger() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Breakfast);
        grid.set_main(k, X, 3, 1).unwrap();
        grid.set_leftover_flag(k, DishRole::Main, true).unwrap();

        grid.set_serving(k, DishRole::Main, 2).unwrap();
        assert_eq!(grid.dish(k, DishRole::Main).unwrap().serving, 2);
        assert_eq!(grid.leftovers().get(X).unwrap().serving, 1);
    }

    #[test]
    fn test_move_to_empty_slot_relocates_entry() {
        let mut grid = MealGrid::new();
        let from = key(1, MealTime::Lunch);
        let to = key(3, MealTime::Dinner);
        grid.set_main(from, X, 2, 3).unwrap();
        grid.set_side(from, Z, 1, 1).unwrap();

        assert!(grid.move_slot(from, to));

        assert!(grid.get(from).is_none());
        let entry = grid.get(to).unwrap();
        let main = entry.main.as_ref().unwrap();
        assert_eq!((main.recipe_id, main.portion, main.serving), (X, 2, 3));
        assert_eq!(entry.side.as_ref().unwrap().recipe_id, Z);
    }

    #[test]
    fn test_move_onto_occupied_slot_swaps_mains() {
        let mut grid = MealGrid::new();
        let day1 = key(1, MealTime::Lunch);
        let day2 = key(2, MealTime::Lunch);
        grid.set_main(day1, X, 2, 1).unwrap();
        grid.set_main(day2, Y, 1, 3).unwrap();
        grid.set_side(day2, Z, 1, 1).unwrap();

        assert!(grid.move_slot(day1, day2));

        let at_day1 = grid.dish(day1, DishRole::Main).unwrap();
        let at_day2 = grid.dish(day2, DishRole::Main).unwrap();
        assert_eq!((at_day1.recipe_id, at_day1.portion, at_day1.serving), (Y, 1, 3));
        assert_eq!((at_day2.recipe_id, at_day2.portion, at_day2.serving), (X, 2, 1));
        // Sides stay put
        assert_eq!(grid.dish(day2, DishRole::Side).unwrap().recipe_id, Z);
        assert!(grid.dish(day1, DishRole::Side).is_none());
    }

    #[test]
    fn test_swap_prunes_emptied_slot() {
        let mut grid = MealGrid::new();
        let side_only = key(1, MealTime::Lunch);
        let target = key(2, MealTime::Lunch);
        grid.set_main(side_only, X, 1, 1).unwrap();
        grid.set_side(side_only, Z, 1, 1).unwrap();
        grid.remove_main(side_only);
        grid.set_main(target, Y, 1, 1).unwrap();

        assert!(grid.move_slot(side_only, target));

        assert_eq!(grid.dish(side_only, DishRole::Main).unwrap().recipe_id, Y);
        assert_eq!(grid.dish(side_only, DishRole::Side).unwrap().recipe_id, Z);
        assert!(grid.get(target).is_none());
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_move_noops() {
        let mut grid = MealGrid::new();
        let k = key(1, MealTime::Lunch);
        grid.set_main(k, X, 1, 1).unwrap();
        let before = grid.clone();

        assert!(!grid.move_slot(k, k));
        assert!(!grid.move_slot(key(5, MealTime::Snack), k));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_consume_leftover_twice_exhausts_entry() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Breakfast);
        grid.set_main(source, X, 3, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();

        assert!(grid.consume_leftover_into(key(2, MealTime::Breakfast), X));
        assert!(grid.consume_leftover_into(key(3, MealTime::Breakfast), X));

        assert!(grid.leftovers().get(X).is_none());
        for day in [2, 3] {
            let main = grid.dish(key(day, MealTime::Breakfast), DishRole::Main).unwrap();
            assert!(main.is_from_leftover);
            assert_eq!(main.portion, 1);
        }
        assert!(!grid.consume_leftover_into(key(4, MealTime::Breakfast), X));
        assert!(grid.get(key(4, MealTime::Breakfast)).is_none());
    }

    #[test]
    fn test_consume_uses_banked_serving() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        grid.set_main(source, X, 2, 3).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();

        let target = key(2, MealTime::Lunch);
        grid.consume_leftover_into(target, X);
        assert_eq!(grid.dish(target, DishRole::Main).unwrap().serving, 3);
    }

    #[test]
    fn test_consume_into_slot_with_main_fills_side() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        let target = key(2, MealTime::Dinner);
        grid.set_main(source, X, 2, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        grid.set_main(target, Y, 1, 1).unwrap();

        assert!(grid.consume_leftover_into(target, X));
        let entry = grid.get(target).unwrap();
        assert_eq!(entry.main.as_ref().unwrap().recipe_id, Y);
        assert!(entry.side.as_ref().unwrap().is_from_leftover);
    }

    #[test]
    fn test_consume_into_full_slot_replaces_main() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        let target = key(2, MealTime::Dinner);
        grid.set_main(source, X, 2, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        grid.set_main(target, Y, 1, 1).unwrap();
        grid.set_side(target, Z, 1, 1).unwrap();

        assert!(grid.consume_leftover_into(target, X));
        let entry = grid.get(target).unwrap();
        assert_eq!(entry.main.as_ref().unwrap().recipe_id, X);
        assert_eq!(entry.side.as_ref().unwrap().recipe_id, Z);
    }

    #[test]
    fn test_consumed_leftover_cannot_be_banked() {
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        let target = key(2, MealTime::Dinner);
        grid.set_main(source, X, 3, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        grid.consume_leftover_into(target, X);
        grid.set_portion(target, DishRole::Main, 3).unwrap();

        assert_eq!(grid.set_leftover_flag(target, DishRole::Main, true), Ok(false));
        assert_leftover_invariant(&grid);
    }

    #[test]
    fn test_leftover_conservation() {
        let portions = 4;
        let mut grid = MealGrid::new();
        let source = key(1, MealTime::Dinner);
        grid.set_main(source, X, portions, 1).unwrap();
        grid.set_leftover_flag(source, DishRole::Main, true).unwrap();
        assert_eq!(grid.leftovers().remaining(X) + 1, portions);

        for (consumed, day) in (2..=4).enumerate() {
            assert!(grid.consume_leftover_into(key(day, MealTime::Dinner), X));
            let placed = grid
                .iter()
                .filter(|(_, e)| e.main.as_ref().is_some_and(|m| m.is_from_leftover))
                .count() as u32;
            assert_eq!(placed, consumed as u32 + 1);
            assert_eq!(grid.leftovers().remaining(X) + 1 + placed, portions);
            assert_leftover_invariant(&grid);
        }
    }

    #[test]
    fn test_records_roundtrip() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Dinner), X, 3, 2).unwrap();
        grid.set_side(key(1, MealTime::Dinner), Z, 1, 1).unwrap();
        grid.set_leftover_flag(key(1, MealTime::Dinner), DishRole::Main, true)
            .unwrap();
        grid.set_main(key(2, MealTime::Breakfast), Y, 1, 1).unwrap();

        let rebuilt = MealGrid::from_records(&grid.to_meals(), &grid.leftover_records()).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Dinner), X, 1, 1).unwrap();
        let mut meals = grid.to_meals();
        meals.push(meals[0].clone());

        assert_eq!(
            MealGrid::from_records(&meals, &[]),
            Err(GridError::DuplicateSlot(key(1, MealTime::Dinner)))
        );
    }

    #[test]
    fn test_from_records_rejects_empty_and_bad_flags() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Dinner), X, 1, 1).unwrap();

        let mut empty = grid.to_meals();
        empty[0].main_recipe_id = None;
        assert_eq!(
            MealGrid::from_records(&empty, &[]),
            Err(GridError::EmptySlot(key(1, MealTime::Dinner)))
        );

        let mut flagged = grid.to_meals();
        flagged[0].main_is_leftover = true;
        assert!(matches!(
            MealGrid::from_records(&flagged, &[]),
            Err(GridError::InvalidLeftoverFlag { .. })
        ));
    }

    #[test]
    fn test_from_plan_rejects_slots_past_last_day() {
        let mut plan = PlanSnapshot::new("Short week", 3);
        plan.meals = vec![PlannedMeal::from_assignment(
            key(5, MealTime::Lunch),
            &MealAssignment::with_main(DishAssignment::new(X)),
        )];
        assert_eq!(
            MealGrid::from_plan(&plan),
            Err(GridError::SlotOutOfRange {
                key: key(5, MealTime::Lunch),
                days: 3
            })
        );

        plan.days = 5;
        assert_eq!(MealGrid::from_plan(&plan).unwrap().len(), 1);
    }

    #[test]
    fn test_from_plan_rejects_zero_days() {
        let plan = PlanSnapshot::new("Nothing", 0);
        assert_eq!(MealGrid::from_plan(&plan), Err(GridError::NoDays));
    }

    #[test]
    fn test_slots_for_day() {
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Dinner), X, 1, 1).unwrap();
        grid.set_main(key(2, MealTime::Breakfast), Y, 1, 1).unwrap();
        grid.set_main(key(2, MealTime::Dinner), Z, 1, 1).unwrap();

        let day2: Vec<MealSlotKey> = grid.slots_for_day(2).map(|(k, _)| k).collect();
        assert_eq!(
            day2,
            vec![key(2, MealTime::Breakfast), key(2, MealTime::Dinner)]
        );
    }
}
