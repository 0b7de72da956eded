//! Drag-and-drop reconciliation.
//!
//! A gesture starts on one of three sources (a catalog recipe, an existing
//! slot, a banked leftover) and ends on a slot. Payloads travel as strings:
//!
//! - `catalog:<recipe id>`
//! - `leftover:<recipe id>`
//! - `slot:<day>-<meal time>`
//!
//! Gestures are best-effort. A payload or target that cannot be parsed is
//! dropped without touching the grid and without surfacing an error.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::grid::MealGrid;
use crate::models::{DishRole, MealSlotKey, RecipeId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized drag payload '{0}'")]
pub struct PayloadError(pub String);

/// Where a dragged item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Catalog(RecipeId),
    Slot(MealSlotKey),
    Leftover(RecipeId),
}

impl fmt::Display for DragSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragSource::Catalog(id) => write!(f, "catalog:{}", id),
            DragSource::Slot(key) => write!(f, "slot:{}", key),
            DragSource::Leftover(id) => write!(f, "leftover:{}", id),
        }
    }
}

impl FromStr for DragSource {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PayloadError(s.to_string());
        let (kind, value) = s.trim().split_once(':').ok_or_else(malformed)?;

        match kind {
            "catalog" => value.parse().map(DragSource::Catalog).map_err(|_| malformed()),
            "leftover" => value.parse().map(DragSource::Leftover).map_err(|_| malformed()),
            "slot" => value.parse().map(DragSource::Slot).map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }
}

/// Parses a drop target id, `slot:<day>-<meal time>` or a bare slot key.
pub fn parse_drop_target(s: &str) -> Result<MealSlotKey, PayloadError> {
    let trimmed = s.trim();
    let key = trimmed.strip_prefix("slot:").unwrap_or(trimmed);
    key.parse().map_err(|_| PayloadError(s.to_string()))
}

/// What a drop did to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// A catalog recipe became the slot's main
    PlacedMain,
    /// A catalog recipe became the slot's side
    PlacedSide,
    /// A leftover portion was placed in the given role
    ConsumedLeftover(DishRole),
    /// A slot's contents moved to an empty slot
    Moved,
    /// Two slots swapped mains
    Swapped,
    /// Nothing changed
    Ignored,
}

impl DropOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, DropOutcome::Ignored)
    }
}

/// Applies a completed drop to the grid.
pub fn reconcile(grid: &mut MealGrid, source: DragSource, target: MealSlotKey) -> DropOutcome {
    let outcome = match source {
        DragSource::Slot(origin) => {
            let occupied = grid.get(target).is_some();
            if !grid.move_slot(origin, target) {
                DropOutcome::Ignored
            } else if occupied {
                DropOutcome::Swapped
            } else {
                DropOutcome::Moved
            }
        }
        DragSource::Catalog(recipe_id) => match grid.drop_role(target) {
            DishRole::Main => match grid.set_main(target, recipe_id, 1, 1) {
                Ok(()) => DropOutcome::PlacedMain,
                Err(_) => DropOutcome::Ignored,
            },
            DishRole::Side => match grid.set_side(target, recipe_id, 1, 1) {
                Ok(true) => DropOutcome::PlacedSide,
                _ => DropOutcome::Ignored,
            },
        },
        DragSource::Leftover(recipe_id) => {
            let role = grid.drop_role(target);
            if grid.consume_leftover_into(target, recipe_id) {
                DropOutcome::ConsumedLeftover(role)
            } else {
                DropOutcome::Ignored
            }
        }
    };
    tracing::debug!("Drop {} on {}: {:?}", source, target, outcome);
    outcome
}

/// Per-gesture state: idle, or dragging a captured source.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    dragging: Option<DragSource>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the origin of a drag. An unparseable payload leaves the
    /// tracker idle and returns `false`.
    pub fn start(&mut self, payload: &str) -> bool {
        match payload.parse::<DragSource>() {
            Ok(source) => {
                self.dragging = Some(source);
                true
            }
            Err(e) => {
                tracing::debug!("Ignoring drag start: {}", e);
                self.dragging = None;
                false
            }
        }
    }

    /// Ends the gesture over `target`, returning the source and target slot
    /// when both are valid. The tracker is idle afterwards either way.
    pub fn drop_on(&mut self, target: &str) -> Option<(DragSource, MealSlotKey)> {
        let source = self.dragging.take()?;
        match parse_drop_target(target) {
            Ok(key) => Some((source, key)),
            Err(e) => {
                tracing::debug!("Ignoring drop: {}", e);
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
    }

    pub fn active(&self) -> Option<DragSource> {
        self.dragging
    }
}
