//! Suggestion preview workflow.
//!
//! A suggestion is first shown as an overlay on top of the plan. While the
//! overlay is up the plan is read-only. It then either gets applied (merged
//! into the grid) or discarded (the grid goes back to the copy saved when
//! the preview began).
//!
//! ```text
//! Idle --begin--> Previewing --apply----> Idle
//!                            --discard--> Idle
//! ```

use thiserror::Error;

use crate::grid::{GridError, MealGrid};
use crate::models::{DishRole, MealSlotKey, RecipeId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("A suggestion is already being previewed")]
    AlreadyPreviewing,

    #[error("No suggestion is being previewed")]
    NotPreviewing,

    #[error("None of the suggested recipes could be found in the catalog")]
    NothingResolved,

    #[error("Preview has no item {0}")]
    NoSuchItem(usize),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Outcome of matching a suggested title against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(RecipeId),
    Unresolved,
}

/// One suggested meal, ready to be overlaid on its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub key: MealSlotKey,
    /// Title as suggested, kept for display
    pub title: String,
    pub recipe: Resolution,
    pub portion: u32,
    pub serving: u32,
    pub has_leftover: bool,
    pub is_from_leftover: bool,
}

impl PreviewItem {
    /// A single-portion, single-serving suggestion.
    pub fn new(key: MealSlotKey, title: impl Into<String>, recipe: Resolution) -> Self {
        Self {
            key,
            title: title.into(),
            recipe,
            portion: 1,
            serving: 1,
            has_leftover: false,
            is_from_leftover: false,
        }
    }

    pub fn recipe_id(&self) -> Option<RecipeId> {
        match self.recipe {
            Resolution::Resolved(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.recipe_id().is_some()
    }
}

/// The overlay of a pending suggestion and the grid to roll back to.
#[derive(Debug, Clone)]
pub struct PreviewSet {
    items: Vec<PreviewItem>,
    summary: String,
    rollback: MealGrid,
}

impl PreviewSet {
    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn rollback(&self) -> &MealGrid {
        &self.rollback
    }

    /// Items whose title did not match a catalog recipe, with their index.
    pub fn unresolved(&self) -> impl Iterator<Item = (usize, &PreviewItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_resolved())
    }
}

#[derive(Debug, Clone, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Previewing(PreviewSet),
}

/// What `apply` merged and what it had to leave out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<MealSlotKey>,
    pub unresolved: Vec<PreviewItem>,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewController {
    state: PreviewState,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PreviewState::Previewing(_))
    }

    pub fn current(&self) -> Option<&PreviewSet> {
        match &self.state {
            PreviewState::Previewing(set) => Some(set),
            PreviewState::Idle => None,
        }
    }

    /// Starts previewing `items`, saving `rollback` as the grid to restore
    /// on discard.
    pub fn begin(
        &mut self,
        items: Vec<PreviewItem>,
        summary: impl Into<String>,
        rollback: MealGrid,
    ) -> Result<(), PreviewError> {
        if self.is_active() {
            return Err(PreviewError::AlreadyPreviewing);
        }
        tracing::debug!("Preview started with {} item(s)", items.len());
        self.state = PreviewState::Previewing(PreviewSet {
            items,
            summary: summary.into(),
            rollback,
        });
        Ok(())
    }

    /// The suggestion shown over `key`. When several items target the same
    /// slot the last one wins, matching the order `apply` merges them in.
    pub fn overlay_for(&self, key: MealSlotKey) -> Option<&PreviewItem> {
        self.current()?.items.iter().rev().find(|item| item.key == key)
    }

    /// Points item `index` at a recipe picked by the user.
    pub fn resolve_item(&mut self, index: usize, recipe_id: RecipeId) -> Result<(), PreviewError> {
        let PreviewState::Previewing(set) = &mut self.state else {
            return Err(PreviewError::NotPreviewing);
        };
        let item = set
            .items
            .get_mut(index)
            .ok_or(PreviewError::NoSuchItem(index))?;
        item.recipe = Resolution::Resolved(recipe_id);
        Ok(())
    }

    /// Merges every resolved item into `grid` as the main of its slot and
    /// ends the preview.
    ///
    /// Unresolved items are left out and returned in the report. When no
    /// item is resolved the grid is untouched and the preview stays active.
    /// The merge happens on a copy, so `grid` either receives every resolved
    /// item or none.
    pub fn apply(&mut self, grid: &mut MealGrid) -> Result<ApplyReport, PreviewError> {
        let PreviewState::Previewing(set) = &self.state else {
            return Err(PreviewError::NotPreviewing);
        };
        if !set.items.iter().any(PreviewItem::is_resolved) {
            return Err(PreviewError::NothingResolved);
        }

        let mut merged = grid.clone();
        let mut report = ApplyReport {
            applied: Vec::new(),
            unresolved: Vec::new(),
        };
        for item in &set.items {
            let Some(recipe_id) = item.recipe_id() else {
                report.unresolved.push(item.clone());
                continue;
            };
            merge_item(&mut merged, item, recipe_id)?;
            report.applied.push(item.key);
        }

        *grid = merged;
        self.state = PreviewState::Idle;
        tracing::debug!(
            "Preview applied: {} merged, {} unresolved",
            report.applied.len(),
            report.unresolved.len()
        );
        Ok(report)
    }

    /// Ends the preview and hands back the grid saved when it began.
    pub fn discard(&mut self) -> Result<MealGrid, PreviewError> {
        match std::mem::take(&mut self.state) {
            PreviewState::Previewing(set) => {
                tracing::debug!("Preview discarded");
                Ok(set.rollback)
            }
            PreviewState::Idle => Err(PreviewError::NotPreviewing),
        }
    }
}

fn merge_item(grid: &mut MealGrid, item: &PreviewItem, recipe_id: RecipeId) -> Result<(), GridError> {
    if item.is_from_leftover && grid.place_leftover(item.key, DishRole::Main, recipe_id) {
        return Ok(());
    }

    let portion = item.portion.max(1);
    grid.set_main(item.key, recipe_id, portion, item.serving.max(1))?;
    if item.has_leftover && portion > 1 {
        grid.set_leftover_flag(item.key, DishRole::Main, true)?;
    }
    Ok(())
}
