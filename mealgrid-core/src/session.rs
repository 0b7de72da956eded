//! Plan editing session.
//!
//! A `PlanSession` owns one plan while it is being edited: the grid, its
//! undo history, the suggestion preview, the drag tracker and the request
//! gate. Every committed edit pushes exactly one history snapshot and writes
//! the full plan back to the store. Writes are fire-and-forget: a failed
//! save is logged and the session carries on.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{RecipeCatalog, TitleResolver};
use crate::gesture::{reconcile, DropOutcome, GestureTracker};
use crate::grid::{GridError, MealGrid};
use crate::history::History;
use crate::models::{
    DishAssignment, DishRole, MealAssignment, MealSlotKey, NutritionFacts, PlanSnapshot, RecipeId,
};
use crate::nutrition;
use crate::preview::{ApplyReport, PreviewController, PreviewError, PreviewItem, PreviewSet};
use crate::storage::{PlanStore, StorageError};
use crate::suggestion::{
    RequestTicket, SuggestionError, SuggestionGate, SuggestionRequest, SuggestionResponse,
};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Plan is read-only while a suggestion is being previewed")]
    ReadOnly,

    #[error("Day {day} is outside the plan ({days} day(s))")]
    DayOutOfRange { day: u32, days: u32 },

    #[error("Plan not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What happened to a suggestion response handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The preview is up with this many items, some possibly unresolved
    Previewing { items: usize, unresolved: usize },
    /// The response proposed nothing usable for this plan
    Empty,
    /// The response belongs to a cancelled or replaced request
    Stale,
}

/// A slot as it should be rendered: the real content plus any suggestion
/// overlaid on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView<'a> {
    pub assignment: Option<&'a MealAssignment>,
    pub suggestion: Option<&'a PreviewItem>,
}

pub struct PlanSession {
    plan: PlanSnapshot,
    grid: MealGrid,
    history: History<MealGrid>,
    preview: PreviewController,
    gestures: GestureTracker,
    gate: SuggestionGate,
    store: Box<dyn PlanStore>,
}

impl PlanSession {
    /// Starts a session on `plan`. The history begins at the loaded grid.
    pub fn open(
        plan: PlanSnapshot,
        store: Box<dyn PlanStore>,
        history_depth: usize,
    ) -> Result<Self, SessionError> {
        let grid = MealGrid::from_plan(&plan)?;
        tracing::info!("Opened plan {} ({} slot(s))", plan.id, grid.len());

        Ok(Self {
            history: History::new(grid.clone(), history_depth),
            plan,
            grid,
            preview: PreviewController::new(),
            gestures: GestureTracker::new(),
            gate: SuggestionGate::new(),
            store,
        })
    }

    /// Loads plan `id` from `store` and opens it.
    pub fn load(
        id: &Uuid,
        store: Box<dyn PlanStore>,
        history_depth: usize,
    ) -> Result<Self, SessionError> {
        let plan = store.load(id)?.ok_or(SessionError::NotFound(*id))?;
        Self::open(plan, store, history_depth)
    }

    pub fn id(&self) -> Uuid {
        self.plan.id
    }

    pub fn days(&self) -> u32 {
        self.plan.days
    }

    pub fn grid(&self) -> &MealGrid {
        &self.grid
    }

    pub fn history(&self) -> &History<MealGrid> {
        &self.history
    }

    /// The full plan as it would be written to the store.
    pub fn snapshot(&self) -> PlanSnapshot {
        let mut plan = self.plan.clone();
        plan.meals = self.grid.to_meals();
        plan.leftovers = self.grid.leftover_records();
        plan
    }

    pub fn view(&self, key: MealSlotKey) -> SlotView<'_> {
        SlotView {
            assignment: self.grid.get(key),
            suggestion: self.preview.overlay_for(key),
        }
    }

    pub fn day_totals<C: RecipeCatalog + ?Sized>(&self, catalog: &C, day: u32) -> NutritionFacts {
        nutrition::day_totals(&self.grid, catalog, day)
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_active()
    }

    pub fn preview(&self) -> Option<&PreviewSet> {
        self.preview.current()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.snapshot()) {
            tracing::warn!("Failed to save plan {}: {}", self.plan.id, e);
        }
    }

    fn commit(&mut self) {
        self.history.push(self.grid.clone());
        self.plan.updated_at = Utc::now();
        self.persist();
    }

    fn check_editable(&self, keys: &[MealSlotKey]) -> Result<(), SessionError> {
        if self.preview.is_active() {
            return Err(SessionError::ReadOnly);
        }
        for key in keys {
            if key.day() > self.plan.days {
                return Err(SessionError::DayOutOfRange {
                    day: key.day(),
                    days: self.plan.days,
                });
            }
        }
        Ok(())
    }

    /// Runs one grid operation as an edit, committing only when the grid
    /// actually changed.
    fn edit<T>(
        &mut self,
        keys: &[MealSlotKey],
        op: impl FnOnce(&mut MealGrid) -> Result<T, GridError>,
    ) -> Result<T, SessionError> {
        self.check_editable(keys)?;
        let before = self.grid.clone();
        let result = op(&mut self.grid)?;
        if self.grid != before {
            self.commit();
        }
        Ok(result)
    }

    pub fn set_main(
        &mut self,
        key: MealSlotKey,
        recipe_id: RecipeId,
        portion: u32,
        serving: u32,
    ) -> Result<(), SessionError> {
        self.edit(&[key], |grid| grid.set_main(key, recipe_id, portion, serving))
    }

    /// Returns `false` when the slot has no main to pair the side with.
    pub fn set_side(
        &mut self,
        key: MealSlotKey,
        recipe_id: RecipeId,
        portion: u32,
        serving: u32,
    ) -> Result<bool, SessionError> {
        self.edit(&[key], |grid| grid.set_side(key, recipe_id, portion, serving))
    }

    pub fn remove_main(&mut self, key: MealSlotKey) -> Result<Option<DishAssignment>, SessionError> {
        self.edit(&[key], |grid| Ok(grid.remove_main(key)))
    }

    pub fn remove_side(&mut self, key: MealSlotKey) -> Result<Option<DishAssignment>, SessionError> {
        self.edit(&[key], |grid| Ok(grid.remove_side(key)))
    }

    pub fn set_leftover_flag(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        enabled: bool,
    ) -> Result<bool, SessionError> {
        self.edit(&[key], |grid| grid.set_leftover_flag(key, role, enabled))
    }

    pub fn set_portion(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        portion: u32,
    ) -> Result<(), SessionError> {
        self.edit(&[key], |grid| grid.set_portion(key, role, portion))
    }

    pub fn set_serving(
        &mut self,
        key: MealSlotKey,
        role: DishRole,
        serving: u32,
    ) -> Result<(), SessionError> {
        self.edit(&[key], |grid| grid.set_serving(key, role, serving))
    }

    pub fn move_slot(&mut self, source: MealSlotKey, target: MealSlotKey) -> Result<bool, SessionError> {
        self.edit(&[source, target], |grid| Ok(grid.move_slot(source, target)))
    }

    pub fn consume_leftover(
        &mut self,
        key: MealSlotKey,
        recipe_id: RecipeId,
    ) -> Result<bool, SessionError> {
        self.edit(&[key], |grid| Ok(grid.consume_leftover_into(key, recipe_id)))
    }

    /// Starts a drag from `payload`. Returns `false` when the payload is
    /// malformed or the plan is read-only.
    pub fn begin_drag(&mut self, payload: &str) -> bool {
        if self.preview.is_active() {
            tracing::debug!("Ignoring drag start during preview");
            self.gestures.cancel();
            return false;
        }
        self.gestures.start(payload)
    }

    /// Ends the current drag over `target`. Anything that cannot be
    /// reconciled is ignored without an error.
    pub fn drop_on(&mut self, target: &str) -> DropOutcome {
        let Some((source, key)) = self.gestures.drop_on(target) else {
            return DropOutcome::Ignored;
        };
        if let Err(e) = self.check_editable(&[key]) {
            tracing::debug!("Ignoring drop of {} on {}: {}", source, key, e);
            return DropOutcome::Ignored;
        }

        let outcome = reconcile(&mut self.grid, source, key);
        if outcome.changed() {
            self.commit();
        }
        outcome
    }

    pub fn cancel_drag(&mut self) {
        self.gestures.cancel();
    }

    /// A whole gesture in one call.
    pub fn drag_and_drop(&mut self, source: &str, target: &str) -> DropOutcome {
        if !self.begin_drag(source) {
            return DropOutcome::Ignored;
        }
        self.drop_on(target)
    }

    /// Steps back one edit. Returns `false` at the start of history.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        self.check_editable(&[])?;
        let Some(previous) = self.history.undo() else {
            return Ok(false);
        };
        self.grid = previous.clone();
        self.plan.updated_at = Utc::now();
        tracing::info!("Undo on plan {}", self.plan.id);
        self.persist();
        Ok(true)
    }

    /// Re-applies an undone edit. Returns `false` when there is none.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        self.check_editable(&[])?;
        let Some(next) = self.history.redo() else {
            return Ok(false);
        };
        self.grid = next.clone();
        self.plan.updated_at = Utc::now();
        tracing::info!("Redo on plan {}", self.plan.id);
        self.persist();
        Ok(true)
    }

    /// Opens a suggestion request for `text`, returning its ticket and the
    /// payload to send to the service.
    pub fn request_suggestion<C: RecipeCatalog + ?Sized>(
        &mut self,
        text: &str,
        catalog: &C,
    ) -> Result<(RequestTicket, SuggestionRequest), SessionError> {
        if self.preview.is_active() {
            return Err(SuggestionError::PreviewActive.into());
        }
        let ticket = self.gate.start()?;
        tracing::info!("Suggestion request {} opened", ticket.number());
        Ok((ticket, SuggestionRequest::new(text, self.snapshot(), catalog)))
    }

    /// Hands a service response to the session. Responses for a ticket that
    /// is no longer outstanding are dropped.
    pub fn receive_suggestion(
        &mut self,
        ticket: RequestTicket,
        response: &SuggestionResponse,
        resolver: &dyn TitleResolver,
    ) -> Result<ReceiveOutcome, SessionError> {
        if !self.gate.accept(ticket) {
            tracing::warn!("Dropping stale suggestion response {}", ticket.number());
            return Ok(ReceiveOutcome::Stale);
        }

        let items = response.preview_items(self.plan.days, resolver);
        if items.is_empty() {
            tracing::info!("Suggestion {} proposed no usable meals", ticket.number());
            return Ok(ReceiveOutcome::Empty);
        }

        let count = items.len();
        let unresolved = items.iter().filter(|item| !item.is_resolved()).count();
        self.preview
            .begin(items, response.summary_text.clone(), self.grid.clone())?;
        tracing::info!(
            "Previewing suggestion {}: {} item(s), {} unresolved",
            ticket.number(),
            count,
            unresolved
        );
        Ok(ReceiveOutcome::Previewing {
            items: count,
            unresolved,
        })
    }

    /// Abandons the outstanding request, if any.
    pub fn cancel_suggestion(&mut self) -> bool {
        match self.gate.cancel() {
            Some(ticket) => {
                tracing::info!("Suggestion request {} cancelled", ticket.number());
                true
            }
            None => false,
        }
    }

    pub fn resolve_preview_item(&mut self, index: usize, recipe_id: RecipeId) -> Result<(), SessionError> {
        Ok(self.preview.resolve_item(index, recipe_id)?)
    }

    /// Merges the previewed suggestion as one history entry.
    pub fn apply_preview(&mut self) -> Result<ApplyReport, SessionError> {
        let report = self.preview.apply(&mut self.grid)?;
        tracing::info!(
            "Applied suggestion to plan {}: {} meal(s)",
            self.plan.id,
            report.applied.len()
        );
        self.commit();
        Ok(report)
    }

    /// Drops the previewed suggestion and restores the pre-preview grid.
    /// History is not touched.
    pub fn discard_preview(&mut self) -> Result<(), SessionError> {
        self.grid = self.preview.discard()?;
        tracing::info!("Discarded suggestion for plan {}", self.plan.id);
        Ok(())
    }
}
