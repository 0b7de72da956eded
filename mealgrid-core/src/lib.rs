//! Mealgrid Core Library
//!
//! Meal-plan grid state engine: slot assignments, leftover bookkeeping,
//! drag-and-drop reconciliation, suggestion previews and undo/redo.

pub mod catalog;
pub mod gesture;
pub mod grid;
pub mod history;
pub mod ledger;
pub mod models;
pub mod nutrition;
pub mod preview;
pub mod session;
pub mod storage;
pub mod suggestion;

pub use catalog::{MemoryCatalog, RecipeCatalog, SubstringResolver, TitleResolver};
pub use gesture::{DragSource, DropOutcome, GestureTracker, PayloadError};
pub use grid::{GridError, MealGrid};
pub use history::{History, DEFAULT_MAX_DEPTH};
pub use ledger::{LeftoverEntry, LeftoverLedger};
pub use models::{
    DishAssignment, DishRole, LeftoverRecord, MealAssignment, MealSlotKey, MealTime,
    NutritionFacts, PlanSnapshot, PlannedMeal, Recipe, RecipeId, SlotKeyError,
};
pub use preview::{
    ApplyReport, PreviewController, PreviewError, PreviewItem, PreviewSet, PreviewState,
    Resolution,
};
pub use session::{PlanSession, ReceiveOutcome, SessionError, SlotView};
pub use storage::{FilePlanStore, MemoryPlanStore, PlanStore, StorageError};
pub use suggestion::{
    AvailableRecipe, RequestTicket, SuggestedMeal, SuggestionError, SuggestionGate,
    SuggestionRequest, SuggestionResponse,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
