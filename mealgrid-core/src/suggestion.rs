//! Suggestion service contract and single-flight request gate.
//!
//! The service turns a free-text request plus the current plan into a list
//! of proposed meals. Only one request may be outstanding; every request
//! gets a ticket, and a response is accepted only for the ticket still
//! outstanding. Responses for cancelled or replaced requests are stale and
//! must be dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{RecipeCatalog, TitleResolver};
use crate::models::{MealSlotKey, MealTime, PlanSnapshot, RecipeId};
use crate::preview::{PreviewItem, Resolution};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("A suggestion request is already in flight")]
    RequestInFlight,

    #[error("Apply or discard the current preview before asking for another suggestion")]
    PreviewActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableRecipe {
    pub id: RecipeId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub text: String,
    pub plan: PlanSnapshot,
    pub available_recipes: Vec<AvailableRecipe>,
}

impl SuggestionRequest {
    /// Builds a request offering the plan's picked recipes, or the whole
    /// catalog when the plan has not picked any. Picked ids missing from the
    /// catalog are left out.
    pub fn new<C: RecipeCatalog + ?Sized>(
        text: impl Into<String>,
        plan: PlanSnapshot,
        catalog: &C,
    ) -> Self {
        let available_recipes = if plan.recipe_ids.is_empty() {
            catalog
                .recipes()
                .into_iter()
                .map(|r| AvailableRecipe {
                    id: r.id,
                    title: r.title.clone(),
                })
                .collect()
        } else {
            plan.recipe_ids
                .iter()
                .filter_map(|id| catalog.get(*id))
                .map(|r| AvailableRecipe {
                    id: r.id,
                    title: r.title.clone(),
                })
                .collect()
        };

        Self {
            text: text.into(),
            plan,
            available_recipes,
        }
    }
}

/// One meal proposed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMeal {
    pub day: u32,
    pub meal_time: MealTime,
    pub recipe_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_leftover: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_from_leftover: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    #[serde(default)]
    pub summary_text: String,
    #[serde(default)]
    pub suggested_meals: Vec<SuggestedMeal>,
}

impl SuggestionResponse {
    /// Turns the suggested meals into preview items for a plan of `days`
    /// days, resolving titles through `resolver`.
    ///
    /// Meals on day 0 or past the end of the plan are dropped with a
    /// warning. A missing or zero portion/serving becomes 1.
    pub fn preview_items(&self, days: u32, resolver: &dyn TitleResolver) -> Vec<PreviewItem> {
        self.suggested_meals
            .iter()
            .filter_map(|meal| {
                let key = match MealSlotKey::new(meal.day, meal.meal_time) {
                    Ok(key) if meal.day <= days => key,
                    _ => {
                        tracing::warn!(
                            "Dropping suggestion for day {} {}: plan has {} day(s)",
                            meal.day,
                            meal.meal_time,
                            days
                        );
                        return None;
                    }
                };

                let recipe = match resolver.resolve(&meal.recipe_title) {
                    Some(id) => Resolution::Resolved(id),
                    None => {
                        tracing::debug!("Suggested recipe '{}' not found", meal.recipe_title);
                        Resolution::Unresolved
                    }
                };

                Some(PreviewItem {
                    key,
                    title: meal.recipe_title.clone(),
                    recipe,
                    portion: meal.portion.filter(|p| *p > 0).unwrap_or(1),
                    serving: meal.serving.filter(|s| *s > 0).unwrap_or(1),
                    has_leftover: meal.has_leftover.unwrap_or(false),
                    is_from_leftover: meal.is_from_leftover.unwrap_or(false),
                })
            })
            .collect()
    }
}

/// Identifies one suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn number(&self) -> u64 {
        self.0
    }
}

/// Allows one outstanding suggestion request at a time.
#[derive(Debug, Clone, Default)]
pub struct SuggestionGate {
    issued: u64,
    in_flight: Option<RequestTicket>,
}

impl SuggestionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for a new request.
    pub fn start(&mut self) -> Result<RequestTicket, SuggestionError> {
        if self.in_flight.is_some() {
            return Err(SuggestionError::RequestInFlight);
        }
        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Closes the request if `ticket` is the outstanding one. Returns
    /// `false` for stale tickets, leaving the gate unchanged.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Abandons the outstanding request; its response will be stale.
    pub fn cancel(&mut self) -> Option<RequestTicket> {
        self.in_flight.take()
    }

    pub fn in_flight(&self) -> Option<RequestTicket> {
        self.in_flight
    }
}
