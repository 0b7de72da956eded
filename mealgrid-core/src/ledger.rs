//! Leftover ledger.
//!
//! Tracks, per recipe, how many unconsumed portions remain from bulk cooking
//! and the serving multiplier they were cooked at. An entry with zero
//! remaining portions never exists: consuming the last portion removes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{LeftoverRecord, RecipeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverEntry {
    pub remaining_portions: u32,
    pub serving: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeftoverLedger {
    entries: BTreeMap<RecipeId, LeftoverEntry>,
}

impl LeftoverLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `recipe_id`.
    ///
    /// Recording zero portions removes the entry instead.
    pub fn record_leftover(&mut self, recipe_id: RecipeId, portions: u32, serving: u32) {
        if portions == 0 {
            self.remove(recipe_id);
            return;
        }
        tracing::debug!(
            "Ledger: recipe {} banks {} portion(s) at serving {}",
            recipe_id,
            portions,
            serving
        );
        self.entries.insert(
            recipe_id,
            LeftoverEntry {
                remaining_portions: portions,
                serving,
            },
        );
    }

    /// Takes one portion and returns the serving it was cooked at.
    ///
    /// Returns `None` when nothing is banked for `recipe_id`.
    pub fn consume(&mut self, recipe_id: RecipeId) -> Option<u32> {
        let entry = self.entries.get_mut(&recipe_id)?;
        let serving = entry.serving;
        entry.remaining_portions -= 1;
        if entry.remaining_portions == 0 {
            self.entries.remove(&recipe_id);
            tracing::debug!("Ledger: last portion of recipe {} consumed", recipe_id);
        }
        Some(serving)
    }

    pub fn remove(&mut self, recipe_id: RecipeId) -> Option<LeftoverEntry> {
        let removed = self.entries.remove(&recipe_id);
        if removed.is_some() {
            tracing::debug!("Ledger: removed leftovers of recipe {}", recipe_id);
        }
        removed
    }

    pub fn get(&self, recipe_id: RecipeId) -> Option<&LeftoverEntry> {
        self.entries.get(&recipe_id)
    }

    pub fn remaining(&self, recipe_id: RecipeId) -> u32 {
        self.get(recipe_id).map_or(0, |e| e.remaining_portions)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecipeId, &LeftoverEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_records(&self) -> Vec<LeftoverRecord> {
        self.iter()
            .map(|(recipe_id, entry)| LeftoverRecord {
                recipe_id,
                remaining_portions: entry.remaining_portions,
                serving: entry.serving,
            })
            .collect()
    }

    /// Rebuilds a ledger from persisted records. Records with zero portions
    /// are skipped; a later record for the same recipe wins.
    pub fn from_records(records: &[LeftoverRecord]) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.record_leftover(record.recipe_id, record.remaining_portions, record.serving);
        }
        ledger
    }
}
