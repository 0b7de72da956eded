//! Recipe catalog lookup and free-text title resolution.
//!
//! The catalog is read-only to the engine. Title resolution turns a
//! suggested recipe title into a catalog id and is kept behind
//! `TitleResolver` so the matching strategy can change without touching the
//! grid.

use std::collections::BTreeMap;

use crate::models::{Recipe, RecipeId};

pub trait RecipeCatalog {
    fn get(&self, id: RecipeId) -> Option<&Recipe>;

    /// All recipes, ordered by id.
    fn recipes(&self) -> Vec<&Recipe>;
}

/// Catalog held in memory, ordered by recipe id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl MemoryCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        recipes.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl FromIterator<Recipe> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        Self {
            recipes: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

impl RecipeCatalog for MemoryCatalog {
    fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    fn recipes(&self) -> Vec<&Recipe> {
        self.recipes.values().collect()
    }
}

pub trait TitleResolver {
    fn resolve(&self, title: &str) -> Option<RecipeId>;
}

/// Case-insensitive best-effort matcher.
///
/// Tries, in order: an exact title match, a catalog title containing the
/// query, the query containing a catalog title. Within a tier the lowest id
/// wins. Blank titles never resolve.
pub struct SubstringResolver<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C: RecipeCatalog + ?Sized> SubstringResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }
}

impl<C: RecipeCatalog + ?Sized> TitleResolver for SubstringResolver<'_, C> {
    fn resolve(&self, title: &str) -> Option<RecipeId> {
        let query = title.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let titles: Vec<(RecipeId, String)> = self
            .catalog
            .recipes()
            .into_iter()
            .map(|r| (r.id, r.title.trim().to_lowercase()))
            .filter(|(_, t)| !t.is_empty())
            .collect();

        let find = |matches: &dyn Fn(&str) -> bool| {
            titles
                .iter()
                .find(|(_, t)| matches(t.as_str()))
                .map(|(id, _)| *id)
        };

        find(&|t: &str| t == query)
            .or_else(|| find(&|t: &str| t.contains(query.as_str())))
            .or_else(|| find(&|t: &str| query.contains(t)))
    }
}
