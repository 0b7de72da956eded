//! Recipe catalog file.
//!
//! The catalog is a YAML list of recipes:
//!
//! ```yaml
//! - id: 1
//!   title: Overnight Oats
//!   nutrition: { calories: 320, protein: 14, carbs: 48, fat: 8, fiber: 7 }
//!   ingredient_count: 5
//!   time_estimate: 10
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mealgrid_core::{MemoryCatalog, Recipe, RecipeCatalog, RecipeId, SubstringResolver, TitleResolver};

/// Loads the catalog at `path`. A missing file is an empty catalog.
pub fn load_catalog(path: &Path) -> Result<MemoryCatalog, CatalogError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("No recipe catalog at {}", path.display());
            return Ok(MemoryCatalog::default());
        }
        Err(e) => return Err(CatalogError::ReadError(path.to_path_buf(), e)),
    };

    if contents.trim().is_empty() {
        return Ok(MemoryCatalog::default());
    }
    let recipes: Vec<Recipe> = serde_yaml::from_str(&contents)
        .map_err(|e| CatalogError::ParseError(path.to_path_buf(), e))?;

    let mut seen = HashSet::new();
    for recipe in &recipes {
        if !seen.insert(recipe.id) {
            return Err(CatalogError::DuplicateId(path.to_path_buf(), recipe.id));
        }
    }

    tracing::debug!("Loaded {} recipe(s) from {}", recipes.len(), path.display());
    Ok(MemoryCatalog::new(recipes))
}

/// Resolves a recipe argument given as an id or as a title.
pub fn find_recipe<'a>(catalog: &'a MemoryCatalog, reference: &str) -> Result<&'a Recipe, String> {
    let found = match reference.parse::<RecipeId>() {
        Ok(id) => catalog.get(id),
        Err(_) => SubstringResolver::new(catalog)
            .resolve(reference)
            .and_then(|id| catalog.get(id)),
    };
    found.ok_or_else(|| format!("Recipe not found: {}", reference))
}

#[derive(Debug)]
pub enum CatalogError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    DuplicateId(PathBuf, RecipeId),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::ReadError(path, e) => {
                write!(f, "Failed to read catalog '{}': {}", path.display(), e)
            }
            CatalogError::ParseError(path, e) => {
                write!(f, "Failed to parse catalog '{}': {}", path.display(), e)
            }
            CatalogError::DuplicateId(path, id) => {
                write!(f, "Recipe id {} appears twice in '{}'", id, path.display())
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::ReadError(_, e) => Some(e),
            CatalogError::ParseError(_, e) => Some(e),
            CatalogError::DuplicateId(_, _) => None,
        }
    }
}
