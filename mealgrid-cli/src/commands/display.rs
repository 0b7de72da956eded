//! Text rendering shared by the plan and edit commands.

use std::io::{self, Write};

use mealgrid_core::{
    DishAssignment, LeftoverLedger, MealSlotKey, MealTime, PreviewItem, RecipeCatalog, RecipeId,
    Resolution, SlotView,
};

pub fn recipe_title(catalog: &dyn RecipeCatalog, id: RecipeId) -> String {
    catalog
        .get(id)
        .map(|r| r.title.clone())
        .unwrap_or_else(|| format!("Recipe #{}", id))
}

pub fn describe_dish(catalog: &dyn RecipeCatalog, dish: &DishAssignment) -> String {
    let mut text = format!(
        "{} x{} (serving {})",
        recipe_title(catalog, dish.recipe_id),
        dish.portion,
        dish.serving
    );
    if dish.is_leftover {
        text.push_str(&format!(" [banks {} leftover(s)]", dish.surplus()));
    }
    if dish.is_from_leftover {
        text.push_str(" [leftover]");
    }
    text
}

fn describe_suggestion(item: &PreviewItem) -> String {
    match item.recipe {
        Resolution::Resolved(id) => format!("{} (#{})", item.title, id),
        Resolution::Unresolved => format!("{} (not found)", item.title),
    }
}

/// Writes every day of the plan, one line per filled or suggested slot.
pub fn write_grid<'a, W: Write>(
    out: &mut W,
    days: u32,
    catalog: &dyn RecipeCatalog,
    view: impl Fn(MealSlotKey) -> SlotView<'a>,
) -> io::Result<()> {
    for day in 1..=days {
        let header = format!("Day {}", day);
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "-".repeat(header.len()))?;

        let mut empty = true;
        for meal_time in MealTime::ALL {
            let Ok(key) = MealSlotKey::new(day, meal_time) else {
                continue;
            };
            let slot = view(key);
            if let Some(assignment) = slot.assignment {
                let main = assignment
                    .main
                    .as_ref()
                    .map(|d| describe_dish(catalog, d))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(out, "  {:10} {}", meal_time.as_str(), main)?;
                if let Some(side) = &assignment.side {
                    writeln!(out, "  {:10} + side: {}", "", describe_dish(catalog, side))?;
                }
                empty = false;
            }
            if let Some(item) = slot.suggestion {
                let label = if slot.assignment.is_some() { "" } else { meal_time.as_str() };
                writeln!(out, "  {:10} * suggested: {}", label, describe_suggestion(item))?;
                empty = false;
            }
        }
        if empty {
            writeln!(out, "  (nothing planned)")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_leftovers<W: Write>(
    out: &mut W,
    ledger: &LeftoverLedger,
    catalog: &dyn RecipeCatalog,
) -> io::Result<()> {
    if ledger.is_empty() {
        return writeln!(out, "No leftovers banked");
    }
    writeln!(out, "Leftovers")?;
    writeln!(out, "---------")?;
    for (recipe_id, entry) in ledger.iter() {
        writeln!(
            out,
            "  {} (#{}): {} portion(s) at serving {}",
            recipe_title(catalog, recipe_id),
            recipe_id,
            entry.remaining_portions,
            entry.serving
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealgrid_core::{MealGrid, MemoryCatalog, Recipe};

    fn key(day: u32, meal_time: MealTime) -> MealSlotKey {
        MealSlotKey::new(day, meal_time).unwrap()
    }

    #[test]
    fn test_describe_dish() {
        let catalog = MemoryCatalog::new(vec![Recipe::new(1, "Chili")]);
        let dish = DishAssignment::new(RecipeId(1)).with_portion(3).with_serving(2);
        assert_eq!(describe_dish(&catalog, &dish), "Chili x3 (serving 2)");

        let leftover = DishAssignment::from_leftover(RecipeId(5), 1);
        assert_eq!(
            describe_dish(&catalog, &leftover),
            "Recipe #5 x1 (serving 1) [leftover]"
        );
    }

    #[test]
    fn test_write_grid() {
        let catalog = MemoryCatalog::new(vec![Recipe::new(1, "Chili"), Recipe::new(2, "Rice")]);
        let mut grid = MealGrid::new();
        grid.set_main(key(1, MealTime::Dinner), RecipeId(1), 1, 1).unwrap();
        grid.set_side(key(1, MealTime::Dinner), RecipeId(2), 1, 1).unwrap();

        let mut out = Vec::new();
        write_grid(&mut out, 2, &catalog, |k| SlotView {
            assignment: grid.get(k),
            suggestion: None,
        })
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Day 1\n-----\n"));
        assert!(text.contains("dinner     Chili x1 (serving 1)"));
        assert!(text.contains("+ side: Rice x1 (serving 1)"));
        assert!(text.contains("Day 2\n-----\n  (nothing planned)"));
    }

    #[test]
    fn test_write_leftovers() {
        let catalog = MemoryCatalog::new(vec![Recipe::new(1, "Chili")]);
        let mut ledger = LeftoverLedger::new();

        let mut out = Vec::new();
        write_leftovers(&mut out, &ledger, &catalog).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No leftovers banked\n");

        ledger.record_leftover(RecipeId(1), 2, 3);
        let mut out = Vec::new();
        write_leftovers(&mut out, &ledger, &catalog).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("Chili (#1): 2 portion(s) at serving 3"));
    }
}
