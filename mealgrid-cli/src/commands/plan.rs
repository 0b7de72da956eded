use clap::{Args, Subcommand};
use std::io;
use uuid::Uuid;

use super::display::write_grid;
use super::OutputFormat;
use crate::catalog::{find_recipe, load_catalog};
use crate::config::Config;
use mealgrid_core::{
    nutrition, FilePlanStore, MealGrid, MemoryCatalog, PlanSnapshot, PlanStore, SlotView,
};

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Create a new, empty meal plan
    Create {
        /// Plan title
        #[arg(long)]
        title: String,

        /// Number of days the plan covers
        #[arg(long, short)]
        days: u32,

        /// Pick a recipe for this plan by ID or title (can be repeated)
        #[arg(long = "recipe", value_name = "RECIPE")]
        recipes: Vec<String>,

        /// Dietary preference (can be repeated)
        #[arg(long = "prefer", value_name = "PREFERENCE")]
        preferences: Vec<String>,

        /// Ingredient or food to avoid (can be repeated)
        #[arg(long = "exclude", value_name = "EXCLUSION")]
        exclusions: Vec<String>,
    },

    /// List meal plans
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a meal plan
    Show {
        /// Meal plan ID (UUID)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show nutrition totals per day
    Totals {
        /// Meal plan ID (UUID)
        id: String,

        /// Only show this day
        #[arg(long)]
        day: Option<u32>,
    },
}

pub fn parse_plan_id(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid plan ID: {}", id))
}

/// Loads plan `id`, failing with a readable message if it does not exist.
pub fn load_plan(store: &dyn PlanStore, id: &str) -> Result<PlanSnapshot, Box<dyn std::error::Error>> {
    let uuid = parse_plan_id(id)?;
    store
        .load(&uuid)?
        .ok_or_else(|| format!("Meal plan not found: {}", id).into())
}

impl PlanCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let store = FilePlanStore::new(config.plans_dir());

        match &self.command {
            PlanSubcommand::Create {
                title,
                days,
                recipes,
                preferences,
                exclusions,
            } => {
                if *days == 0 {
                    return Err("A plan needs at least one day".into());
                }

                let catalog = if recipes.is_empty() {
                    MemoryCatalog::default()
                } else {
                    load_catalog(&config.catalog_path.value)?
                };
                let mut recipe_ids = Vec::new();
                for reference in recipes {
                    let id = find_recipe(&catalog, reference)?.id;
                    if !recipe_ids.contains(&id) {
                        recipe_ids.push(id);
                    }
                }

                let plan = PlanSnapshot::new(title.clone(), *days)
                    .with_recipe_ids(recipe_ids)
                    .with_preferences(preferences.clone())
                    .with_exclusions(exclusions.clone());
                store.save(&plan)?;

                println!("Created meal plan:");
                println!("{}", plan);
                Ok(())
            }

            PlanSubcommand::List { format } => {
                let mut plans = Vec::new();
                for id in store.list()? {
                    if let Some(plan) = store.load(&id)? {
                        plans.push(plan);
                    }
                }
                plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

                if plans.is_empty() {
                    println!("No meal plans found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&plans)?);
                    }
                    OutputFormat::Text => {
                        for plan in &plans {
                            println!(
                                "{}  {:30} {:>2} day(s)  {:>3} meal(s)",
                                plan.id,
                                plan.title,
                                plan.days,
                                plan.meals.len()
                            );
                        }
                        println!("\nTotal: {} meal plan(s)", plans.len());
                    }
                }
                Ok(())
            }

            PlanSubcommand::Show { id, format } => {
                let plan = load_plan(&store, id)?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&plan)?);
                    }
                    OutputFormat::Text => {
                        let catalog = load_catalog(&config.catalog_path.value)?;
                        let grid = MealGrid::from_plan(&plan)?;
                        println!("{}", plan);
                        write_grid(&mut io::stdout(), plan.days, &catalog, |key| SlotView {
                            assignment: grid.get(key),
                            suggestion: None,
                        })?;
                    }
                }
                Ok(())
            }

            PlanSubcommand::Totals { id, day } => {
                let plan = load_plan(&store, id)?;
                let catalog = load_catalog(&config.catalog_path.value)?;
                let grid = MealGrid::from_plan(&plan)?;

                match day {
                    Some(day) => {
                        if *day == 0 || *day > plan.days {
                            return Err(format!(
                                "Day {} is outside the plan ({} day(s))",
                                day, plan.days
                            )
                            .into());
                        }
                        let totals = nutrition::day_totals(&grid, &catalog, *day);
                        println!("Day {}: {}", day, totals);
                    }
                    None => {
                        for (day, totals) in nutrition::plan_totals(&grid, &catalog, plan.days) {
                            println!("Day {}: {}", day, totals);
                        }
                        println!(
                            "\nDaily average: {}",
                            nutrition::average_daily(&grid, &catalog, plan.days)
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealgrid_core::MemoryPlanStore;

    #[test]
    fn test_parse_plan_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_plan_id(&id.to_string()).unwrap(), id);
        assert!(parse_plan_id("week-1").unwrap_err().contains("Invalid plan ID"));
    }

    #[test]
    fn test_load_plan() {
        let store = MemoryPlanStore::new();
        let plan = PlanSnapshot::new("Week", 7);
        store.save(&plan).unwrap();

        assert_eq!(load_plan(&store, &plan.id.to_string()).unwrap(), plan);

        let missing = Uuid::new_v4().to_string();
        let err = load_plan(&store, &missing).unwrap_err();
        assert!(err.to_string().contains("Meal plan not found"));
    }
}
