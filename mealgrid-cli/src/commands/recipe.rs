use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::catalog::{find_recipe, load_catalog};
use crate::config::Config;
use mealgrid_core::RecipeCatalog;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List catalog recipes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show recipe details
    Show {
        /// Recipe ID or title
        recipe: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl RecipeCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let catalog = load_catalog(&config.catalog_path.value)?;

        match &self.command {
            RecipeSubcommand::List { format } => {
                let recipes = catalog.recipes();
                if recipes.is_empty() {
                    println!("No recipes found in {}", config.catalog_path.value.display());
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        for recipe in &recipes {
                            println!(
                                "  {:>4}  {:30} {:>5.0} kcal",
                                recipe.id.to_string(),
                                recipe.title,
                                recipe.nutrition.calories
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { recipe, format } => {
                let recipe = find_recipe(&catalog, recipe)?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(recipe)?),
                    OutputFormat::Text => println!("{}", recipe),
                }
                Ok(())
            }
        }
    }
}
