use clap::ValueEnum;

mod config_cmd;
mod display;
pub mod edit;
mod plan;
mod recipe;

pub use config_cmd::ConfigCommand;
pub use edit::EditCommand;
pub use plan::PlanCommand;
pub use recipe::RecipeCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
