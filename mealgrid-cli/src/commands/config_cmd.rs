use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# mealgrid configuration

# Directory holding plans (default: platform data dir, e.g. ~/.local/share/mealgrid)
# data_dir: ~/.local/share/mealgrid

# Recipe catalog (default: <data_dir>/recipes.yaml)
# catalog_path: recipes.yaml

# Undo steps kept while editing a plan
history_depth: 50

# Suggestion service
# suggestion:
#   endpoint: http://localhost:3000/suggest
#   api_key: changeme
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("catalog_path: {}", config.catalog_path.value.display());
                        println!("  source: {}", config.catalog_path.source);
                        println!();

                        println!("history_depth: {}", config.history_depth.value);
                        println!("  source: {}", config.history_depth.source);
                        println!();

                        match &config.suggestion.endpoint {
                            Some(endpoint) if config.suggestion.is_configured() => {
                                println!("suggestion.endpoint: {}", endpoint)
                            }
                            _ => println!("suggestion.endpoint: (not configured)"),
                        }
                        if config.suggestion.api_key.is_some() {
                            println!("suggestion.api_key: (set)");
                        }
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'mealgrid config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("mealgrid").join("config.yaml");
        let config = Config::load(Some(config_path.clone())).unwrap();

        let cmd = ConfigCommand {
            command: ConfigSubcommand::Init,
        };
        cmd.run(&config, Some(config_path.clone())).unwrap();
        assert!(config_path.exists());

        let reloaded = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(reloaded.config_file, Some(config_path));
        assert_eq!(reloaded.history_depth.value, 50);
        assert_eq!(reloaded.history_depth.source, ConfigSource::File);
    }
}
