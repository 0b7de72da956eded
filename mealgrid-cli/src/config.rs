use mealgrid_core::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Suggestion service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuggestionConfig {
    /// Endpoint that accepts suggestion requests (e.g., "http://localhost:3000/suggest")
    pub endpoint: Option<String>,
    /// Bearer token sent with each request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl SuggestionConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding plan files
    pub data_dir: ConfigValue<PathBuf>,
    /// YAML file listing the recipe catalog
    pub catalog_path: ConfigValue<PathBuf>,
    /// Undo steps kept per editing session
    pub history_depth: ConfigValue<usize>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub suggestion: SuggestionConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    history_depth: Option<usize>,
    suggestion: Option<SuggestionConfig>,
}

/// Resolves relative paths against the config file's directory
fn resolve_against(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path.parent().map(|p| p.join(&path)).unwrap_or(path)
    } else {
        path
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut catalog_path: Option<ConfigValue<PathBuf>> = None;
        let mut history_depth = ConfigValue::new(DEFAULT_MAX_DEPTH, ConfigSource::Default);
        let mut config_file = None;
        let mut suggestion = SuggestionConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                data_dir = ConfigValue::new(resolve_against(&path, dir), ConfigSource::File);
            }
            if let Some(catalog) = file_config.catalog_path {
                catalog_path = Some(ConfigValue::new(
                    resolve_against(&path, catalog),
                    ConfigSource::File,
                ));
            }
            if let Some(depth) = file_config.history_depth {
                history_depth = ConfigValue::new(depth, ConfigSource::File);
            }
            if let Some(suggestion_config) = file_config.suggestion {
                suggestion = suggestion_config;
            }
        }

        if let Ok(dir) = std::env::var("MEALGRID_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(catalog) = std::env::var("MEALGRID_CATALOG") {
            catalog_path = Some(ConfigValue::new(
                PathBuf::from(catalog),
                ConfigSource::Environment,
            ));
        }
        if let Ok(depth) = std::env::var("MEALGRID_HISTORY_DEPTH") {
            let parsed = depth.parse().map_err(|_| {
                ConfigError::InvalidValue("MEALGRID_HISTORY_DEPTH".to_string(), depth.clone())
            })?;
            history_depth = ConfigValue::new(parsed, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("MEALGRID_SUGGEST_URL") {
            suggestion.endpoint = Some(url);
        }
        if let Ok(key) = std::env::var("MEALGRID_SUGGEST_API_KEY") {
            suggestion.api_key = Some(key);
        }

        // The catalog follows the data directory unless set explicitly
        let catalog_path = catalog_path.unwrap_or_else(|| {
            ConfigValue::new(data_dir.value.join("recipes.yaml"), ConfigSource::Default)
        });

        Ok(Self {
            data_dir,
            catalog_path,
            history_depth,
            config_file,
            suggestion,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/mealgrid/
    /// - macOS: ~/Library/Application Support/mealgrid/
    /// - Windows: %APPDATA%/mealgrid/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealgrid")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/mealgrid/
    /// - macOS: ~/Library/Application Support/mealgrid/
    /// - Windows: %APPDATA%/mealgrid/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealgrid")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }

    /// Directory plan files live in
    pub fn plans_dir(&self) -> PathBuf {
        self.data_dir.value.join("plans")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::InvalidValue(_, _) => None,
        }
    }
}
