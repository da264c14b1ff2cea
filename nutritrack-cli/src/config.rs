use chrono::NaiveDate;
use nutritrack_core::{chat, food_search, CalorieGoal, DayKey};
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;

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

/// How day keys are built from calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayFormat {
    /// "Jun 18" (no year)
    #[default]
    Short,
    /// "2025-06-18"
    Dated,
}

impl DayFormat {
    pub fn key_for(&self, date: NaiveDate) -> DayKey {
        match self {
            DayFormat::Short => DayKey::short(date),
            DayFormat::Dated => DayKey::dated(date),
        }
    }
}

impl std::fmt::Display for DayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayFormat::Short => write!(f, "short"),
            DayFormat::Dated => write!(f, "dated"),
        }
    }
}

impl FromStr for DayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(DayFormat::Short),
            "dated" => Ok(DayFormat::Dated),
            _ => Err(format!(
                "Invalid day format '{}'. Valid options: short, dated",
                s
            )),
        }
    }
}

/// Food search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodSearchConfig {
    /// Open Food Facts base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FoodSearchConfig {
    fn default() -> Self {
        Self {
            base_url: food_search::DEFAULT_BASE_URL.to_string(),
            timeout_secs: food_search::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Chat proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// OpenAI-compatible API base URL
    pub api_url: String,
    /// API key for the chat service
    #[serde(serialize_with = "mask_secret")]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: chat::DEFAULT_API_URL.to_string(),
            api_key: None,
            model: chat::DEFAULT_MODEL.to_string(),
            timeout_secs: chat::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ChatConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn mask_secret<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some("********"),
        None => serializer.serialize_none(),
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the stored meals
    pub data_dir: ConfigValue<PathBuf>,
    /// Daily calorie goal
    pub daily_goal: ConfigValue<CalorieGoal>,
    /// Day key format
    pub day_format: ConfigValue<DayFormat>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Food search configuration
    pub food_search: FoodSearchConfig,
    /// Chat configuration
    pub chat: ChatConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    daily_goal: Option<u32>,
    day_format: Option<DayFormat>,
    food_search: Option<FoodSearchConfig>,
    chat: Option<ChatConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut daily_goal = ConfigValue::new(CalorieGoal::default(), ConfigSource::Default);
        let mut day_format = ConfigValue::new(DayFormat::default(), ConfigSource::Default);
        let mut config_file = None;
        let mut food_search = FoodSearchConfig::default();
        let mut chat = ChatConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(goal) = file_config.daily_goal {
                let goal = CalorieGoal::new(goal)
                    .map_err(|e| ConfigError::InvalidValue("daily_goal", e.to_string()))?;
                daily_goal = ConfigValue::new(goal, ConfigSource::File);
            }
            if let Some(format) = file_config.day_format {
                day_format = ConfigValue::new(format, ConfigSource::File);
            }
            if let Some(search) = file_config.food_search {
                food_search = search;
            }
            if let Some(chat_config) = file_config.chat {
                chat = chat_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("NUTRI_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(goal) = std::env::var("NUTRI_DAILY_GOAL") {
            let goal = goal
                .parse::<CalorieGoal>()
                .map_err(|e| ConfigError::InvalidValue("NUTRI_DAILY_GOAL", e.to_string()))?;
            daily_goal = ConfigValue::new(goal, ConfigSource::Environment);
        }
        if let Ok(format) = std::env::var("NUTRI_DAY_FORMAT") {
            let format = format
                .parse::<DayFormat>()
                .map_err(|e| ConfigError::InvalidValue("NUTRI_DAY_FORMAT", e))?;
            day_format = ConfigValue::new(format, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("NUTRI_FOOD_SEARCH_URL") {
            food_search.base_url = url;
        }
        if let Ok(url) = std::env::var("NUTRI_CHAT_URL") {
            chat.api_url = url;
        }
        if let Ok(key) = std::env::var("NUTRI_CHAT_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")) {
            chat.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("NUTRI_CHAT_MODEL") {
            chat.model = model;
        }

        Ok(Self {
            data_dir,
            daily_goal,
            day_format,
            config_file,
            food_search,
            chat,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutri/
    /// - macOS: ~/Library/Application Support/nutri/
    /// - Windows: %APPDATA%/nutri/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutri")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/nutri/
    /// - macOS: ~/Library/Application Support/nutri/
    /// - Windows: %APPDATA%/nutri/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutri")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
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
            ConfigError::InvalidValue(name, e) => {
                write!(f, "Invalid value for {}: {}", name, e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.to_string_lossy().contains("nutri"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.daily_goal.value.kcal(), 2000);
        assert_eq!(config.day_format.value, DayFormat::Short);
        assert_eq!(config.food_search.base_url, "https://world.openfoodfacts.org");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/nutri").unwrap();
        writeln!(file, "daily_goal: 2400").unwrap();
        writeln!(file, "day_format: dated").unwrap();
        writeln!(file, "chat:").unwrap();
        writeln!(file, "  model: gpt-4o-mini").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/nutri"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.daily_goal.value.kcal(), 2400);
        assert_eq!(config.daily_goal.source, ConfigSource::File);
        assert_eq!(config.day_format.value, DayFormat::Dated);
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(config.chat.api_url, "https://api.openai.com/v1");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    fn test_zero_goal_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "daily_goal: 0\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("daily_goal"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "daily_goal: 1800\n").unwrap();

        std::env::set_var("NUTRI_DAILY_GOAL", "2200");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.daily_goal.value.kcal(), 2200);
        assert_eq!(config.daily_goal.source, ConfigSource::Environment);

        std::env::remove_var("NUTRI_DAILY_GOAL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_api_key_masked_in_output() {
        let chat = ChatConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        assert!(chat.is_configured());
        let json = serde_json::to_string(&chat).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("********"));
    }

    #[test]
    fn test_day_format_key_for() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        assert_eq!(DayFormat::Short.key_for(date).as_str(), "Jun 18");
        assert_eq!(DayFormat::Dated.key_for(date).as_str(), "2025-06-18");
        assert!("weekly".parse::<DayFormat>().is_err());
    }
}
