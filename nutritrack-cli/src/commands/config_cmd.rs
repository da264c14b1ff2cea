use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::Config;

const DEFAULT_CONFIG: &str = r#"# nutri configuration

# Where logged meals are stored (default: platform data dir, e.g. ~/.local/share/nutri)
# data_dir: ~/.local/share/nutri

# Daily calorie goal
daily_goal: 2000

# Day keys: "short" (Jun 18) or "dated" (2025-06-18)
day_format: short

food_search:
  base_url: https://world.openfoodfacts.org
  timeout_secs: 15

chat:
  api_url: https://api.openai.com/v1
  model: gpt-3.5-turbo
  timeout_secs: 60
  # api_key: set NUTRI_CHAT_API_KEY instead of storing it here
"#;

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
                                cli_config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("daily_goal: {}", config.daily_goal.value);
                        println!("  source: {}", config.daily_goal.source);
                        println!();

                        println!("day_format: {}", config.day_format.value);
                        println!("  source: {}", config.day_format.source);
                        println!();

                        println!("food_search.base_url: {}", config.food_search.base_url);
                        println!("chat.api_url: {}", config.chat.api_url);
                        println!("chat.model: {}", config.chat.model);
                        println!(
                            "chat.api_key: {}",
                            if config.chat.is_configured() {
                                "set"
                            } else {
                                "not set"
                            }
                        );
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                // Check if config already exists
                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'nutri config show' to view current configuration.");
                    return Ok(());
                }

                write_default_config(&config_path)?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(DEFAULT_CONFIG.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, DayFormat};
    use tempfile::tempdir;

    #[test]
    fn test_default_config_loads() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        write_default_config(&path).unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.daily_goal.value.kcal(), 2000);
        assert_eq!(config.daily_goal.source, ConfigSource::File);
        assert_eq!(config.day_format.value, DayFormat::Short);
        assert_eq!(config.food_search.timeout_secs, 15);
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
    }
}
