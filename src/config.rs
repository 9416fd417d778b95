use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";
const HISTORY_FILE_NAME: &str = ".wurp_terminal_history";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the local AI service.
    pub service_url: String,
    /// Preferred interpreter for pass-through lines.
    pub shell: String,
    pub default_theme: String,
    /// Overrides `~/.wurp_terminal_history`.
    pub history_file: Option<PathBuf>,
    pub fallback_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            shell: "bash".to_string(),
            default_theme: "default".to_string(),
            history_file: None,
            fallback_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from file, environment variables, or create default
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file().unwrap_or_else(|_| {
            info!("No config file found, using defaults");
            Self::default()
        });

        // Environment variables override config file
        if let Ok(url) = std::env::var("WURP_AI_URL") {
            config.service_url = url;
        }
        if let Ok(shell) = std::env::var("WURP_SHELL") {
            config.shell = shell;
        }
        if let Ok(theme) = std::env::var("WURP_THEME") {
            config.default_theme = theme;
        }

        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".wurp"))
    }

    /// Where the history file lives: the configured path, or one in the home directory.
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_file {
            return Ok(path.clone());
        }
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(HISTORY_FILE_NAME))
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn show_config_info() -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());

        if config_path.exists() {
            println!("Status: Found");
        } else {
            println!("Status: Not found (using defaults)");
        }

        let config = Self::load()?;
        println!("AI service: {}", config.service_url);
        println!("Shell: {}", config.shell);
        println!("Default theme: {}", config.default_theme);
        match config.history_path() {
            Ok(path) => println!("History file: {}", path.display()),
            Err(e) => println!("History file: unavailable ({})", e),
        }

        println!("\nEnvironment overrides:");
        println!("  WURP_AI_URL, WURP_SHELL, WURP_THEME");

        Ok(())
    }
}
