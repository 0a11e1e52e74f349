use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for history files - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    pub api_key: Option<String>,
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub default_temperature: f64,

    #[serde(default)]
    pub batch: BatchConfig,
}

// ── Exploration batch settings ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Generations per exploration round.
    #[serde(default = "default_batch_n")]
    pub n: usize,
    /// Restore candidate order after the concurrent batch completes.
    #[serde(default = "default_sort_results")]
    pub sort_results: bool,
}

fn default_batch_n() -> usize {
    6
}

fn default_sort_results() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            n: default_batch_n(),
            sort_results: default_sort_results(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            config_path: PathBuf::new(),
            api_key: None,
            default_provider: Some("openrouter".to_string()),
            default_model: Some("openai/gpt-4.1-mini".to_string()),
            default_temperature: 0.7,
            batch: BatchConfig::default(),
        }
    }
}

impl Config {
    /// Load `~/.gallerist/config.toml`, creating the directory and a default
    /// config on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_at(&home.join(".gallerist"))
    }

    fn load_or_init_at(gallerist_dir: &Path) -> Result<Self> {
        let config_path = gallerist_dir.join("config.toml");
        let data_dir = gallerist_dir.join("data");

        if !gallerist_dir.exists() {
            fs::create_dir_all(gallerist_dir).context("Failed to create .gallerist directory")?;
        }
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            // Set computed paths that are skipped during serialization
            config.config_path = config_path;
            config.data_dir = data_dir;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                data_dir,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // API key: GALLERIST_API_KEY or OPENROUTER_API_KEY
        if let Ok(key) =
            std::env::var("GALLERIST_API_KEY").or_else(|_| std::env::var("OPENROUTER_API_KEY"))
        {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }

        // Provider: GALLERIST_PROVIDER
        if let Ok(provider) = std::env::var("GALLERIST_PROVIDER") {
            if !provider.is_empty() {
                self.default_provider = Some(provider);
            }
        }

        // Model: GALLERIST_MODEL
        if let Ok(model) = std::env::var("GALLERIST_MODEL") {
            if !model.is_empty() {
                self.default_model = Some(model);
            }
        }
    }

    pub fn provider(&self) -> &str {
        self.default_provider.as_deref().unwrap_or("openrouter")
    }

    pub fn model(&self) -> &str {
        self.default_model.as_deref().unwrap_or("openai/gpt-4.1-mini")
    }
}
