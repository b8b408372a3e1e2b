use crate::core::template::DEFAULT_APPLY_WINDOW_MONTHS;
use crate::db::pool::DEFAULT_BUSY_TIMEOUT_MS;
use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_user")]
    pub default_user: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_template_window_months")]
    pub template_window_months: u32,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}

/// Login name of the current OS user, or `local`.
fn default_user() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_template_window_months() -> u32 {
    DEFAULT_APPLY_WINDOW_MONTHS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_user: default_user(),
            busy_timeout_ms: default_busy_timeout_ms(),
            template_window_months: default_template_window_months(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimeblocks")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rtimeblocks")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimeblocks.conf")
    }

    /// Return the default path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimeblocks.sqlite")
    }

    /// Load the configuration file; a missing file yields defaults.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse YAML text; absent fields take their defaults.
    pub fn parse(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be used.
    fn validate(&self) -> AppResult<()> {
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database must not be empty".into()));
        }
        if self.default_user.trim().is_empty() {
            return Err(AppError::Config("default_user must not be empty".into()));
        }
        if self.template_window_months == 0 {
            return Err(AppError::Config("template_window_months must be at least 1".into()));
        }
        Ok(())
    }

    /// Database path with a leading `~/` expanded.
    pub fn database_path(&self) -> PathBuf {
        expand_tilde(&self.database)
    }

    /// Create the config directory, write the config file (unless
    /// `is_test`) and make sure the database's parent directory exists.
    pub fn init_all(
        db_override: Option<&str>,
        user_override: Option<&str>,
        is_test: bool,
    ) -> AppResult<Self> {
        let dir = Self::config_dir();
        let mut config = Self::default();

        if let Some(custom) = db_override {
            config.database = custom.to_string();
        }
        if let Some(user) = user_override {
            config.default_user = user.to_string();
        }

        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = config.database_path().parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
