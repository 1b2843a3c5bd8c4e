use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::ConfigError;

const CONFIG_FILE: &str = "config.json";
const DEFAULT_DIR_NAME: &str = ".kakeibo";
const HOME_ENV: &str = "KAKEIBO_HOME";
const TMP_SUFFIX: &str = "tmp";

pub const DEFAULT_TRANSACTIONS_KEY: &str = "kakeibo:transactions";
pub const DEFAULT_CATEGORIES_KEY: &str = "kakeibo:categories";
pub const DEFAULT_RECURRING_KEY: &str = "kakeibo:recurring";

const DEFAULT_CATEGORIES: [&str; 10] = [
    "食費", "日用品", "交通", "家賃", "光熱費", "通信", "娯楽", "医療", "美容", "その他",
];

/// Process-level settings. Every field has a default, so partial files load fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding the store documents. Defaults to `$KAKEIBO_HOME` or `~/.kakeibo`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_transactions_key")]
    pub transactions_key: String,
    #[serde(default = "Config::default_categories_key")]
    pub categories_key: String,
    #[serde(default = "Config::default_recurring_key")]
    pub recurring_key: String,
    /// Seed for the category registry when nothing has been stored yet.
    #[serde(default = "Config::default_categories")]
    pub default_categories: Vec<String>,
    #[serde(default = "Config::default_series_window")]
    pub series_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            transactions_key: Self::default_transactions_key(),
            categories_key: Self::default_categories_key(),
            recurring_key: Self::default_recurring_key(),
            default_categories: Self::default_categories(),
            series_window: Self::default_series_window(),
        }
    }
}

impl Config {
    pub fn default_transactions_key() -> String {
        DEFAULT_TRANSACTIONS_KEY.into()
    }

    pub fn default_categories_key() -> String {
        DEFAULT_CATEGORIES_KEY.into()
    }

    pub fn default_recurring_key() -> String {
        DEFAULT_RECURRING_KEY.into()
    }

    pub fn default_categories() -> Vec<String> {
        DEFAULT_CATEGORIES.iter().map(|label| label.to_string()).collect()
    }

    pub fn default_series_window() -> usize {
        crate::core::services::SERIES_WINDOW
    }

    /// Rejects settings that would make two stores share one document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = [
            &self.transactions_key,
            &self.categories_key,
            &self.recurring_key,
        ];
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(ConfigError::Invalid("storage keys must not be empty".into()));
        }
        for (idx, key) in keys.iter().enumerate() {
            if keys[idx + 1..].contains(key) {
                return Err(ConfigError::Invalid(format!(
                    "storage key `{key}` is used by more than one store"
                )));
            }
        }
        Ok(())
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => app_data_dir(),
        }
    }
}

/// Returns the application data directory, defaulting to `~/.kakeibo`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Manager for `config.json` inside `base`.
    pub fn with_base_dir(base: &Path) -> Self {
        Self::new(base.join(CONFIG_FILE))
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config =
                serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
