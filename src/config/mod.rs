use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        services::DEFAULT_DOMINANT_SHARE,
        utils::{app_data_dir, config_file_in, ensure_dir, ledger_file_in},
    },
    errors::ConfigError,
};

const TMP_SUFFIX: &str = "tmp";

/// User preferences consulted by front ends. None of this is stored alongside expenses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    /// Optional custom expense file. Defaults to `expenses.csv` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,
    #[serde(default = "Config::default_dominant_share")]
    pub dominant_share_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            monthly_budget: None,
            ledger_file: None,
            dominant_share_threshold: Self::default_dominant_share(),
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "₹".into()
    }

    pub fn default_dominant_share() -> f64 {
        DEFAULT_DOMINANT_SHARE
    }

    pub fn resolve_ledger_file(&self, base: &Path) -> PathBuf {
        match &self.ledger_file {
            Some(path) => path.clone(),
            None => ledger_file_in(base),
        }
    }
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

    /// Manager for the config file in the default data directory.
    pub fn from_env() -> Self {
        Self::with_base_dir(&app_data_dir())
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self::new(config_file_in(base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config, falling back to defaults when the file is absent.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
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

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
