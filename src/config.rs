use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::auth::session::DEFAULT_IDLE_MINUTES;
use crate::import::DEFAULT_CSV_PATH;

pub const DEFAULT_DATABASE: &str = "botledger.db";
pub const DEFAULT_PORT: u16 = 8080;

/// Contents of `botledger.toml`; every key is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BotledgerConfig {
    pub database: Option<String>,
    pub csv_path: Option<String>,
    pub port: Option<u16>,
    pub session_idle_minutes: Option<i64>,
}

impl BotledgerConfig {
    /// A config with every default spelled out, as written by `init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            csv_path: Some(DEFAULT_CSV_PATH.to_string()),
            port: Some(DEFAULT_PORT),
            session_idle_minutes: Some(DEFAULT_IDLE_MINUTES),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.as_deref().unwrap_or(DEFAULT_DATABASE))
    }

    pub fn csv_path(&self) -> PathBuf {
        PathBuf::from(self.csv_path.as_deref().unwrap_or(DEFAULT_CSV_PATH))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn session_idle_minutes(&self) -> i64 {
        self.session_idle_minutes.unwrap_or(DEFAULT_IDLE_MINUTES)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("botledger.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BotledgerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BotledgerConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BotledgerConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
