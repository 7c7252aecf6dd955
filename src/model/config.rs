use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub addons: AddonsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct AddonsConfig {
    pub confirm_uninstall: bool,
    pub remember_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user = project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|path| path.exists())
            .map(fs::read_to_string)
            .transpose()?;

        Self::from_layers(user.as_deref())
    }

    pub(crate) fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = DEFAULTS.parse()?;
        if let Some(user) = user {
            let overrides: toml::Table = user.parse()?;
            merge_tables(&mut merged, overrides);
        }

        let mut config: AppConfig = toml::Value::Table(merged).try_into()?;

        // Expand ~ in storage path
        if config.storage.path.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.storage.path = config
                .storage
                .path
                .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn store_path(&self) -> PathBuf {
        if !self.storage.path.trim().is_empty() {
            return PathBuf::from(&self.storage.path);
        }

        data_dir().join("storage.json")
    }
}

/// Platform data directory, also used for logs.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".sleektab"))
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "sleektab")
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Overlay `overrides` onto `base`, descending into nested tables.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(override_table)) => {
                merge_tables(base_table, override_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
