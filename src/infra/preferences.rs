use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::app_config::{self, AppConfig};

/// Persisted boolean user preferences.
pub trait PreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn store_bool(&mut self, key: &str, value: bool) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, bool>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn store_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept in the `[preferences]` table of the config file.
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    config: AppConfig,
}

impl TomlPreferenceStore {
    pub fn open(path: PathBuf) -> Self {
        let config = app_config::load_config_from(&path);
        Self { path, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.config.preferences.get(key).copied().unwrap_or(default)
    }

    fn store_bool(&mut self, key: &str, value: bool) -> Result<()> {
        if self.config.preferences.get(key) == Some(&value) {
            return Ok(());
        }
        self.config.preferences.insert(key.to_string(), value);
        app_config::save_config_to(&self.path, &self.config)?;
        Ok(())
    }
}
