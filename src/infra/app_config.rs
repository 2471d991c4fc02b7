use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::ConfigError;

pub const DEFAULT_AUTO_EXPAND_LIMIT: usize = 10;
pub const DEFAULT_PREVIEW_SCHEME: &str = "refactor-preview";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How many root nodes are expanded when no view state is known.
    pub auto_expand_limit: usize,
    /// Scheme of the synthetic URIs that hold proposed contents.
    pub preview_scheme: String,
    /// Root used to shorten resource labels in messages.
    pub workspace_root: Option<PathBuf>,
    /// Persisted boolean preferences, e.g. the grouping mode.
    pub preferences: BTreeMap<String, bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auto_expand_limit: DEFAULT_AUTO_EXPAND_LIMIT,
            preview_scheme: DEFAULT_PREVIEW_SCHEME.to_string(),
            workspace_root: None,
            preferences: BTreeMap::new(),
        }
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring invalid config {}: {}", path.display(), err);
            AppConfig::default()
        }
    }
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("REFACTOR_PREVIEW_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("RefactorPreview");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("RefactorPreview");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("refactor-preview");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("refactor-preview");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".refactor-preview")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.auto_expand_limit, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "auto_expand_limit = 3\n\n[preferences]\n\"refactorPreview.groupByFile\" = false\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.auto_expand_limit, 3);
        assert_eq!(config.preview_scheme, DEFAULT_PREVIEW_SCHEME);
        assert_eq!(
            config.preferences.get("refactorPreview.groupByFile"),
            Some(&false)
        );
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "auto_expand_limit = \"many\"").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.workspace_root = Some(PathBuf::from("/work"));
        config.preferences.insert("refactorPreview.groupByFile".into(), true);

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn config_path_honors_env_override() {
        let prev = std::env::var("REFACTOR_PREVIEW_CONFIG_PATH").ok();
        unsafe {
            std::env::set_var("REFACTOR_PREVIEW_CONFIG_PATH", "/tmp/rp/config.toml");
        }
        assert_eq!(config_path(), PathBuf::from("/tmp/rp/config.toml"));
        match prev {
            Some(value) => unsafe {
                std::env::set_var("REFACTOR_PREVIEW_CONFIG_PATH", value);
            },
            None => unsafe {
                std::env::remove_var("REFACTOR_PREVIEW_CONFIG_PATH");
            },
        }
    }
}
