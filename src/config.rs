use std::{env, fs, path::PathBuf, time::Duration};

use color_eyre::Result;
use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::DEFAULT_ROW_ID_FIELD;
use crate::pages::Page;
use crate::tui::{KeyBinding, KeyBindings, Theme};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_row_id_field")]
    pub row_id_field: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_page: Page,
    #[serde(default)]
    pub status_path: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub keybindings_path: Option<PathBuf>,
}

fn default_row_id_field() -> String {
    DEFAULT_ROW_ID_FIELD.to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            config_dir: PathBuf::new(),
            base_url: String::new(),
            row_id_field: default_row_id_field(),
            theme: default_theme(),
            default_page: Page::default(),
            status_path: None,
            request_timeout_secs: default_timeout(),
            keybindings_path: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// Bindings layered over the built-in defaults
    #[serde(default)]
    pub keybindings: Vec<KeyBinding>,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load settings: embedded defaults, then the user file
    ///
    /// Without an explicit path the user file is `~/.donation-tui.json5`,
    /// written from the embedded defaults on first run.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let selected_path = if let Some(p) = config_path {
            expand_tilde(p)
        } else {
            let home_cfg = default_home_config_path();
            if !home_cfg.exists() {
                if let Some(parent) = home_cfg.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                if let Err(e) = fs::write(&home_cfg, CONFIG) {
                    warn!(path = %home_cfg.display(), "Could not write default config: {e}");
                }
            }
            home_cfg
        };
        debug!(path = %selected_path.display(), "Reading config");

        builder = builder.add_source(
            config::File::from(selected_path)
                .format(config::FileFormat::Json5)
                .required(config_path.is_some()),
        );

        builder.build()?.try_deserialize()
    }

    /// Settings from the embedded defaults alone
    pub fn embedded() -> Result<Self, json5::Error> {
        json5::from_str(CONFIG)
    }

    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.config.theme)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Built-in bindings, then the optional bindings file, then inline bindings
    pub fn keybindings(&self) -> Result<KeyBindings> {
        let mut overrides = Vec::new();
        if let Some(path) = &self.config.keybindings_path {
            let from_file = KeyBindings::load_from_file(&expand_tilde(path))?;
            overrides.extend(from_file.bindings().iter().cloned());
        }
        overrides.extend(self.keybindings.iter().cloned());

        let bindings = KeyBindings::with_overrides(&overrides);
        for problem in bindings.validate() {
            warn!("Keybinding: {problem}");
        }
        Ok(bindings)
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str()
        && s.starts_with('~')
        && let Some(base) = BaseDirs::new()
    {
        return PathBuf::from(s.replacen('~', &base.home_dir().to_string_lossy(), 1));
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".donation-tui.json5");
    }
    PathBuf::from(".donation-tui.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tui::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.json5");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.config.row_id_field, "_id");
        assert_eq!(cfg.config.default_page, Page::InHonour);
        assert_eq!(cfg.config.request_timeout_secs, 15);
        assert!(cfg.config.base_url.starts_with("https://"));
        assert!(cfg.keybindings.is_empty());
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                base_url: "http://localhost:4000/api/v1",
                default_page: "enquiries",
                theme: "light",
                keybindings: [{ key: "Ctrl+r", action: "Refresh" }],
            }"#,
        );
        let cfg = Config::from_path(Some(&path)).unwrap();
        assert_eq!(cfg.config.base_url, "http://localhost:4000/api/v1");
        assert_eq!(cfg.config.default_page, Page::Enquiries);
        assert_eq!(cfg.theme().name, "Light");
        // Untouched keys keep their embedded values
        assert_eq!(cfg.config.row_id_field, "_id");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));

        let bindings = cfg.keybindings().unwrap();
        let key = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(bindings.get_action(&key), Some(Action::Refresh));
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(&quit), Some(Action::Quit));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json5");
        assert!(Config::from_path(Some(&missing)).is_err());
    }

    #[test]
    fn test_keybindings_file_is_layered() {
        let dir = tempfile::tempdir().unwrap();
        let keys = dir.path().join("keys.json");
        fs::write(&keys, r#"{ "bindings": [{ "key": "F2", "action": "ToggleHelp" }] }"#).unwrap();
        let cfg = Config {
            config: AppConfig {
                keybindings_path: Some(keys),
                ..AppConfig::default()
            },
            keybindings: Vec::new(),
        };
        let bindings = cfg.keybindings().unwrap();
        let f2 = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(&f2), Some(Action::ToggleHelp));
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        let path = PathBuf::from("/tmp/donations.json");
        assert_eq!(expand_tilde(&path), path);
    }
}
