use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

pub const DARK_THEME: &str = "dark";
pub const LIGHT_THEME: &str = "light";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Directory holding the mirrored JSON document; no mirror when unset
    #[serde(default)]
    pub sync_dir: Option<String>,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_tab_1")]
    pub tab_1: String,
    #[serde(default = "default_tab_2")]
    pub tab_2: String,
    #[serde(default = "default_tab_3")]
    pub tab_3: String,
    #[serde(default = "default_tab_4")]
    pub tab_4: String,
    #[serde(default = "default_next_tab")]
    pub next_tab: String,
    #[serde(default = "default_prev_tab")]
    pub prev_tab: String,
    #[serde(default = "default_prev_month")]
    pub prev_month: String,
    #[serde(default = "default_next_month")]
    pub next_month: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_prev_employee")]
    pub prev_employee: String,
    #[serde(default = "default_next_employee")]
    pub next_employee: String,
    #[serde(default = "default_select")]
    pub select: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle")]
    pub toggle: String,
    #[serde(default = "default_toggle_theme")]
    pub toggle_theme: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    #[serde(default = "default_muted")]
    pub muted: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            sync_dir: None,
            seed_demo_data: true,
            log_level: default_log_level(),
            currency_symbol: default_currency_symbol(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            key_bindings: KeyBindings::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            tab_1: default_tab_1(),
            tab_2: default_tab_2(),
            tab_3: default_tab_3(),
            tab_4: default_tab_4(),
            next_tab: default_next_tab(),
            prev_tab: default_prev_tab(),
            prev_month: default_prev_month(),
            next_month: default_next_month(),
            today: default_today(),
            prev_employee: default_prev_employee(),
            next_employee: default_next_employee(),
            select: default_select(),
            new: default_new(),
            edit: default_edit(),
            delete: default_delete(),
            toggle: default_toggle(),
            toggle_theme: default_toggle_theme(),
            list_up: default_list_up(),
            list_down: default_list_down(),
        }
    }
}

impl KeyBindings {
    /// (name, binding) pairs, in the order the help popup lists them
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("quit", &self.quit),
            ("help", &self.help),
            ("tab_1", &self.tab_1),
            ("tab_2", &self.tab_2),
            ("tab_3", &self.tab_3),
            ("tab_4", &self.tab_4),
            ("next_tab", &self.next_tab),
            ("prev_tab", &self.prev_tab),
            ("prev_month", &self.prev_month),
            ("next_month", &self.next_month),
            ("today", &self.today),
            ("prev_employee", &self.prev_employee),
            ("next_employee", &self.next_employee),
            ("select", &self.select),
            ("new", &self.new),
            ("edit", &self.edit),
            ("delete", &self.delete),
            ("toggle", &self.toggle),
            ("toggle_theme", &self.toggle_theme),
            ("list_up", &self.list_up),
            ("list_down", &self.list_down),
        ]
    }

    /// Check every binding parses, so typos surface at start-up
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, binding) in self.entries() {
            utils::parse_key_binding(binding)
                .map_err(|e| ConfigError::InvalidKeyBinding(name.to_string(), e))?;
        }
        Ok(())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            tab_bg: default_tab_bg(),
            muted: default_muted(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert(DARK_THEME.to_string(), Theme::default());

        themes.insert(LIGHT_THEME.to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            tab_bg: "gray".to_string(),
            muted: "#6e7681".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_database_path() -> String {
    // Fallback only; load_from_path fills in the profile's data directory
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("workshift.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/workshift/workshift.db".to_string()
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_currency_symbol() -> String {
    "₽".to_string()
}

fn default_current_theme() -> String {
    DARK_THEME.to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_tab_1() -> String {
    "1".to_string()
}

fn default_tab_2() -> String {
    "2".to_string()
}

fn default_tab_3() -> String {
    "3".to_string()
}

fn default_tab_4() -> String {
    "4".to_string()
}

fn default_next_tab() -> String {
    "Tab".to_string()
}

fn default_prev_tab() -> String {
    "BackTab".to_string()
}

fn default_prev_month() -> String {
    "[".to_string()
}

fn default_next_month() -> String {
    "]".to_string()
}

fn default_today() -> String {
    "t".to_string()
}

fn default_prev_employee() -> String {
    ",".to_string()
}

fn default_next_employee() -> String {
    ".".to_string()
}

fn default_select() -> String {
    "Enter".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle() -> String {
    "Space".to_string()
}

fn default_toggle_theme() -> String {
    "Ctrl+t".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "#58a6ff".to_string()
}

fn default_highlight_fg() -> String {
    "".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_muted() -> String {
    "#8b949e".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
    #[error("Invalid key binding for '{0}': {1}")]
    InvalidKeyBinding(String, String),
}

impl Config {
    /// Load configuration from an explicit file. A missing file is created with
    /// defaults for `profile`.
    pub fn load_from_path(path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            config.key_bindings.validate()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Write the configuration to `path`, creating parent directories
    pub fn save_to(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("workshift.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/workshift-dev/workshift.db".to_string(),
                utils::Profile::Prod => "~/.local/share/workshift/workshift.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Expanded mirror directory, if one is configured
    pub fn get_sync_dir(&self) -> Option<PathBuf> {
        self.sync_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(utils::expand_path)
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it will be calculated from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }

    /// Set the active theme by name
    pub fn set_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.themes.contains_key(name) && !Theme::get_preset_themes().contains_key(name) {
            return Err(ConfigError::ThemeNotFound(name.to_string()));
        }
        self.current_theme = name.to_string();
        Ok(())
    }

    /// Flip between the dark and light presets. Returns the new theme name.
    pub fn toggle_theme(&mut self) -> &str {
        self.current_theme = if self.current_theme == LIGHT_THEME {
            DARK_THEME.to_string()
        } else {
            LIGHT_THEME.to_string()
        };
        &self.current_theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert!(config.seed_demo_data);
        assert_eq!(config.current_theme, "dark");
        assert_eq!(config.sync_dir, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = \"/tmp/shifts.db\"\nsync_dir = \"~/Sync\"\n[key_bindings]\nquit = \"x\"\n").unwrap();

        let config = Config::load_from_path(&path, utils::Profile::Prod).unwrap();
        assert_eq!(config.database_path, "/tmp/shifts.db");
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.help, "F1");
        assert_eq!(config.log_level, "info");
        assert!(config.get_sync_dir().is_some());
    }

    #[test]
    fn bad_key_binding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[key_bindings]\nhelp = \"Hyper+h\"\n").unwrap();
        assert!(matches!(
            Config::load_from_path(&path, utils::Profile::Prod),
            Err(ConfigError::InvalidKeyBinding(name, _)) if name == "help"
        ));
    }

    #[test]
    fn theme_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert_eq!(config.toggle_theme(), "light");
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.current_theme, "light");
        assert_eq!(reloaded.get_active_theme().bg, "white");
    }

    #[test]
    fn unknown_theme_is_refused() {
        let mut config = Config::default();
        assert!(config.set_theme("solarized").is_err());
        config.set_theme("light").unwrap();
        assert_eq!(config.current_theme, "light");
    }

    #[test]
    fn dark_theme_computes_highlight_text() {
        let theme = Config::default().get_active_theme();
        assert!(!theme.highlight_fg.is_empty());
    }

    #[test]
    fn empty_sync_dir_means_no_mirror() {
        let config = Config {
            sync_dir: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.get_sync_dir(), None);
    }
}
