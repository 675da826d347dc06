use std::path::{Path, PathBuf};

use derive_more::From;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use quill::Configuration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

pub mod theme;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub time_budget_seconds: u32,
    pub tab_width: usize,
    pub block_past_line_end: bool,
    pub collapse_auto_indent: bool,
    pub finish_on_completion: bool,
    pub default_language: String,
    pub snippets_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub fade_distant_lines: bool,
    pub theme: theme::Theme,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = Configuration::default();

        Self {
            time_budget_seconds: engine.time_budget_seconds,
            tab_width: engine.tab_width,
            block_past_line_end: engine.block_past_line_end,
            collapse_auto_indent: engine.collapse_auto_indent,
            finish_on_completion: engine.finish_on_completion,
            default_language: "python".to_string(),
            snippets_dir: None,
            log_dir: None,
            fade_distant_lines: true,
            theme: theme::Theme::default(),
        }
    }
}

impl Settings {
    /// The engine configuration for a run
    pub fn engine_configuration(&self) -> Configuration {
        Configuration {
            time_budget_seconds: self.time_budget_seconds,
            tab_width: self.tab_width,
            block_past_line_end: self.block_past_line_end,
            collapse_auto_indent: self.collapse_auto_indent,
            finish_on_completion: self.finish_on_completion,
        }
    }
}

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error(
        "Failed to get configuration directory. Please specify the location using the `--config <path>` flag"
    )]
    NoDirectory,

    #[error("Failed to create config directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),

    #[error("Failed to load snippets: {0}")]
    Catalog(CatalogError),

    #[error("The time budget must be at least one second")]
    #[from(skip)]
    ZeroTimeBudget,

    #[error("The tab width must be at least one space")]
    #[from(skip)]
    ZeroTabWidth,

    #[error("Default language '{0}' has no snippets")]
    #[from(skip)]
    UnknownLanguage(String),
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    pub catalog: Catalog,
}

impl Config {
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "CodeType", "codetype")
    }

    pub fn get(override_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = override_path
            .or_else(|| Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::NoDirectory)?;

        Self::load_from(&config_dir)
    }

    /// Load the settings and snippets found in `config_dir`
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        // Grab default configuration
        let mut settings = Figment::from(Serialized::defaults(Settings::default()));

        // Ensure path exists
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }

        let settings_toml = config_dir.join("settings.toml");
        if settings_toml.exists() {
            settings = settings.merge(Toml::file(settings_toml));
        }

        settings = settings.merge(Env::prefixed("CODETYPE_").split("__"));

        let mut settings: Settings = settings.extract().map_err(Box::new)?;

        if settings.time_budget_seconds == 0 {
            return Err(ConfigError::ZeroTimeBudget);
        }

        if settings.tab_width == 0 {
            return Err(ConfigError::ZeroTabWidth);
        }

        let snippets_dir = settings
            .snippets_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("snippets"));
        let catalog = Catalog::load(&snippets_dir, settings.tab_width)?;
        settings.snippets_dir = Some(snippets_dir);

        if !catalog.contains(&settings.default_language) {
            return Err(ConfigError::UnknownLanguage(settings.default_language));
        }

        if settings.log_dir.is_none() {
            let log_dir = Self::project_dirs().map_or_else(
                || config_dir.to_path_buf(),
                |dirs| dirs.data_local_dir().to_path_buf(),
            );
            settings.log_dir = Some(log_dir);
        }

        Ok(Self { settings, catalog })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.settings.log_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
