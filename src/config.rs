//! Configuration file handling.
//!
//! The configuration file is stored at `$ROSTER_HOME/config.json` and holds the default output
//! format and the label sheet geometry.

use crate::files::OutputFormat;
use crate::labels::LabelLayout;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "roster";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$ROSTER_HOME` and from there it loads `$ROSTER_HOME/config.json`. A home directory
/// without a config file behaves as if the file held the defaults.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and writes a `config.json` holding the default settings. An
    /// existing `config.json` is replaced.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the roster home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Loads `config.json` from `home`. When the file (or the whole directory) is missing, the
    /// defaults are used. A file that exists but cannot be parsed is an error.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let root = home.into();
        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at '{}', using defaults",
                config_path.display()
            );
            ConfigFile::default()
        };
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output_format(&self) -> OutputFormat {
        self.config_file.output_format
    }

    pub fn label_layout(&self) -> &LabelLayout {
        &self.config_file.label
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "roster",
///   "config_version": 1,
///   "output_format": "xlsx",
///   "label": { "rows": 4, "font_size_pt": 10.0 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "roster"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Format of the report files when the command line does not choose one
    #[serde(default)]
    output_format: OutputFormat,

    /// Label sheet geometry. Missing fields take their default values.
    #[serde(default)]
    label: LabelLayout,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            output_format: OutputFormat::default(),
            label: LabelLayout::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and validates it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, if `app_name` is wrong or if the
    /// label layout is unusable.
    async fn load(path: &Path) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config
            .label
            .validate()
            .with_context(|| format!("Invalid label layout in {}", path.display()))?;

        Ok(config)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
