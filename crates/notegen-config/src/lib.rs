use notegen_engine::{
    CommandGenerator, DEFAULT_LANGUAGE, GenerationSettings, ModelTier, OutputFormat, UpscOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// External program that produces HTML fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl GeneratorConfig {
    pub fn build(&self) -> CommandGenerator {
        CommandGenerator::new(self.command.clone(), self.args.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub draft_path: PathBuf,
    pub model: ModelTier,
    pub language: String,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
    /// Only read for `format = "upsc-answer"`
    pub upsc: UpscOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            draft_path: Self::default_draft_path(),
            model: ModelTier::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            format: OutputFormat::default(),
            generator: None,
            upsc: UpscOptions::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the draft location
        config.draft_path = Self::expand_path(&config.draft_path).unwrap_or(config.draft_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The stored config, or defaults when there is no config file yet.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/notegen");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn default_draft_path() -> PathBuf {
        let data_dir = shellexpand::tilde("~/.local/share/notegen");
        PathBuf::from(data_dir.as_ref()).join("draft.html")
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model,
            language: self.language.clone(),
            format: self.format,
            upsc: self.upsc.clone(),
        }
    }

    /// Log file kept next to the draft.
    pub fn log_path(&self) -> PathBuf {
        self.draft_path.with_file_name("notegen.log")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
