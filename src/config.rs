use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    env, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use crate::translate::{
    DEFAULT_ENDPOINT, GoogleTranslator, Language, TranslateError, Translator, Unconfigured,
    default_language, language_by_code,
};

const QUALIFIER: &str = "net.roblillack";
const ORGANIZATION: &str = "Tandem";
const APPLICATION: &str = "tandem";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "tandem.log";

/// Checked in order; the first non-empty value wins over the config file.
pub const API_KEY_VARS: [&str; 2] = ["TANDEM_API_KEY", "GOOGLE_TRANSLATE_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown target language '{0}' (run `tandem languages` for the list)")]
    UnknownLanguage(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub target_language: String,
    pub translator: TranslatorConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: default_language().code.to_string(),
            translator: TranslatorConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_log_path() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
        .unwrap_or_else(|| env::temp_dir().join(LOG_FILE_NAME))
}

impl Config {
    /// Reads the config file at `path`, or at the default location when no
    /// path is given. Only a missing default file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => match config_file_path() {
                Some(path) => match Self::load_file(&path) {
                    Err(ConfigError::Read { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        Ok(Self::default())
                    }
                    other => other,
                },
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lets an API key from the environment override the configured one.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if key.is_some() {
            self.translator.api_key = key;
        }
    }

    pub fn target(&self) -> Result<Language, ConfigError> {
        language_by_code(&self.target_language)
            .ok_or_else(|| ConfigError::UnknownLanguage(self.target_language.clone()))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.translator
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.translator.timeout_secs.max(1))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(default_log_path)
    }

    /// The configured backend, or [`Unconfigured`] when there is no key.
    pub fn translator(&self) -> Result<Box<dyn Translator>, TranslateError> {
        match self.api_key() {
            Some(key) => Ok(Box::new(GoogleTranslator::new(
                key,
                self.translator.endpoint.as_str(),
                self.timeout(),
            )?)),
            None => Ok(Box::new(Unconfigured)),
        }
    }
}
