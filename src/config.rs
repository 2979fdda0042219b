use crate::constants::{
    DEFAULT_LOOKUP_CHUNK_SIZE, DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_LOOKUP_URL, DEFAULT_OUTPUT_DIR,
};
use crate::error::{AnnotateError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "var_annot.toml";
pub const LOOKUP_URL_ENV: &str = "VAR_ANNOT_LOOKUP_URL";
pub const OUTPUT_DIR_ENV: &str = "VAR_ANNOT_OUTPUT_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub url: String,
    pub timeout_seconds: u64,
    /// Keys per request; 0 sends everything in one request
    pub chunk_size: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOOKUP_URL.to_string(),
            timeout_seconds: DEFAULT_LOOKUP_TIMEOUT_SECS,
            chunk_size: DEFAULT_LOOKUP_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Cell text written when the service has no frequency for a variant
    pub missing_value: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            missing_value: String::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from `var_annot.toml` when present,
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnnotateError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(LOOKUP_URL_ENV) {
            if !url.trim().is_empty() {
                self.lookup.url = url;
            }
        }
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.output.dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookup.url.trim().is_empty() {
            return Err(AnnotateError::Config("lookup.url must not be empty".into()));
        }
        if self.lookup.timeout_seconds == 0 {
            return Err(AnnotateError::Config(
                "lookup.timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
