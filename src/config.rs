//! Runtime configuration - resolved once at start-up and injected
//!
//! Precedence: built-in defaults < `~/.imagegen/config.yaml` < environment.
//! The endpoint follows the model unless set explicitly; `IMAGEGEN_MODEL`
//! drops an endpoint taken from the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONFIG_DIR_NAME, CREDENTIAL_ENV_VARS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, PROVIDER_BASE_URL,
};
use crate::models::{Credential, Theme};

/// Optional settings file; every field may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub theme: Option<Theme>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Missing file is not an error; a malformed one is
    pub fn load(path: &Path) -> Result<FileConfig> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Option<Credential>,
    pub model: String,
    pub endpoint: String,
    pub download_dir: PathBuf,
    pub theme: Theme,
    /// Terminal's own theme, what `Theme::System` resolves to
    pub system_theme: Theme,
    pub request_timeout: Duration,
    pub log_level: tracing::Level,
    pub config_dir: PathBuf,
}

impl Config {
    /// Load `.env`, the config file and the process environment
    pub fn load() -> Result<Config> {
        // A missing .env is the normal case
        let _ = dotenv::dotenv();

        let config_dir = default_config_dir();
        let file = FileConfig::load(&config_dir.join("config.yaml"))?;
        let env: HashMap<String, String> = std::env::vars().collect();
        Ok(Config::resolve(file, &env, config_dir))
    }

    /// Merge file settings with an environment snapshot
    pub fn resolve(file: FileConfig, env: &HashMap<String, String>, config_dir: PathBuf) -> Config {
        let credential = CREDENTIAL_ENV_VARS
            .iter()
            .find_map(|key| env.get(*key).and_then(|v| Credential::new(v.as_str())));

        let env_model = env.get("IMAGEGEN_MODEL").cloned();
        let model_from_env = env_model.is_some();
        let model = env_model
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // A model set in the environment outranks an endpoint from the file
        let file_endpoint = if model_from_env { None } else { file.endpoint };
        let endpoint = env
            .get("IMAGEGEN_ENDPOINT")
            .cloned()
            .or(file_endpoint)
            .unwrap_or_else(|| endpoint_for(&model));

        let download_dir = env
            .get("IMAGEGEN_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or(file.download_dir)
            .map(|dir| expand_home(&dir))
            .unwrap_or_else(default_download_dir);

        let log_level = file
            .log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::INFO);

        Config {
            credential,
            model,
            endpoint,
            download_dir,
            theme: file.theme.unwrap_or_default(),
            system_theme: Theme::from_colorfgbg(env.get("COLORFGBG").map(String::as_str)),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            log_level,
            config_dir,
        }
    }
}

/// Router URL for a model id
pub fn endpoint_for(model: &str) -> String {
    format!("{}/{}", PROVIDER_BASE_URL, model.trim_matches('/'))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
