use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, time::Duration};

pub const CONFIG_PATH_VAR: &str = "NOTES_CLIENT_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for every endpoint, e.g. `http://localhost:8080/api`
    pub base_url: String,
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    #[serde(default)]
    pub no_proxy: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Drop a load result once a newer load has started.
    #[serde(default)]
    pub ignore_stale_loads: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("no config file among '{tried}' and NOTES_API_* variables are unusable: {source}")]
    Env { tried: String, source: envy::Error },
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Builds the config from `NOTES_API_*` and `NOTES_SESSION_*` variables.
    pub fn from_env_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)> + Clone,
    {
        let api = envy::prefixed("NOTES_API_").from_iter(vars.clone())?;
        let session = envy::prefixed("NOTES_SESSION_").from_iter(vars)?;
        Ok(Self { api, session })
    }
}

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const EXAMPLE_CONFIG_FILE: &str = "config.example.yaml";

/// Config files to try, most specific first, without duplicates.
fn candidate_files(explicit: Option<String>) -> Vec<String> {
    let mut files: Vec<String> = explicit.into_iter().collect();
    for fallback in [DEFAULT_CONFIG_FILE, EXAMPLE_CONFIG_FILE] {
        if !files.iter().any(|f| f == fallback) {
            files.push(fallback.to_string());
        }
    }
    files
}

pub fn load_config() -> Result<Config, ConfigError> {
    let files = candidate_files(env::var(CONFIG_PATH_VAR).ok());

    if let Some(path) = files.iter().find(|f| Path::new(f.as_str()).exists()) {
        if path == EXAMPLE_CONFIG_FILE {
            tracing::warn!(
                "Reading notes API settings from '{}', copy it to '{}' and point it at your server",
                EXAMPLE_CONFIG_FILE,
                DEFAULT_CONFIG_FILE
            );
        } else if path != &files[0] {
            tracing::warn!("'{}' is missing, reading '{}' instead", files[0], path);
        }
        return Config::from_file(path);
    }

    // No file at all, NOTES_API_* variables must carry everything
    tracing::info!("No client config file present, reading NOTES_API_* variables");
    let vars: Vec<(String, String)> = env::vars().collect();
    Config::from_env_iter(vars)
        .inspect(|cfg| tracing::info!("Notes API configured from environment: {}", cfg.api.base_url))
        .map_err(|source| ConfigError::Env {
            tried: files.join("', '"),
            source,
        })
}
