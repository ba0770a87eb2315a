//! Resolved application configuration.

use config::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tunniplaan_api::{DEFAULT_TAHVEL_URL, TahvelConfig};
use tunniplaan_shared::session_cache::{SESSION_FILE_NAME, get_default_app_dir};
use tunniplaan_shared::{DEFAULT_USER_AGENT, SessionCacheStore, TransportConfig};
use tunniplaan_tara::config::{DEFAULT_BROKER_URL, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use tunniplaan_tara::{IdCode, TaraConfig};

use super::file::ConfigFile;
use super::{DEFAULT_SESSION_INIT_URL, ID_CODE_ENV, SESSION_INIT_URL_ENV, TUNNIPLAAN_CONFIG_PATH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// National ID code used for the Smart-ID login
    pub id_code: Option<String>,
    /// Relying-party URL that starts a TARA session
    pub session_init_url: String,
    pub tara_base_url: String,
    pub tahvel_base_url: String,
    pub user_agent: String,
    /// Where a completed login is cached
    pub session_file: PathBuf,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub config_path: String,
}

impl AppConfig {
    /// Load configuration from file, the process environment and a `.env`
    /// file found in the working directory or one of its parents.
    pub fn load<P: AsRef<Path>>(custom_config_path: Option<P>) -> Result<Self, ConfigError> {
        Self::load_with_env_file(custom_config_path, None)
    }

    /// Like [`AppConfig::load`], reading `.env` values from `env_file` when given.
    /// Variables set in the process environment win over the file.
    pub(crate) fn load_with_env_file<P: AsRef<Path>>(
        custom_config_path: Option<P>,
        env_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(custom_config_path);
        let config_file = ConfigFile::load_from(&config_path)?;
        let dotenv = read_env_file(env_file)?;
        Self::build(config_path, config_file, |key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        })
    }

    /// Build an AppConfig from the file contents, with `env` consulted for
    /// overrides.
    pub(crate) fn build(
        path: PathBuf,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let session_file = match file.session_file {
            Some(session_file) => PathBuf::from(session_file),
            None => get_default_app_dir()
                .map_err(|e| ConfigError::Message(e.to_string()))?
                .join(SESSION_FILE_NAME),
        };

        Ok(AppConfig {
            id_code: non_empty(env(ID_CODE_ENV)).or(file.id_code),
            session_init_url: non_empty(env(SESSION_INIT_URL_ENV))
                .or(file.session_init_url)
                .unwrap_or_else(|| DEFAULT_SESSION_INIT_URL.into()),
            tara_base_url: file
                .tara_base_url
                .unwrap_or_else(|| DEFAULT_BROKER_URL.into()),
            tahvel_base_url: file
                .tahvel_base_url
                .unwrap_or_else(|| DEFAULT_TAHVEL_URL.into()),
            user_agent: file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            session_file,
            poll_interval: file
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_max_attempts: file.poll_max_attempts.unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS),
            config_path: path.display().to_string(),
        })
    }

    /// Apply the `--id-code` flag, which wins over file and environment.
    pub fn with_id_code(mut self, id_code: Option<String>) -> Self {
        if let Some(id_code) = non_empty(id_code) {
            self.id_code = Some(id_code);
        }
        self
    }

    /// Get the config file path, using custom path or default.
    pub fn get_config_path<P: AsRef<Path>>(path: Option<P>) -> PathBuf {
        match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => dirs::home_dir()
                .unwrap_or_default()
                .join(TUNNIPLAAN_CONFIG_PATH),
        }
    }

    /// The configured ID code, validated.
    pub fn require_id_code(&self) -> Result<IdCode, String> {
        let raw = self.id_code.as_deref().ok_or_else(|| {
            format!(
                "No ID code configured. Pass --id-code, set {} (environment or .env) or add id_code to {}",
                ID_CODE_ENV, self.config_path
            )
        })?;
        raw.parse::<IdCode>().map_err(|e| e.to_string())
    }

    pub fn tara_config(&self, quiet: bool) -> TaraConfig {
        TaraConfig::new(self.session_init_url.clone())
            .with_broker_url(self.tara_base_url.clone())
            .with_poll_interval(self.poll_interval)
            .with_max_poll_attempts(self.poll_max_attempts)
            .with_quiet(quiet)
    }

    pub fn tahvel_config(&self) -> TahvelConfig {
        TahvelConfig::new().with_base_url(self.tahvel_base_url.clone())
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::default().with_user_agent(self.user_agent.clone())
    }

    pub fn session_store(&self) -> SessionCacheStore {
        SessionCacheStore::new(&self.session_file)
    }
}

/// Key/value pairs of a `.env` file. A missing file yields no values.
pub(crate) fn read_env_file(path: Option<&Path>) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match path {
        Some(path) => dotenvy::from_path_iter(path),
        None => dotenvy::dotenv_iter(),
    };
    let iter = match iter {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => {
            return Err(ConfigError::Message(format!(
                "Failed to read .env file: {}",
                e
            )));
        }
    };
    iter.map(|item| {
        item.map_err(|e| ConfigError::Message(format!("Failed to parse .env file: {}", e)))
    })
    .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
