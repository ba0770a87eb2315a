//! Configuration file structure and operations.

use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// The configuration file. Every key is optional.
///
/// ```toml
/// id_code = "38001010000"
/// session_init_url = "https://tahvel.edu.ee/hois_back/taraLogin"
/// tara_base_url = "https://tara.ria.ee"
/// tahvel_base_url = "https://tahvel.edu.ee/hois_back"
/// session_file = "/home/mari/.tunniplaan/session.toml"
/// poll_interval_ms = 3000
/// poll_max_attempts = 20
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub id_code: Option<String>,
    pub session_init_url: Option<String>,
    pub tara_base_url: Option<String>,
    pub tahvel_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub session_file: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub poll_max_attempts: Option<u32>,
}

impl ConfigFile {
    /// Load config file from disk. A missing file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(config_path.as_ref()) {
            Ok(content) => toml::from_str::<ConfigFile>(&content).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to parse config file {}: {}",
                    config_path.as_ref().display(),
                    e
                ))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Failed to read config file: {}",
                e
            ))),
        }
    }
}
