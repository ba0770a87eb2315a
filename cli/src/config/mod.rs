//! Configuration management for the tunniplaan CLI.
//!
//! Settings are read from `~/.tunniplaan/config.toml`, then overridden by
//! environment variables (a `.env` file fills in any the process lacks),
//! then by command-line flags.

mod app;
mod file;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

pub use app::AppConfig;
#[cfg(test)]
use app::read_env_file;
pub use file::ConfigFile;

// Constants
pub const TUNNIPLAAN_CONFIG_PATH: &str = ".tunniplaan/config.toml";
pub const DEFAULT_SESSION_INIT_URL: &str = "https://tahvel.edu.ee/hois_back/taraLogin";

/// Environment variable holding the national ID code
pub const ID_CODE_ENV: &str = "ID_CODE";
pub const SESSION_INIT_URL_ENV: &str = "TUNNIPLAAN_SESSION_INIT_URL";
