//! Tests for configuration module.

use super::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
id_code = "49403136526"
session_init_url = "https://rp.example/login"
tara_base_url = "https://tara-test.ria.ee"
tahvel_base_url = "https://tahvel-test.edu.ee/hois_back"
user_agent = "tunniplaan-test"
session_file = "/tmp/tunniplaan/session.toml"
poll_interval_ms = 500
poll_max_attempts = 5
"#;

fn get_a_config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("config.toml")
}

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    env_of(&[])
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = get_a_config_path(&dir);

    let file = ConfigFile::load_from(&path).unwrap();
    assert_eq!(file, ConfigFile::default());

    let config = AppConfig::build(
        path,
        ConfigFile {
            session_file: Some("/tmp/s.toml".into()),
            ..Default::default()
        },
        no_env(),
    )
    .unwrap();
    assert_eq!(config.id_code, None);
    assert_eq!(config.session_init_url, DEFAULT_SESSION_INIT_URL);
    assert_eq!(config.tara_base_url, "https://tara.ria.ee");
    assert_eq!(config.tahvel_base_url, "https://tahvel.edu.ee/hois_back");
    assert_eq!(config.poll_interval, Duration::from_millis(3000));
    assert_eq!(config.poll_max_attempts, 20);
}

#[test]
fn test_file_values_are_used() {
    let dir = TempDir::new().unwrap();
    let path = get_a_config_path(&dir);
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let file = ConfigFile::load_from(&path).unwrap();
    let config = AppConfig::build(path.clone(), file, no_env()).unwrap();

    assert_eq!(config.id_code.as_deref(), Some("49403136526"));
    assert_eq!(config.session_init_url, "https://rp.example/login");
    assert_eq!(config.tara_base_url, "https://tara-test.ria.ee");
    assert_eq!(config.user_agent, "tunniplaan-test");
    assert_eq!(
        config.session_file,
        PathBuf::from("/tmp/tunniplaan/session.toml")
    );
    assert_eq!(config.poll_interval, Duration::from_millis(500));
    assert_eq!(config.poll_max_attempts, 5);
    assert_eq!(config.config_path, path.display().to_string());

    let tara = config.tara_config(true);
    assert_eq!(tara.poll_url(), "https://tara-test.ria.ee/auth/sid/poll");
    assert_eq!(tara.max_poll_attempts, 5);
}

#[test]
fn test_environment_overrides_file() {
    let file: ConfigFile = toml::from_str(FULL_CONFIG).unwrap();
    let config = AppConfig::build(
        PathBuf::from("/tmp/config.toml"),
        file,
        env_of(&[
            (ID_CODE_ENV, "38001010000"),
            (SESSION_INIT_URL_ENV, "https://other.example/login"),
        ]),
    )
    .unwrap();

    assert_eq!(config.id_code.as_deref(), Some("38001010000"));
    assert_eq!(config.session_init_url, "https://other.example/login");
}

#[test]
fn test_blank_environment_is_ignored() {
    let file: ConfigFile = toml::from_str(FULL_CONFIG).unwrap();
    let config = AppConfig::build(
        PathBuf::from("/tmp/config.toml"),
        file,
        env_of(&[(ID_CODE_ENV, "  ")]),
    )
    .unwrap();
    assert_eq!(config.id_code.as_deref(), Some("49403136526"));
}

#[test]
fn test_flag_overrides_environment() {
    let file: ConfigFile = toml::from_str(FULL_CONFIG).unwrap();
    let config = AppConfig::build(
        PathBuf::from("/tmp/config.toml"),
        file,
        env_of(&[(ID_CODE_ENV, "38001010000")]),
    )
    .unwrap()
    .with_id_code(Some("60001019906".into()));
    assert_eq!(config.id_code.as_deref(), Some("60001019906"));

    let unchanged = config.clone().with_id_code(None);
    assert_eq!(unchanged.id_code.as_deref(), Some("60001019906"));
}

#[test]
fn test_require_id_code() {
    let mut config = AppConfig::build(
        PathBuf::from("/tmp/config.toml"),
        toml::from_str(FULL_CONFIG).unwrap(),
        no_env(),
    )
    .unwrap();
    assert_eq!(config.require_id_code().unwrap().as_str(), "49403136526");

    config.id_code = Some("3800101".into());
    assert!(config.require_id_code().is_err());

    config.id_code = None;
    let err = config.require_id_code().unwrap_err();
    assert!(err.contains("--id-code"));
    assert!(err.contains(ID_CODE_ENV));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = get_a_config_path(&dir);
    std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();

    let err = ConfigFile::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_get_config_path() {
    let custom = AppConfig::get_config_path(Some("/etc/tunniplaan.toml"));
    assert_eq!(custom, PathBuf::from("/etc/tunniplaan.toml"));

    let default = AppConfig::get_config_path::<&str>(None);
    assert!(default.ends_with(TUNNIPLAAN_CONFIG_PATH));
}

#[test]
fn test_read_env_file() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    std::fs::write(
        &env_path,
        "# login\nID_CODE=38001010000\nTUNNIPLAAN_SESSION_INIT_URL=\"https://rp.example/login\"\n",
    )
    .unwrap();

    let values = read_env_file(Some(&env_path)).unwrap();
    assert_eq!(values.get(ID_CODE_ENV).map(String::as_str), Some("38001010000"));
    assert_eq!(
        values.get(SESSION_INIT_URL_ENV).map(String::as_str),
        Some("https://rp.example/login")
    );

    let missing = read_env_file(Some(&dir.path().join("absent.env"))).unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_load_takes_id_code_from_env_file() {
    if std::env::var(ID_CODE_ENV).is_ok() {
        // The process environment wins over .env
        return;
    }

    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, "ID_CODE=38001010000\n").unwrap();

    let config =
        AppConfig::load_with_env_file(Some(dir.path().join("missing.toml")), Some(&env_path))
            .unwrap();
    assert_eq!(config.id_code.as_deref(), Some("38001010000"));
    assert_eq!(config.require_id_code().unwrap().as_str(), "38001010000");
}

#[test]
fn test_default_session_file_lives_in_app_dir() {
    let config = AppConfig::build(
        PathBuf::from("/tmp/config.toml"),
        ConfigFile::default(),
        no_env(),
    )
    .unwrap();
    assert!(
        config
            .session_file
            .ends_with(PathBuf::from(".tunniplaan").join("session.toml"))
    );
    assert_eq!(config.session_store().path(), config.session_file.as_path());
}
