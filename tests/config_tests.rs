use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use text2sql::routers::{Router, RouterSettings};
use text2sql::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.default_model, None);
    assert_eq!(config.default_router, "openrouter");
    assert_eq!(config.spider_path, PathBuf::from("spider_data"));
    assert_eq!(config.dev_filename, "dev.json");
    assert_eq!(config.tables_filename, "tables.json");
    assert_eq!(config.timeout_seconds, 120);
    assert!(config.routers.is_empty());
}

#[test]
fn test_load_from_explicit_path() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
default_model = "deepseek-chat"
default_router = "deepseek"
spider_path = "/data/spider"
timeout_seconds = 30
"#,
    )
    .expect("write config");

    let config = Config::load(Some(&config_path)).expect("config loads");
    assert_eq!(config.default_model.as_deref(), Some("deepseek-chat"));
    assert_eq!(config.default_router, "deepseek");
    assert_eq!(config.spider_path, PathBuf::from("/data/spider"));
    assert_eq!(config.timeout_seconds, 30);
    // Unspecified fields fall back to defaults
    assert_eq!(config.dev_filename, "dev.json");
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope.toml");
    assert!(Config::load(Some(&missing)).is_err());
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "default_router = [not toml").expect("write config");
    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_dataset_paths_derive_from_spider_path() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
spider_path = "spider"
gold_sql_filename = "gold.sql"
database_dir = "db"
"#,
    )
    .expect("write config");

    let config = Config::load(Some(&config_path)).expect("config loads");
    assert_eq!(config.dev_path(), PathBuf::from("spider/dev.json"));
    assert_eq!(config.tables_path(), PathBuf::from("spider/tables.json"));
    assert_eq!(config.gold_sql_path(), PathBuf::from("spider/gold.sql"));
    assert_eq!(config.database_path(), PathBuf::from("spider/db"));
}

#[test]
fn test_router_overrides_apply_to_settings() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[routers.openrouter]
base_url = "http://localhost:8080/v1"

[routers.openrouter.default_headers]
"HTTP-Referer" = "https://example.org"
"#,
    )
    .expect("write config");

    let config = Config::load(Some(&config_path)).expect("config loads");

    let settings = RouterSettings::for_router(Router::OpenRouter, &config);
    assert_eq!(settings.base_url, "http://localhost:8080/v1");
    assert_eq!(
        settings.default_headers.get("HTTP-Referer").map(String::as_str),
        Some("https://example.org")
    );
    // The API key env var is not overridable
    assert_eq!(settings.api_key_env, "OPENROUTER_API_KEY");

    // Routers without overrides keep their built-in settings
    let deepseek = RouterSettings::for_router(Router::DeepSeek, &config);
    assert_eq!(deepseek.base_url, "https://api.deepseek.com/v1");
}
