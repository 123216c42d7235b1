//! Configuration module unit tests

use aiapiagent::config::CatalogFile;
use aiapiagent::config::settings::Settings;
use aiapiagent::models::HttpMethod;
use std::env;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Environment variables are process-wide; tests touching them run one at a time
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "OPENAI_TEMPERATURE",
    "OPENAI_MAX_TOKENS",
    "OPENAI_JSON_MODE",
    "REASONING_TIMEOUT",
    "SERVER_HOST",
    "SERVER_PORT",
    "TARGET_API_BASE_URL",
    "TARGET_API_TIMEOUT",
    "FIX_CONFIDENCE_THRESHOLD",
    "MIN_INTENT_CONFIDENCE",
    "OPERATOR_API_KEY",
    "OPERATOR_KEY_HEADER",
    "CORS_ENABLED",
    "RUST_LOG",
    "LOG_FORMAT",
    "CATALOG_PATH",
];

/// Setup test environment variables
fn setup_test_env() {
    cleanup_test_env();
    env::set_var("OPENAI_API_KEY", "sk-test-key-12345678901234567890");
    env::set_var("TARGET_API_BASE_URL", "http://localhost:3000/");
    env::set_var("SERVER_HOST", "127.0.0.1");
    env::set_var("SERVER_PORT", "8090");
    env::set_var("RUST_LOG", "info");
    env::set_var("LOG_FORMAT", "text");
}

/// Clean up test environment variables
fn cleanup_test_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_settings_creation_with_valid_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    setup_test_env();

    let settings = Settings::new().unwrap();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8090);
    assert_eq!(settings.target_base_url(), "http://localhost:3000");
    assert_eq!(settings.target_api.timeout, 30);
    assert_eq!(settings.reasoning.model, "gpt-4");
    assert_eq!(settings.reasoning.max_tokens, 500);
    assert!((settings.reasoning.temperature - 0.1).abs() < f32::EPSILON);
    assert!(!settings.reasoning.json_mode);
    assert_eq!(settings.agent.fix_confidence_threshold, 0.5);
    assert_eq!(settings.agent.min_intent_confidence, 0.5);
    assert!(settings.security.operator_api_key.is_none());
    assert_eq!(settings.security.operator_key_header, "X-Operator-Key");

    cleanup_test_env();
}

#[test]
fn test_settings_creation_missing_api_key() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    setup_test_env();
    env::remove_var("OPENAI_API_KEY");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("OPENAI_API_KEY"));

    cleanup_test_env();
}

#[test]
fn test_settings_creation_missing_target() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    setup_test_env();
    env::remove_var("TARGET_API_BASE_URL");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("TARGET_API_BASE_URL"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_errors() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let cases = [
        ("SERVER_PORT", "0"),
        ("SERVER_PORT", "not-a-port"),
        ("TARGET_API_BASE_URL", "ftp://example.com"),
        ("FIX_CONFIDENCE_THRESHOLD", "1.2"),
        ("MIN_INTENT_CONFIDENCE", "abc"),
        ("TARGET_API_TIMEOUT", "0"),
        ("LOG_FORMAT", "xml"),
        ("RUST_LOG", "verbose"),
    ];

    for (key, value) in cases {
        setup_test_env();
        env::set_var(key, value);
        assert!(Settings::new().is_err(), "{}={} should be rejected", key, value);
    }

    cleanup_test_env();
}

#[test]
fn test_operator_key_from_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    setup_test_env();
    env::set_var("OPERATOR_API_KEY", "op-secret");
    env::set_var("FIX_CONFIDENCE_THRESHOLD", "0.7");

    let settings = Settings::new().unwrap();
    assert_eq!(settings.security.operator_api_key.as_deref(), Some("op-secret"));
    assert_eq!(settings.agent.fix_confidence_threshold, 0.7);

    cleanup_test_env();
}

#[test]
fn test_catalog_file_load() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "title": "Shop API",
            "endpoints": [
                {{"method": "POST", "path": "/api/categories", "summary": "Create a category",
                  "requiredParams": ["name", "slug"], "authRequired": true}},
                {{"method": "GET", "path": "/api/categories/{{id}}"}}
            ]
        }}"#
    )
    .unwrap();

    let catalog = CatalogFile::load(file.path()).unwrap();
    assert_eq!(catalog.endpoints.len(), 2);
    assert_eq!(catalog.endpoints[0].method, HttpMethod::Post);
    assert_eq!(catalog.endpoints[0].required_params, vec!["name", "slug"]);
    assert!(catalog.endpoints[0].auth_required);
    assert_eq!(catalog.endpoints[1].path_params(), vec!["id"]);
}

#[test]
fn test_catalog_file_rejects_bad_paths() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"endpoints": [{{"method": "GET", "path": "api/categories"}}]}}"#).unwrap();
    assert!(CatalogFile::load(file.path()).is_err());

    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"endpoints": [{{"method": "FETCH", "path": "/api/categories"}}]}}"#).unwrap();
    assert!(CatalogFile::load(file.path()).is_err());
}

#[test]
fn test_catalog_default_from_env_path() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_test_env();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"endpoints": [{{"method": "DELETE", "path": "/api/orders/{{id}}"}}]}}"#).unwrap();
    env::set_var("CATALOG_PATH", file.path());

    let catalog = CatalogFile::load_default().unwrap();
    assert_eq!(catalog.endpoints.len(), 1);
    assert_eq!(catalog.endpoints[0].method, HttpMethod::Delete);

    cleanup_test_env();
}
