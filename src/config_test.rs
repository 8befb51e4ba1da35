use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_builtin_policies() {
    let config = ResilienceConfig::from_lookup(lookup_from(&[]));
    assert_eq!(config.policies.general.max_attempts, 3);
    assert_eq!(config.policies.general.base_delay, Duration::from_millis(1000));
    assert_eq!(config.policies.general.max_delay, Duration::from_millis(10_000));
    assert_eq!(config.policies.ai_service.base_delay, Duration::from_millis(2000));
    assert_eq!(config.policies.ai_service.max_delay, Duration::from_millis(15_000));
    assert_eq!(config.policies.ai_service.rate_limit_max_delay, Duration::from_millis(60_000));
    assert_eq!(config.policies.general.timeout, Duration::from_millis(30_000));
    assert_eq!(config.offline_queue_key, DEFAULT_OFFLINE_QUEUE_KEY);
}

#[test]
fn overrides_apply_per_policy() {
    let config = ResilienceConfig::from_lookup(lookup_from(&[
        ("ASSIST_GENERAL_MAX_ATTEMPTS", "5"),
        ("ASSIST_AI_BASE_DELAY_MS", "250"),
        ("ASSIST_REQUEST_TIMEOUT_MS", "1500"),
        ("ASSIST_OFFLINE_QUEUE_KEY", "custom.queue"),
    ]));
    assert_eq!(config.policies.general.max_attempts, 5);
    assert_eq!(config.policies.ai_service.max_attempts, 3);
    assert_eq!(config.policies.ai_service.base_delay, Duration::from_millis(250));
    assert_eq!(config.policies.general.timeout, Duration::from_millis(1500));
    assert_eq!(config.policies.ai_service.timeout, Duration::from_millis(1500));
    assert_eq!(config.offline_queue_key, "custom.queue");
}

#[test]
fn invalid_values_fall_back() {
    let config = ResilienceConfig::from_lookup(lookup_from(&[
        ("ASSIST_GENERAL_MAX_ATTEMPTS", "many"),
        ("ASSIST_AI_MAX_DELAY_MS", "-4"),
        ("ASSIST_OFFLINE_QUEUE_KEY", "   "),
    ]));
    assert_eq!(config.policies.general.max_attempts, DEFAULT_GENERAL_MAX_ATTEMPTS);
    assert_eq!(config.policies.ai_service.max_delay, Duration::from_millis(DEFAULT_AI_MAX_DELAY_MS));
    assert_eq!(config.offline_queue_key, DEFAULT_OFFLINE_QUEUE_KEY);
}

#[test]
fn policy_names_survive_overrides() {
    let config = ResilienceConfig::from_lookup(lookup_from(&[("ASSIST_AI_MAX_ATTEMPTS", "2")]));
    assert_eq!(config.policies.general.name, "general");
    assert_eq!(config.policies.ai_service.name, "ai_service");
}

#[test]
fn http_config_requires_base_url() {
    let err = HttpConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "ASSIST_API_BASE_URL".into() });
}

#[test]
fn http_config_rejects_non_http_url() {
    let err = HttpConfig::from_lookup(lookup_from(&[("ASSIST_API_BASE_URL", "ftp://x")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn http_config_resolves_indirect_key() {
    let config = HttpConfig::from_lookup(lookup_from(&[
        ("ASSIST_API_BASE_URL", "https://api.example.test/v1/"),
        ("ASSIST_API_KEY_ENV", "MY_TOKEN"),
        ("MY_TOKEN", "secret"),
        ("ASSIST_CONNECT_TIMEOUT_SECS", "3"),
    ]))
    .unwrap();
    assert_eq!(config.base_url, "https://api.example.test/v1");
    assert_eq!(config.api_key.as_deref(), Some("secret"));
    assert_eq!(config.connect_timeout_secs, 3);
}

#[test]
fn http_config_missing_indirect_key_names_the_var() {
    let err = HttpConfig::from_lookup(lookup_from(&[
        ("ASSIST_API_BASE_URL", "https://api.example.test"),
        ("ASSIST_API_KEY_ENV", "MY_TOKEN"),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "MY_TOKEN".into() });
}
