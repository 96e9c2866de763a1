use super::*;

fn serve_ready() -> Config {
    let mut config = Config::default();
    config.messenger.validation_token = "verify-me".into();
    config.messenger.page_access_token = "page-token".into();
    config.nlu.access_token = "nlu-token".into();
    config
}

#[test]
fn test_default_config_validates() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_defaults_match_reference_deployment() {
    let config = Config::default();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.webhook_path, "/webhook");
    assert_eq!(config.messenger.graph_api_version, "v2.6");
    assert_eq!(config.nlu.version, "20150910");
    assert_eq!(config.nlu.lang, "en");
    assert_eq!(config.nlu.timeout_secs, 20);
    assert_eq!(config.nlu.fallback_reply, DEFAULT_FALLBACK_REPLY);
}

#[test]
fn test_invalid_zero_port() {
    let mut config = Config::default();
    config.server.port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_webhook_path() {
    let mut config = Config::default();
    config.server.webhook_path = "webhook".into();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("webhookPath"));
}

#[test]
fn test_route_pattern_webhook_path_rejected() {
    for path in ["/:hook", "/*rest", "/hooks/{id}", "/a}b"] {
        let mut config = Config::default();
        config.server.webhook_path = path.into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("webhookPath"), "path {path}");
    }

    let mut config = Config::default();
    config.server.webhook_path = "/hooks/messenger-v2".into();
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_zero_timeout() {
    let mut config = Config::default();
    config.nlu.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_huge_timeout() {
    let mut config = Config::default();
    config.messenger.timeout_secs = 3600;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_base_url() {
    let mut config = Config::default();
    config.nlu.base_url = "not a url".into();
    assert!(config.validate().is_err());

    config.nlu.base_url = "ftp://example.com".into();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn test_empty_lang_rejected() {
    let mut config = Config::default();
    config.nlu.lang = "  ".into();
    assert!(config.validate().is_err());
}

#[test]
fn test_serve_requires_tokens() {
    let config = Config::default();
    let err = config.validate_for_serve().unwrap_err();
    assert!(err.to_string().contains("validationToken"));

    let mut config = serve_ready();
    config.messenger.page_access_token.clear();
    let err = config.validate_for_serve().unwrap_err();
    assert!(err.to_string().contains("pageAccessToken"));

    let mut config = serve_ready();
    config.nlu.access_token.clear();
    let err = config.validate_for_serve().unwrap_err();
    assert!(err.to_string().contains("nlu.accessToken"));

    assert!(serve_ready().validate_for_serve().is_ok());
}

#[test]
fn test_messages_url() {
    let mut config = Config::default();
    assert_eq!(
        config.messenger.messages_url(),
        "https://graph.facebook.com/v2.6/me/messages"
    );
    config.messenger.graph_api_base = "http://127.0.0.1:9999/".into();
    config.messenger.graph_api_version = "v19.0".into();
    assert_eq!(
        config.messenger.messages_url(),
        "http://127.0.0.1:9999/v19.0/me/messages"
    );
}

#[test]
fn test_camel_case_keys_deserialize() {
    let json = serde_json::json!({
        "server": {"port": 9000, "webhookPath": "/hook"},
        "messenger": {"validationToken": "v", "pageAccessToken": "p", "graphApiVersion": "v3.0"},
        "nlu": {"accessToken": "n", "lang": "zh-TW", "timeoutSecs": 5}
    });
    let config: Config = serde_json::from_value(json).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.webhook_path, "/hook");
    assert_eq!(config.messenger.validation_token, "v");
    assert_eq!(config.messenger.graph_api_version, "v3.0");
    assert_eq!(config.nlu.lang, "zh-TW");
    assert_eq!(config.nlu.timeout_secs, 5);
    assert_eq!(config.nlu.version, "20150910");
}

#[test]
fn test_debug_redacts_secrets() {
    let config = serve_ready();
    let debug = format!("{:?}", config);
    assert!(!debug.contains("verify-me"));
    assert!(!debug.contains("page-token"));
    assert!(!debug.contains("nlu-token"));
    assert!(debug.contains("[REDACTED]"));
    // app secret is unset
    assert!(debug.contains("[empty]"));
}
