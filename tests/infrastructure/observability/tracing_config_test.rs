use dubrelay::infrastructure::observability::TracingConfig;
use dubrelay::presentation::config::LoggingSettings;

#[test]
fn given_default_config_when_created_then_environment_is_set() {
    let config = TracingConfig::default();
    assert!(!config.environment.is_empty());
}

#[test]
fn given_logging_level_when_building_from_settings_then_filter_starts_with_it() {
    let settings = LoggingSettings {
        level: "warn".to_string(),
        enable_json: false,
    };

    let config = TracingConfig::from_settings(&settings, "test");

    assert_eq!(config.environment, "test");
    assert!(config.default_filter.starts_with("warn,"));
    assert!(config.default_filter.contains("dubrelay=debug"));
}

#[test]
fn given_json_enabled_in_settings_when_building_then_json_format_is_used() {
    let settings = LoggingSettings {
        level: "info".to_string(),
        enable_json: true,
    };

    let config = TracingConfig::from_settings(&settings, "prod");

    assert!(config.json_format);
}
