use super::*;

const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";

fn raw_with_key() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.auth.jwt_signing_key = Some(TEST_KEY.to_string());
    raw
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_with_key();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_apply() {
    let settings = Settings::from_raw(raw_with_key()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert!(settings.database.url.is_none());
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.item_limit, DEFAULT_CACHE_ITEM_LIMIT);
    assert_eq!(settings.http.cache_max_age, Duration::from_secs(2_592_000));
    assert!(!settings.seed.sample_data);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw_with_key();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn cache_can_be_disabled_via_cli() {
    let mut raw = raw_with_key();
    raw.apply_serve_overrides(&ServeOverrides {
        cache_enabled: Some(false),
        cache_page_limit: Some(7),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.page_limit, 7);
}

#[test]
fn blank_database_url_selects_memory() {
    let mut raw = raw_with_key();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn signing_key_is_required() {
    let err = Settings::from_raw(RawSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "auth.jwt_signing_key",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.auth.jwt_signing_key = Some("short".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = raw_with_key();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_key();
    raw.database.max_connections = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "database.max_connections",
            ..
        })
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["primer"]);
    assert!(args.command.is_none());
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "primer",
        "serve",
        "--server-port",
        "9090",
        "--cache-enabled",
        "false",
        "--seed-sample-data",
        "true",
    ]);

    let Some(Command::Serve(serve)) = args.command else {
        panic!("expected serve command");
    };
    assert_eq!(serve.overrides.server_port, Some(9090));
    assert_eq!(serve.overrides.cache_enabled, Some(false));
    assert_eq!(serve.overrides.seed_sample_data, Some(true));
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "primer",
        "migrate",
        "--database-url",
        "postgres://localhost/primer",
    ]);

    let Some(Command::Migrate(migrate)) = args.command else {
        panic!("expected migrate command");
    };
    let mut raw = raw_with_key();
    raw.apply_migrate_overrides(&migrate);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.database.url.as_deref(),
        Some("postgres://localhost/primer")
    );
}
