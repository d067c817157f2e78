use super::{apply_env, apply_file, Settings};

use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_service() {
    let settings = Settings::default();
    assert_eq!(
        settings.endpoint().expect("url").as_str(),
        "http://localhost:5000/api/process-claim"
    );
    assert_eq!(settings.request_timeout().as_secs(), 30);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
adjudication_url = "https://claims.example.test/api/process-claim"
request_timeout_secs = "5"
log_filter = "debug"
"#,
    )
    .expect("flat table");
    assert_eq!(
        settings.adjudication_url,
        "https://claims.example.test/api/process-claim"
    );
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn malformed_file_is_ignored_and_reported() {
    let mut settings = Settings::default();
    let err = apply_file(&mut settings, "request_timeout_secs = 5\n[nested]\nkey = 1")
        .expect_err("nested table");
    assert!(format!("{err:#}").contains("expected a flat table of strings"));
    assert_eq!(settings, Settings::default());
}

#[test]
fn prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env(&[
            ("ADJUDICATION_URL", "http://plain.test/claims"),
            ("APP__ADJUDICATION_URL", "http://prefixed.test/claims"),
        ]),
    );
    assert_eq!(settings.adjudication_url, "http://prefixed.test/claims");
}

#[test]
fn unparseable_timeout_override_is_ignored() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]));
    assert_eq!(settings.request_timeout_secs, 30);

    apply_env(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "12")]));
    assert_eq!(settings.request_timeout_secs, 12);
}

#[test]
fn zero_timeout_is_rejected() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "0")]));
    assert_eq!(settings.request_timeout_secs, 30);

    apply_file(&mut settings, "request_timeout_secs = \"0\"").expect("flat table");
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn invalid_url_is_reported_with_context() {
    let settings = Settings {
        adjudication_url: "not a url".to_string(),
        ..Settings::default()
    };
    let err = settings.endpoint().expect_err("invalid");
    assert!(err.to_string().contains("invalid adjudication url 'not a url'"));
}
