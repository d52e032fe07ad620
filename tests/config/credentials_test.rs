//! Secret resolution and redaction.

use outreach::config::Config;
use outreach::credentials::{ApiKey, Credentials};

#[test]
fn resolve_reads_configured_variables() {
    let config = Config::default();
    let creds = Credentials::resolve(&config, |key| match key {
        "X_API_KEY" => Some("pplx-research".to_owned()),
        "AWS_BEARER_TOKEN_BEDROCK" => Some("host-token".to_owned()),
        _ => None,
    })
    .expect("should resolve");

    assert_eq!(creds.research.expose(), "pplx-research");
    assert_eq!(creds.generation.as_ref().map(ApiKey::expose), Some("host-token"));
}

#[test]
fn missing_research_key_is_an_error() {
    let err = Credentials::resolve(&Config::default(), |_| None).expect_err("should fail");
    assert!(err.to_string().contains("X_API_KEY"));
}

#[test]
fn blank_values_count_as_missing() {
    let err = Credentials::resolve(&Config::default(), |_| Some("   ".to_owned()))
        .expect_err("blank research key should fail");
    assert!(err.to_string().contains("missing required credential"));

    let creds = Credentials::resolve(&Config::default(), |key| {
        (key == "X_API_KEY")
            .then(|| "k".to_owned())
            .or_else(|| Some(String::new()))
    })
    .expect("should resolve");
    assert!(creds.generation.is_none());
}

#[test]
fn custom_variable_names_are_honoured() {
    let mut config = Config::default();
    config.research.api_key_env = "PPLX_KEY".to_owned();
    let creds = Credentials::resolve(&config, |key| (key == "PPLX_KEY").then(|| "k".to_owned()))
        .expect("should resolve");
    assert_eq!(creds.research.expose(), "k");
}

#[test]
fn debug_output_redacts_secrets() {
    let creds = Credentials {
        research: ApiKey::new("pplx-supersecret"),
        generation: Some(ApiKey::new("host-supersecret")),
    };
    let rendered = format!("{creds:?}");
    assert!(!rendered.contains("supersecret"));
    assert!(rendered.contains("[REDACTED]"));
}
