//! Research client wire format and transport tests.

use std::time::Duration;

use serde_json::json;

use outreach::campaign::CampaignRequest;
use outreach::config::ResearchConfig;
use outreach::credentials::ApiKey;
use outreach::providers::research::{build_request, parse_response, research_query, ResearchClient};
use outreach::providers::{ProviderError, ResearchProvider};

use super::fake_upstream::{serve_once, serve_once_after};

fn request() -> CampaignRequest {
    CampaignRequest {
        company_name: "Northwind Freight".to_owned(),
        company_url: "https://northwind.example".to_owned(),
        company_description: "regional logistics carrier".to_owned(),
        receiver_name: "Dana".to_owned(),
        success_stories: "stories".to_owned(),
        services_list: "services".to_owned(),
        vendor_description: "an AI automation consultancy".to_owned(),
        sender_name: "Lee".to_owned(),
    }
}

fn client_for(endpoint: String, timeout_secs: u64) -> ResearchClient {
    let config = ResearchConfig {
        endpoint,
        timeout_secs,
        ..ResearchConfig::default()
    };
    match ResearchClient::new(&config, ApiKey::new("test-research-key")) {
        Ok(client) => client,
        Err(err) => panic!("client should build: {err}"),
    }
}

#[test]
fn research_query_embeds_company_and_vendor() {
    let query = research_query("https://acme.test", "anvils", "a consultancy");
    assert!(query.starts_with("Make a research about this company https://acme.test (anvils)"));
    assert!(query.ends_with("provided by our company (a consultancy)."));
}

#[test]
fn build_request_uses_fixed_sampling_configuration() {
    let req = build_request("sonar", "q".to_owned());
    let value = serde_json::to_value(&req).expect("request should serialize");
    assert_eq!(value["model"], "sonar");
    assert_eq!(value["messages"], json!([{"role": "user", "content": "q"}]));
    assert_eq!(value["temperature"], json!(0.2));
    assert_eq!(value["top_p"], json!(0.9));
    assert_eq!(value["top_k"], json!(0));
    assert_eq!(value["stream"], json!(false));
    assert_eq!(value["frequency_penalty"], json!(1.0));
    assert_eq!(value["return_images"], json!(false));
    assert_eq!(value["return_related_questions"], json!(false));
    assert_eq!(value["web_search_options"]["search_context_size"], "low");
}

#[test]
fn parse_response_reads_first_choice() {
    let body = json!({
        "id": "r1",
        "model": "sonar",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "They ship pallets."}},
            {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
        ],
        "citations": ["https://northwind.example"]
    });
    let research = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(research.as_str(), "They ship pallets.");
}

#[test]
fn parse_response_rejects_missing_choices() {
    let result = parse_response(&json!({"choices": []}).to_string());
    assert!(matches!(result, Err(ProviderError::Parse(msg)) if msg.contains("choices[0]")));

    let result = parse_response(&json!({"id": "x"}).to_string());
    assert!(matches!(result, Err(ProviderError::Parse(_))));
}

#[test]
fn parse_response_rejects_null_content() {
    let body = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
    let result = parse_response(&body.to_string());
    assert!(matches!(result, Err(ProviderError::Parse(msg)) if msg.contains("message.content")));
}

#[test]
fn parse_response_invalid_json() {
    assert!(parse_response("<html>bad gateway</html>").is_err());
}

#[tokio::test]
async fn client_posts_query_with_bearer_key() {
    let reply = json!({"choices": [{"message": {"content": "Research text"}}]}).to_string();
    let (base, captured) = serve_once("200 OK", &reply).await;
    let client = client_for(format!("{base}/chat/completions"), 5);

    let research = client.research(&request()).await.expect("research should succeed");
    assert_eq!(research.as_str(), "Research text");

    let seen = captured.await.expect("request should be captured");
    assert_eq!(seen.request_line(), "POST /chat/completions HTTP/1.1");
    assert_eq!(
        seen.header("authorization").as_deref(),
        Some("Bearer test-research-key")
    );
    let body = seen.json();
    assert_eq!(body["model"], "sonar");
    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(content.contains("https://northwind.example"));
    assert!(content.contains("regional logistics carrier"));
    assert!(content.contains("an AI automation consultancy"));
}

#[tokio::test]
async fn client_surfaces_non_success_status() {
    let (base, _captured) = serve_once("429 Too Many Requests", "{\"error\":\"slow down\"}").await;
    let client = client_for(base, 5);

    match client.research(&request()).await {
        Err(ProviderError::HttpStatus { status, .. }) => assert_eq!(status, 429),
        other => panic!("expected http status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn client_rejects_unexpected_shape() {
    let (base, _captured) = serve_once("200 OK", "{\"answer\":\"wrong shape\"}").await;
    let client = client_for(base, 5);
    assert!(matches!(
        client.research(&request()).await,
        Err(ProviderError::Parse(_))
    ));
}

#[tokio::test]
async fn client_times_out() {
    let (base, _captured) = serve_once_after("200 OK", "{}", Duration::from_secs(5)).await;
    let client = client_for(base, 1);

    match client.research(&request()).await {
        Err(err) => assert!(err.is_timeout(), "expected timeout, got: {err}"),
        Ok(_) => panic!("slow upstream should time out"),
    }
}
