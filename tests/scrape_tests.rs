//! Integration tests for the description-retrieval flow
//!
//! These tests use wiremock to stand in for both the dealer origin and
//! the model endpoint, exercising fetch classification and the full
//! discovery-driven scrape end-to-end.

use serde_json::json;
use vdp_scout::config::Config;
use vdp_scout::llm::LlmClient;
use vdp_scout::{fetch, pipeline, ScrapeError};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A dealer page whose template is not in the registry, forcing the
/// dynamic discovery path.
const VDP_PAGE: &str = r#"<html><body>
    <h1 class="vehicle-title">2021 Toyota Camry</h1>
    <div class="listing">
      <div class="description-wrap">
        <h2 class="section-heading">Dealer Notes</h2>
        <div class="dealer-notes__text">A one-owner Camry in excellent condition.</div>
      </div>
    </div>
  </body></html>"#;

fn llm_client_for(server: &MockServer) -> LlmClient {
    LlmClient::new(Config {
        base_url: server.uri(),
        model: "test-model".to_string(),
        api_key: "test-key".to_string(),
    })
    .expect("client builds")
}

/// Builds a chat-completions response whose content is `content` and
/// whose usage reports `total_tokens`.
fn chat_response(content: &str, total_tokens: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"total_tokens": total_tokens}
    }))
}

#[tokio::test]
async fn test_fetch_404_yields_page_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vdp/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = fetch::build_http_client().unwrap();
    let err = fetch::fetch_page(&client, &format!("{}/vdp/1", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::PageNotFound { .. }));
}

#[tokio::test]
async fn test_fetch_other_http_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vdp/2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = fetch::build_http_client().unwrap();
    let err = fetch::fetch_page(&client, &format!("{}/vdp/2", server.uri()))
        .await
        .unwrap_err();

    match err {
        ScrapeError::RequestFailed { status, .. } => assert_eq!(status, 503),
        other => panic!("expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_connection_failure_is_transport_error() {
    // Nothing listens on port 1.
    let client = fetch::build_http_client().unwrap();
    let err = fetch::fetch_page(&client, "http://127.0.0.1:1/vdp")
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Transport { .. }));
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vdp/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VDP_PAGE))
        .mount(&server)
        .await;

    let client = fetch::build_http_client().unwrap();
    let body = fetch::fetch_page(&client, &format!("{}/vdp/3", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("Dealer Notes"));
}

#[tokio::test]
async fn test_discovery_driven_scrape_end_to_end() {
    let server = MockServer::start().await;

    // Dealer origin (the 127.0.0.1 host matches no registry pattern).
    Mock::given(method("GET"))
        .and(path("/vdp/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VDP_PAGE))
        .mount(&server)
        .await;

    // Stage A: heading selection. Matched on a phrase unique to its
    // system prompt.
    let heading_pick = json!({
        "tag": "h2",
        "class": "section-heading",
        "contents": "Dealer Notes"
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("heading components"))
        .respond_with(chat_response(&heading_pick.to_string(), 11))
        .mount(&server)
        .await;

    // Stage B: chain derivation from the heading's container div.
    let chains = json!([[{"tag": "div", "class": "dealer-notes__text"}]]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("list of lists"))
        .respond_with(chat_response(&chains.to_string(), 22))
        .mount(&server)
        .await;

    // Description isolation.
    let isolated = json!({"description": "A one-owner Camry in excellent condition."});
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("isolation assistant"))
        .respond_with(chat_response(&isolated.to_string(), 33))
        .mount(&server)
        .await;

    let llm = llm_client_for(&server);
    let vdp_url = format!("{}/vdp/42", server.uri());
    let (description, tokens_used) = pipeline::get_description(&vdp_url, &llm).await.unwrap();

    assert_eq!(description, "A one-owner Camry in excellent condition.");
    // Token costs from all three model calls are summed.
    assert_eq!(tokens_used, 11 + 22 + 33);
}

#[tokio::test]
async fn test_stage_a_no_match_is_a_graceful_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vdp/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VDP_PAGE))
        .mount(&server)
        .await;

    // The model decides no heading denotes a description section.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("heading components"))
        .respond_with(chat_response(&json!({"tag": "no_match"}).to_string(), 7))
        .mount(&server)
        .await;

    let llm = llm_client_for(&server);
    let vdp_url = format!("{}/vdp/7", server.uri());
    let (description, tokens_used) = pipeline::get_description(&vdp_url, &llm).await.unwrap();

    // Not an error: the caller sees the sentinel message and still pays
    // for the stage-A call.
    assert_eq!(description, pipeline::NO_SECTION_MESSAGE);
    assert_eq!(tokens_used, 7);
}

#[tokio::test]
async fn test_unreachable_model_endpoint_is_model_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vdp/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VDP_PAGE))
        .mount(&server)
        .await;

    // Point the LLM client at a dead port.
    let llm = LlmClient::new(Config {
        base_url: "http://127.0.0.1:1".to_string(),
        model: "test-model".to_string(),
        api_key: "test-key".to_string(),
    })
    .unwrap();

    let vdp_url = format!("{}/vdp/9", server.uri());
    let err = pipeline::get_description(&vdp_url, &llm).await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Llm(vdp_scout::LlmError::Unavailable { .. })
    ));
}
