//! Integration tests for the chat flow.
//!
//! These tests wire the real application services to the in-memory adapters
//! and drive them through the HTTP router:
//! 1. A user question becomes a tool call, a search, signed links and an answer
//! 2. The orchestration loop stops after five model calls
//! 3. Signing and configuration failures degrade instead of failing the request

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use doc_finder::adapters::ai::{MockAIProvider, MockError, MockResponse};
use doc_finder::adapters::http::{api_router, AppState};
use doc_finder::adapters::search::InMemorySearchBackend;
use doc_finder::adapters::storage::FakeUrlSigner;
use doc_finder::application::{ChatOrchestrator, DocumentSearchService, FindDocumentsTool, LinkIssuer, SearchSettings};
use doc_finder::domain::search::{DerivedStructData, ExtractiveAnswer, RawDocument, RawSearchResult};
use doc_finder::domain::tools::ToolCall;
use doc_finder::ports::{AIProvider, MessageRole};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    provider: MockAIProvider,
    backend: InMemorySearchBackend,
    signer: FakeUrlSigner,
    settings: SearchSettings,
    with_model: bool,
}

impl Harness {
    fn new(provider: MockAIProvider) -> Self {
        Self {
            provider,
            backend: InMemorySearchBackend::new(),
            signer: FakeUrlSigner::new(),
            settings: SearchSettings {
                project_id: Some("test-project".to_string()),
                engine_id: Some("test-engine".to_string()),
                ..SearchSettings::default()
            },
            with_model: true,
        }
    }

    fn app(&self) -> Router {
        let search = Arc::new(DocumentSearchService::new(
            Arc::new(self.backend.clone()),
            self.settings.clone(),
        ));
        let tool = FindDocumentsTool::new(Arc::clone(&search), LinkIssuer::new(Arc::new(self.signer.clone())));
        let provider = self
            .with_model
            .then(|| Arc::new(self.provider.clone()) as Arc<dyn AIProvider>);
        api_router(AppState::new(Arc::new(ChatOrchestrator::new(provider, Arc::new(tool))), search))
    }

    async fn chat(&self, text: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"messages": [{"role": "user", "content": text}]}).to_string(),
            ))
            .unwrap();

        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

fn document(title: &str, link: &str) -> RawSearchResult {
    RawSearchResult {
        id: title.to_string(),
        document: Some(RawDocument {
            id: title.to_string(),
            derived_struct_data: Some(DerivedStructData {
                title: Some(title.to_string()),
                link: Some(link.to_string()),
                extractive_answers: vec![ExtractiveAnswer {
                    content: Some("本文の抜粋".to_string()),
                    page_number: Some("3".to_string()),
                }],
                ..DerivedStructData::default()
            }),
            ..RawDocument::default()
        }),
    }
}

/// Splits a data-stream body into `(code, payload)` pairs.
fn parse_lines(body: &str) -> Vec<(String, Value)> {
    body.lines()
        .map(|line| {
            let (code, payload) = line.split_once(':').unwrap();
            (code.to_string(), serde_json::from_str(payload).unwrap())
        })
        .collect()
}

fn tool_results(lines: &[(String, Value)]) -> Vec<Value> {
    lines
        .iter()
        .filter(|(code, _)| code == "a")
        .map(|(_, payload)| payload["result"].clone())
        .collect()
}

fn text(lines: &[(String, Value)]) -> String {
    lines
        .iter()
        .filter(|(code, _)| code == "0")
        .filter_map(|(_, payload)| payload.as_str())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn question_is_answered_with_signed_links() {
    let provider = MockAIProvider::new()
        .with_tool_call("searchDocuments", json!({"query": "エアコン", "maxResults": 5}))
        .with_response("見つかりました: [a.pdf](https://signed.test/docs/a.pdf?ttl=3600)");
    let mut harness = Harness::new(provider);
    harness.backend = harness.backend.clone().with_results(vec![
        document("エアコン取扱説明書", "gs://docs/a.pdf"),
        document("エアコン設置ガイド", "gs://docs/b.pdf"),
    ]);

    let (status, body) = harness.chat("エアコンのマニュアルを探して").await;

    assert_eq!(status, StatusCode::OK);
    let lines = parse_lines(&body);

    let call = lines.iter().find(|(code, _)| code == "9").unwrap();
    assert_eq!(call.1["toolName"], "searchDocuments");
    assert_eq!(call.1["args"]["query"], "エアコン");

    let results = tool_results(&lines);
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result["success"], true);
    assert_eq!(result["query"], "エアコン");
    assert_eq!(result["count"], 2);
    assert_eq!(result["documents"][0]["fileName"], "a.pdf");
    assert_eq!(result["documents"][1]["fileName"], "b.pdf");
    for doc in result["documents"].as_array().unwrap() {
        assert!(!doc["downloadUrl"].as_str().unwrap().is_empty());
        assert!(doc.get("content").is_none());
    }

    assert!(text(&lines).contains("[a.pdf]"));
    assert_eq!(lines.last().unwrap(), &("d".to_string(), json!({"finishReason": "stop"})));

    let request = &harness.backend.requests()[0];
    assert_eq!(request.query, "エアコン");
    assert_eq!(request.page_size, 5);
}

#[tokio::test]
async fn tool_result_is_fed_back_to_the_model() {
    let provider = MockAIProvider::new()
        .with_tool_call("searchDocuments", json!({"query": "manual"}))
        .with_response("done");
    let mut harness = Harness::new(provider.clone());
    harness.backend = harness.backend.clone().with_results(vec![document("Manual", "gs://docs/a.pdf")]);

    harness.chat("find the manual").await;

    let calls = provider.get_calls();
    assert_eq!(calls.len(), 2);
    let tool_message = calls[1]
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .unwrap();
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
    let payload: Value = serde_json::from_str(&tool_message.content).unwrap();
    assert_eq!(payload["documents"][0]["downloadUrl"], "https://signed.test/docs/a.pdf?ttl=3600");
    assert!(!tool_message.content.contains("本文の抜粋"));
}

#[tokio::test]
async fn always_tool_calling_model_is_called_five_times() {
    let provider = MockAIProvider::new().with_fallback(MockResponse::ToolCalls {
        content: String::new(),
        calls: vec![ToolCall::new("call_loop", "searchDocuments", json!({"query": "again"}))],
    });
    let harness = Harness::new(provider.clone());

    let (status, body) = harness.chat("loop forever").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.call_count(), 5);
    assert_eq!(harness.backend.request_count(), 5);

    let lines = parse_lines(&body);
    assert_eq!(lines.iter().filter(|(code, _)| code == "e").count(), 5);
    assert_eq!(
        lines.last().unwrap(),
        &("d".to_string(), json!({"finishReason": "tool-calls"}))
    );
}

#[tokio::test]
async fn partial_signing_failure_falls_back_to_locator() {
    let provider = MockAIProvider::new()
        .with_tool_call("searchDocuments", json!({"query": "manual"}))
        .with_response("ok");
    let mut harness = Harness::new(provider);
    harness.backend = harness.backend.clone().with_results(vec![
        document("A", "gs://docs/a.pdf"),
        document("B", "gs://docs/b.pdf"),
    ]);
    harness.signer = FakeUrlSigner::new().failing_for("gs://docs/b.pdf");

    let (_, body) = harness.chat("manual").await;

    let result = &tool_results(&parse_lines(&body))[0];
    assert_eq!(result["success"], true);
    assert_eq!(result["documents"][0]["downloadUrl"], "https://signed.test/docs/a.pdf?ttl=3600");
    assert_eq!(result["documents"][1]["downloadUrl"], "gs://docs/b.pdf");
}

#[tokio::test]
async fn empty_search_is_a_successful_empty_result() {
    let provider = MockAIProvider::new()
        .with_tool_call("searchDocuments", json!({"query": "存在しない"}))
        .with_response("該当するドキュメントは見つかりませんでした。");
    let harness = Harness::new(provider);

    let (status, body) = harness.chat("存在しないファイル").await;

    assert_eq!(status, StatusCode::OK);
    let lines = parse_lines(&body);
    let result = &tool_results(&lines)[0];
    assert_eq!(result, &json!({"success": true, "query": "存在しない", "count": 0, "documents": []}));
    assert!(text(&lines).contains("見つかりませんでした"));
}

#[tokio::test]
async fn missing_search_configuration_becomes_tool_failure() {
    let provider = MockAIProvider::new()
        .with_tool_call("searchDocuments", json!({"query": "manual"}))
        .with_response("Search is not available right now.");
    let mut harness = Harness::new(provider);
    harness.settings = SearchSettings::default();

    let (status, body) = harness.chat("manual").await;

    assert_eq!(status, StatusCode::OK);
    let result = &tool_results(&parse_lines(&body))[0];
    assert_eq!(result["success"], false);
    assert_eq!(result["query"], "manual");
    assert!(result["error"].as_str().unwrap().contains("GOOGLE_CLOUD_PROJECT_ID"));
    assert_eq!(harness.backend.request_count(), 0);
}

#[tokio::test]
async fn missing_model_key_is_500() {
    let mut harness = Harness::new(MockAIProvider::new());
    harness.with_model = false;

    let (status, body) = harness.chat("hi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"error": "GEMINI_API_KEY is not configured"}));
}

#[tokio::test]
async fn mid_stream_failure_is_reported_as_error_line() {
    let provider = MockAIProvider::new().push(MockResponse::StreamError {
        content: "Looking for".to_string(),
        error: MockError::Network {
            message: "connection reset".to_string(),
        },
    });
    let harness = Harness::new(provider);

    let (status, body) = harness.chat("hi").await;

    assert_eq!(status, StatusCode::OK);
    let lines = parse_lines(&body);
    assert_eq!(text(&lines), "Looking for");
    let (code, message) = lines.last().unwrap();
    assert_eq!(code, "3");
    assert!(!message.as_str().unwrap().contains("connection reset"));
}
