use dify_client::api_v1::{ChatMessageRequest, RetrievalModel, RetrieveRequest, SearchMethod};
use dify_client::error::DifyClientError;
use dify_client::{DifyClient, DifyClientBuilder};
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DifyClient {
    DifyClientBuilder::new()
        .with_api_key("app-test-key")
        .with_base_url(format!("{}/v1", server.uri()))
        .build()
        .unwrap()
}

fn sse(lines: &[&str]) -> ResponseTemplate {
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push_str("\n\n");
    }
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

#[tokio::test]
async fn blocking_chat_message_sends_auth_and_blocking_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(header("authorization", "Bearer app-test-key"))
        .and(body_partial_json(json!({
            "query": "hello",
            "response_mode": "blocking",
            "user": "test-user",
            "inputs": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event": "message",
            "task_id": "t1",
            "message_id": "m1",
            "conversation_id": "c1",
            "mode": "chat",
            "answer": "Hi there",
            "metadata": { "usage": { "total_tokens": 12, "total_price": "0.0001" } },
            "created_at": 1705407629
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .chat_message(ChatMessageRequest::new("hello", "test-user"))
        .await
        .unwrap();

    assert_eq!(response.answer, "Hi there");
    assert_eq!(response.conversation_id.as_deref(), Some("c1"));
    assert_eq!(response.metadata.usage.unwrap().total_tokens, 12);
}

#[tokio::test]
async fn streaming_chat_message_is_reassembled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(json!({ "response_mode": "streaming" })))
        .respond_with(sse(&[
            r#"data: {"event":"workflow_started","workflow_run_id":"w1","task_id":"t1","data":{"id":"w1"}}"#,
            r#"data: {"event":"message","answer":"Artificial ","message_id":"m1","conversation_id":"c1","task_id":"t1"}"#,
            "data: {broken",
            r#"data: {"event":"ping"}"#,
            r#"data: {"event":"message","answer":"intelligence.","message_id":"m1","conversation_id":"c1","task_id":"t1"}"#,
            r#"data: {"event":"message_end","message_id":"m1","conversation_id":"c1","metadata":{"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15,"total_price":"0.0000300","currency":"USD","latency":1.25}}}"#,
        ]))
        .mount(&server)
        .await;

    let mut kinds = Vec::new();
    let acc = client_for(&server)
        .chat_message_collect(ChatMessageRequest::new("what is AI?", "u1"), |event| {
            kinds.push(event.kind())
        })
        .await
        .unwrap();

    assert_eq!(
        kinds,
        ["workflow_started", "message", "ping", "message", "message_end"]
    );
    assert_eq!(acc.full_answer, "Artificial intelligence.");
    assert_eq!(acc.task_id.as_deref(), Some("t1"));
    assert_eq!(acc.message_id.as_deref(), Some("m1"));
    let usage = acc.metadata.unwrap().usage.unwrap();
    assert_eq!(usage.total_tokens, 15);
    assert_eq!(usage.latency, Some(1.25));
    assert!(acc.error.is_none());
}

#[tokio::test]
async fn stream_error_event_keeps_partial_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(sse(&[
            r#"data: {"event":"message","answer":"Half"}"#,
            r#"data: {"event":"error","status":400,"code":"invalid_param","message":"model not available"}"#,
            r#"data: {"event":"message","answer":" never seen"}"#,
        ]))
        .mount(&server)
        .await;

    let acc = client_for(&server)
        .chat_message_collect(ChatMessageRequest::new("q", "u1"), |_| {})
        .await
        .unwrap();

    assert_eq!(acc.full_answer, "Half");
    let failure = acc.error.unwrap();
    assert_eq!(failure.message, "model not available");
    assert_eq!(failure.code.as_deref(), Some("invalid_param"));
}

#[tokio::test]
async fn stream_error_event_with_numeric_code_ends_the_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(sse(&[
            r#"data: {"event":"message","answer":"a"}"#,
            r#"data: {"event":"error","message":"boom","code":500,"status":500}"#,
            r#"data: {"event":"message","answer":"b"}"#,
        ]))
        .mount(&server)
        .await;

    let acc = client_for(&server)
        .chat_message_collect(ChatMessageRequest::new("q", "u1"), |_| {})
        .await
        .unwrap();

    assert_eq!(acc.full_answer, "a");
    let failure = acc.error.unwrap();
    assert_eq!(failure.code.as_deref(), Some("500"));
    assert_eq!(failure.status, Some(500));
}

#[tokio::test]
async fn stream_without_trailing_newline_still_yields_last_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"event\":\"message\",\"answer\":\"a\"}\n\ndata: {\"event\":\"message\",\"answer\":\"b\"}",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let events: Vec<_> = client
        .chat_message_stream(ChatMessageRequest::new("q", "u1"))
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(Result::is_ok));
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"code":"unauthorized","message":"Access token is invalid","status":401}"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client
        .chat_message(ChatMessageRequest::new("q", "u1"))
        .await
        .unwrap_err();
    match err {
        DifyClientError::Api { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Access token is invalid"));
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = client
        .chat_message_collect(ChatMessageRequest::new("q", "u1"), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, DifyClientError::Api { .. }));
}

#[tokio::test]
async fn retrieve_posts_to_dataset_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/retrieve"))
        .and(body_partial_json(json!({
            "query": "deep learning",
            "retrieval_model": { "search_method": "semantic_search", "top_k": 3 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "content": "deep learning" },
            "records": [{
                "segment": {
                    "id": "s1",
                    "document_id": "d1",
                    "position": 2,
                    "content": "Deep learning uses neural networks.",
                    "word_count": 5,
                    "tokens": 7,
                    "keywords": ["neural"],
                    "document": { "id": "d1", "name": "dl.md", "data_source_type": "upload_file" }
                },
                "score": 0.87
            }]
        })))
        .mount(&server)
        .await;

    let request = RetrieveRequest::new("deep learning")
        .retrieval_model(RetrievalModel::new(SearchMethod::SemanticSearch).top_k(3u32));
    let response = client_for(&server)
        .retrieve("ds-1", &request)
        .await
        .unwrap();

    assert_eq!(response.query.content, "deep learning");
    assert_eq!(response.records.len(), 1);
    assert_eq!(response.records[0].score, Some(0.87));
    assert_eq!(response.records[0].segment.position, Some(2));
}

#[tokio::test]
async fn retrieve_rejects_blank_dataset_id() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .retrieve(" ", &RetrieveRequest::new("q"))
        .await
        .unwrap_err();
    assert!(matches!(err, DifyClientError::Format(_)));
}
