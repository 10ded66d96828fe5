use super::*;
use ctz_core::SamplingRequest;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

struct ScriptedSampler {
    attempts: Arc<AtomicU32>,
    responses: Vec<Result<SamplingResponse, SamplingError>>,
}

#[async_trait]
impl Sampler for ScriptedSampler {
    async fn sample_once(
        &self,
        _request: &SamplingRequest,
        _cancel: &CancellationToken,
    ) -> Result<SamplingResponse, SamplingError> {
        let idx = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
        match &self.responses[idx.min(self.responses.len() - 1)] {
            Ok(r) => Ok(r.clone()),
            Err(SamplingError::Transport(s)) => Err(SamplingError::Transport(s.clone())),
            Err(SamplingError::RateLimited) => Err(SamplingError::RateLimited),
            Err(SamplingError::Server { status }) => Err(SamplingError::Server { status: *status }),
            Err(SamplingError::SchemaInvalid(s)) => Err(SamplingError::SchemaInvalid(s.clone())),
            Err(SamplingError::Cancelled) => Err(SamplingError::Cancelled),
            Err(SamplingError::Other(s)) => Err(SamplingError::Other(s.clone())),
        }
    }

    async fn stream_once(
        &self,
        _request: &SamplingRequest,
        _cancel: &CancellationToken,
        tx: mpsc::Sender<SamplingChunk>,
    ) {
        let _ = tx
            .send(SamplingChunk {
                text: "hello".to_string(),
                is_final: false,
                tokens_so_far: 5,
                model: "test-model".to_string(),
                error: None,
            })
            .await;
        let _ = tx
            .send(SamplingChunk {
                text: "".to_string(),
                is_final: true,
                tokens_so_far: 10,
                model: "test-model".to_string(),
                error: None,
            })
            .await;
    }
}

fn ok_response(content: &str) -> SamplingResponse {
    SamplingResponse {
        content: content.to_string(),
        model: "test-model".to_string(),
        stop_reason: ctz_core::StopReason::Complete,
        tokens_used: 42,
    }
}

#[tokio::test]
async fn sample_succeeds_on_first_attempt() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![Ok(ok_response("hi"))],
    });
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    let response = client.sample(&req, &cancel).await.expect("should succeed");
    assert_eq!(response.content, "hi");
}

#[tokio::test]
async fn sample_retries_transient_errors_then_succeeds() {
    let attempts = Arc::new(AtomicU32::new(0));
    let client = SamplingClient::with_max_attempts(
        ScriptedSampler {
            attempts: attempts.clone(),
            responses: vec![
                Err(SamplingError::Transport("connection reset".to_string())),
                Err(SamplingError::RateLimited),
                Ok(ok_response("recovered")),
            ],
        },
        5,
    );
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    let response = client.sample(&req, &cancel).await.expect("should eventually succeed");
    assert_eq!(response.content, "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn sample_does_not_retry_schema_invalid() {
    let attempts = Arc::new(AtomicU32::new(0));
    let client = SamplingClient::with_max_attempts(
        ScriptedSampler {
            attempts: attempts.clone(),
            responses: vec![Err(SamplingError::SchemaInvalid("bad shape".to_string()))],
        },
        5,
    );
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    let err = client.sample(&req, &cancel).await.expect_err("should not retry schema errors");
    assert!(matches!(err, SamplingError::SchemaInvalid(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sample_gives_up_after_max_attempts() {
    let attempts = Arc::new(AtomicU32::new(0));
    let client = SamplingClient::with_max_attempts(
        ScriptedSampler {
            attempts: attempts.clone(),
            responses: vec![
                Err(SamplingError::Transport("a".to_string())),
                Err(SamplingError::Transport("b".to_string())),
                Err(SamplingError::Transport("c".to_string())),
            ],
        },
        3,
    );
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    let err = client.sample(&req, &cancel).await.expect_err("should exhaust attempts");
    assert!(matches!(err, SamplingError::Transport(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn sample_returns_cancelled_immediately_when_token_already_cancelled() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![Ok(ok_response("unused"))],
    });
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = client.sample(&req, &cancel).await.expect_err("should be cancelled");
    assert!(matches!(err, SamplingError::Cancelled));
}

#[tokio::test]
async fn sample_stream_closes_with_final_chunk() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![],
    });
    let req = SamplingRequest::builder("hello").build();
    let cancel = CancellationToken::new();
    let mut rx = client.sample_stream(&req, &cancel).await;

    let first = rx.recv().await.expect("first chunk");
    assert!(!first.is_final);
    let last = rx.recv().await.expect("final chunk");
    assert!(last.is_final);
    assert!(rx.recv().await.is_none(), "channel must close after the final chunk");
}

#[tokio::test]
async fn sample_json_with_schema_parses_clean_json() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![Ok(ok_response(r#"{"name": "web", "port": 8080}"#))],
    });
    let req = SamplingRequest::builder("describe the service").build();
    let cancel = CancellationToken::new();
    let value = client
        .sample_json_with_schema(&req, None, &cancel)
        .await
        .expect("should parse");
    assert_eq!(value["name"], "web");
}

#[tokio::test]
async fn sample_json_with_schema_extracts_balanced_block_from_prose() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![Ok(ok_response(
            "Sure, here you go:\n```json\n{\"name\": \"web\"}\n```\nLet me know if you need more.",
        ))],
    });
    let req = SamplingRequest::builder("describe the service").build();
    let cancel = CancellationToken::new();
    let value = client
        .sample_json_with_schema(&req, None, &cancel)
        .await
        .expect("should extract embedded JSON");
    assert_eq!(value["name"], "web");
}

#[tokio::test]
async fn sample_json_with_schema_repairs_malformed_output() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![
            Ok(ok_response("not json at all")),
            Ok(ok_response(r#"{"name": "web"}"#)),
        ],
    });
    let req = SamplingRequest::builder("describe the service").build();
    let cancel = CancellationToken::new();
    let value = client
        .sample_json_with_schema(&req, None, &cancel)
        .await
        .expect("repair pass should recover");
    assert_eq!(value["name"], "web");
}

#[tokio::test]
async fn sample_json_with_schema_validates_against_schema() {
    let schema = serde_json::json!({
        "type": "object",
        "required": ["port"],
        "properties": { "port": { "type": "integer" } }
    });
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![
            Ok(ok_response(r#"{"name": "web"}"#)),
            Ok(ok_response(r#"{"name": "web", "port": 8080}"#)),
        ],
    });
    let req = SamplingRequest::builder("describe the service").build();
    let cancel = CancellationToken::new();
    let value = client
        .sample_json_with_schema(&req, Some(&schema), &cancel)
        .await
        .expect("second pass should satisfy schema");
    assert_eq!(value["port"], 8080);
}

#[tokio::test]
async fn sample_json_with_schema_fails_after_exhausting_repair_passes() {
    let client = SamplingClient::new(ScriptedSampler {
        attempts: Arc::new(AtomicU32::new(0)),
        responses: vec![
            Ok(ok_response("nope")),
            Ok(ok_response("still nope")),
            Ok(ok_response("still not json")),
        ],
    });
    let req = SamplingRequest::builder("describe the service").build();
    let cancel = CancellationToken::new();
    let err = client
        .sample_json_with_schema(&req, None, &cancel)
        .await
        .expect_err("should give up after repair passes");
    assert!(matches!(err, SamplingError::SchemaInvalid(_)));
}

#[test]
fn extract_balanced_block_ignores_braces_inside_strings() {
    let raw = r#"prefix {"msg": "a { b } c"} suffix"#;
    let block = extract_balanced_block(raw).expect("block found");
    assert_eq!(block, r#"{"msg": "a { b } c"}"#);
}

#[test]
fn extract_balanced_block_returns_none_without_braces() {
    assert!(extract_balanced_block("no json here").is_none());
}

#[test]
fn backoff_delay_grows_and_is_capped() {
    let first = backoff_delay(1);
    let third = backoff_delay(3);
    let tenth = backoff_delay(10);
    assert!(first <= Duration::from_millis(1250));
    assert!(third >= BACKOFF_BASE);
    assert!(tenth <= BACKOFF_CAP + Duration::from_millis(BACKOFF_CAP.as_millis() as u64 / 4 + 1));
}
