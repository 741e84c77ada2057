use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use viewengine_cli::api::{ApiClient, ClientConfig, ContentInfo, JobStatus};
use viewengine_cli::error::ApiError;
use viewengine_cli::logging;
use viewengine_cli::poll::{PollConfig, PollEvent, PollOutcome};
use viewengine_cli::preview::MAX_PREVIEW_CHARS;
use viewengine_cli::workflow::{RetrievalParams, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUEST_ID: &str = "0b9e4f4a-52a1-4d7e-8f67-1c3a2b5d9e01";

fn session_for(server: &MockServer, max_attempts: u32) -> Session {
    logging::initialize_for_tests();
    let config = ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    };
    let client = ApiClient::new("ve_test_key", &config).expect("client");
    Session::new(
        client,
        PollConfig {
            interval: Duration::ZERO,
            max_attempts,
        },
    )
}

fn snapshot(status: &str) -> serde_json::Value {
    json!({
        "requestId": REQUEST_ID,
        "url": "https://example.com",
        "status": status,
        "message": format!("job is {status}"),
        "createdAt": "2025-03-01T10:15:30Z"
    })
}

#[tokio::test]
async fn discovery_failure_is_empty_and_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mcp/tools"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let discovery = session_for(&server, 1).discover_tools().await;
    assert!(discovery.tools.is_empty());
    assert_eq!(
        discovery.failure,
        Some(ApiError::Status {
            status: 500,
            body: "boom".into()
        })
    );
}

#[tokio::test]
async fn submit_then_poll_until_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mcp/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": REQUEST_ID,
            "status": "pending",
            "message": "queued",
            "estimatedWaitTimeSeconds": 5
        })))
        .mount(&server)
        .await;
    let status_path = format!("/v1/mcp/retrieve/{REQUEST_ID}");
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot("pending")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let mut complete = snapshot("complete");
    complete["completedAt"] = json!("2025-03-01T10:16:00Z");
    complete["content"] = json!({
        "pageDataUrl": format!("{}/blobs/page.json", server.uri()),
        "contentHash": "sha256:abc",
        "artifacts": { "screenshot": "s.png" }
    });
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete))
        .mount(&server)
        .await;

    let session = session_for(&server, 60);
    let submission = session
        .submit(&RetrievalParams::default())
        .await
        .expect("submit");

    let mut seen = Vec::new();
    let outcome = session
        .poll(submission.request_id, |event| seen.push(event.clone()))
        .await;

    let status = match outcome {
        PollOutcome::Complete(status) => status,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(status.status, JobStatus::Complete);
    assert_eq!(
        status.content.and_then(|c| c.content_hash).as_deref(),
        Some("sha256:abc")
    );
    assert_eq!(seen.len(), 3);
    assert!(matches!(
        seen[1],
        PollEvent::AttemptFailed {
            attempt: 2,
            error: ApiError::Status { status: 503, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn poll_gives_up_after_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/mcp/retrieve/{REQUEST_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot("processing")))
        .expect(4)
        .mount(&server)
        .await;

    let session = session_for(&server, 4);
    let id = REQUEST_ID.parse().unwrap();
    let outcome = session.poll(id, |_| {}).await;
    assert_eq!(outcome, PollOutcome::TimedOut { attempts: 4 });
}

#[tokio::test]
async fn download_preview_is_bounded() {
    let server = MockServer::start().await;
    let body = json!({ "html": "x".repeat(3 * MAX_PREVIEW_CHARS) });
    Mock::given(method("GET"))
        .and(path("/blobs/page.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let content = ContentInfo {
        page_data_url: format!("{}/blobs/page.json", server.uri()),
        content_hash: None,
        artifacts: None,
        metrics: None,
    };
    let preview = session_for(&server, 1)
        .download_preview(&content)
        .await
        .expect("preview");

    let pretty = serde_json::to_string_pretty(&body).unwrap();
    assert_eq!(preview, format!("{}...", &pretty[..MAX_PREVIEW_CHARS]));
}

#[tokio::test]
async fn download_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blobs/gone.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let content = ContentInfo {
        page_data_url: format!("{}/blobs/gone.json", server.uri()),
        content_hash: None,
        artifacts: None,
        metrics: None,
    };
    let err = session_for(&server, 1)
        .download_preview(&content)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            body: "not found".into()
        }
    );
}
