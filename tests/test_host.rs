//! End-to-end tests for the session host against a mocked crop service.
//!
//! Covers:
//! - Non-empty results publishing detections and re-arming the session
//! - Empty results, malformed bodies, and transport failures resolving
//!   to the same locked-out outcome
//! - Detection sets replacing (never appending to) the previous ones
//! - Round-trip timing and the reset on a new image
//! - Cancelling selection through the host before any click

mod common;

use clickcrop::{ClientConfig, SessionHost, SubmissionClient};
use common::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host_for(server: &MockServer) -> SessionHost {
    let config = ClientConfig {
        endpoint: format!("{}/api/crop", server.uri()),
        ..ClientConfig::default()
    };
    SessionHost::new(SubmissionClient::new(config).expect("Failed to build client"))
}

fn armed_host(server: &MockServer) -> SessionHost {
    let mut host = host_for(server);
    assert!(host.load_image(test_source(800, 600)));
    assert!(host.toggle_selection());
    host
}

fn rect() -> RenderedRect {
    RenderedRect::at_origin(800.0, 600.0)
}

fn center() -> PointerPos {
    PointerPos { x: 400.0, y: 300.0 }
}

async fn mount_body(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/crop"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_detections_publish_and_rearm() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([
            {"image": "data:image/jpeg;base64,AAAA"},
            {"image": "data:image/jpeg;base64,BBBB"},
        ])),
    )
    .await;

    let mut host = armed_host(&server);
    let state = host.click(center(), rect()).await?;

    assert_eq!(state, SessionState::ResultsReady);
    assert_eq!(host.detections().len(), 2);
    assert_eq!(host.detections()[0].image, "data:image/jpeg;base64,AAAA");
    assert_eq!(host.detections()[1].image, "data:image/jpeg;base64,BBBB");

    // Same image stays loaded and selection can be re-armed.
    assert_eq!(host.session().source().unwrap().dimensions(), (800, 600));
    assert!(host.toggle_selection());
    Ok(())
}

#[tokio::test]
async fn test_empty_list_resolves_results_empty() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let mut host = armed_host(&server);
    let state = host.click(center(), rect()).await?;

    assert_eq!(state, SessionState::ResultsEmpty);
    assert!(host.detections().is_empty());
    assert!(!host.toggle_selection());
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_matches_empty_outcome() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(500)).await;

    let mut host = armed_host(&server);
    let state = host.click(center(), rect()).await?;

    // Indistinguishable from an empty result.
    assert_eq!(state, SessionState::ResultsEmpty);
    assert!(host.detections().is_empty());
    assert!(!host.toggle_selection());
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_matches_empty_outcome() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"detail": "internal"})),
    )
    .await;

    let mut host = armed_host(&server);
    let state = host.click(center(), rect()).await?;

    assert_eq!(state, SessionState::ResultsEmpty);
    assert!(host.detections().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_successive_points_replace_detections() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    // First click gets two crops, the next one a single different crop.
    Mock::given(method("POST"))
        .and(path("/api/crop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"image": "data:image/jpeg;base64,AAAA"},
            {"image": "data:image/jpeg;base64,BBBB"},
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/crop"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"image": "data:image/jpeg;base64,CCCC"}])),
        )
        .mount(&server)
        .await;

    let mut host = armed_host(&server);
    host.click(center(), rect()).await?;
    assert_eq!(host.detections().len(), 2);

    assert!(host.toggle_selection());
    host.click(PointerPos { x: 100.0, y: 100.0 }, rect()).await?;
    assert_eq!(host.detections().len(), 1);
    assert_eq!(host.detections()[0].image, "data:image/jpeg;base64,CCCC");
    Ok(())
}

#[tokio::test]
async fn test_round_trip_is_timed() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_millis(30)),
    )
    .await;

    let mut host = armed_host(&server);
    assert!(host.response_seconds().is_none());

    host.click(center(), rect()).await?;
    let seconds = host.response_seconds().expect("round trip recorded");
    assert!(seconds >= 0.03);

    // Timing is recorded even though the outcome was empty.
    assert_eq!(host.session().state(), SessionState::ResultsEmpty);
    Ok(())
}

#[tokio::test]
async fn test_new_image_clears_results_and_timing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([{"image": "data:image/jpeg;base64,AAAA"}])),
    )
    .await;

    let mut host = armed_host(&server);
    host.click(center(), rect()).await?;
    assert_eq!(host.detections().len(), 1);
    assert!(host.response_seconds().is_some());

    assert!(host.load_image(test_source(640, 480)));
    assert_eq!(host.session().state(), SessionState::Ready);
    assert!(host.detections().is_empty());
    assert!(host.response_seconds().is_none());
    assert!(host.session().point().is_none());
    Ok(())
}

#[tokio::test]
async fn test_cancel_disarms_before_any_click() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let mut host = armed_host(&server);
    assert!(host.cancel());
    assert_eq!(host.session().state(), SessionState::Ready);
    assert!(!host.cancel());

    // No longer selecting, so the click never reaches the service.
    let state = host.click(center(), rect()).await?;
    assert_eq!(state, SessionState::Ready);
    let requests = server.received_requests().await.expect("requests recorded");
    assert!(requests.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_click_without_arming_submits_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let mut host = host_for(&server);
    assert!(host.load_image(test_source(800, 600)));

    let state = host.click(center(), rect()).await?;
    assert_eq!(state, SessionState::Ready);

    let requests = server.received_requests().await.expect("requests recorded");
    assert!(requests.is_empty());
    Ok(())
}
