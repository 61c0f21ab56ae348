// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use uuid::Uuid;
use vericrawl::config::settings::HeritrixSettings;
use vericrawl::engines::heritrix_engine::HeritrixEngine;
use vericrawl::engines::traits::{CrawlEngine, EngineError};
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(url: String) -> HeritrixSettings {
    HeritrixSettings {
        url,
        user: "admin".to_string(),
        password: "admin".to_string(),
        jobs_dir: "/opt/heritrix/jobs/".to_string(),
        accept_invalid_certs: true,
        request_timeout_secs: 5,
        config_template_path: None,
    }
}

#[tokio::test]
async fn test_create_uploads_seeds() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/engine"))
        .and(body_string_contains("action=create"))
        .and(body_string_contains(id.to_string()))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/engine/job/{}/jobdir/crawler-beans.cxml", id)))
        .and(body_string_contains("https://example.com\nhttp://example.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HeritrixEngine::new(&settings(server.uri()), None).unwrap();
    engine
        .create(
            id,
            &[
                "https://example.com".to_string(),
                "http://example.com".to_string(),
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_job_actions_post_form() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    for action in ["build", "launch", "pause", "unpause", "terminate", "teardown"] {
        Mock::given(method("POST"))
            .and(path(format!("/engine/job/{}", id)))
            .and(body_string_contains(format!("action={}", action)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let engine = HeritrixEngine::new(&settings(server.uri()), None).unwrap();
    engine.build(id).await.unwrap();
    engine.launch(id).await.unwrap();
    engine.pause(id).await.unwrap();
    engine.unpause(id).await.unwrap();
    engine.terminate(id).await.unwrap();
    engine.teardown(id).await.unwrap();
}

#[tokio::test]
async fn test_status_reads_controller_state() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/engine/job/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<job><crawlControllerState>FINISHED</crawlControllerState>\
             <crawlExitStatus>ABORTED</crawlExitStatus></job>",
        ))
        .mount(&server)
        .await;

    let engine = HeritrixEngine::new(&settings(server.uri()), None).unwrap();
    assert_eq!(engine.status(id).await.unwrap(), "FINISHED: ABORTED");
    assert_eq!(
        engine.result_location(id).await.unwrap(),
        format!("/opt/heritrix/jobs/{}/latest/", id)
    );
}

#[tokio::test]
async fn test_missing_job_and_server_errors() {
    let server = MockServer::start().await;
    let missing = Uuid::new_v4();
    let broken = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/engine/job/{}", missing)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/engine/job/{}", broken)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let engine = HeritrixEngine::new(&settings(server.uri()), None).unwrap();
    assert!(matches!(
        engine.pause(missing).await,
        Err(EngineError::JobNotFound(id)) if id == missing
    ));
    assert!(matches!(
        engine.pause(broken).await,
        Err(EngineError::UnexpectedResponse { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_availability_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/engine"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let engine = HeritrixEngine::new(&settings(server.uri()), None).unwrap();
    assert!(engine.is_available().await);

    let offline = HeritrixEngine::new(&settings("http://127.0.0.1:1".to_string()), None).unwrap();
    assert!(!offline.is_available().await);
}
