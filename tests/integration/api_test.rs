// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use uuid::Uuid;
use vericrawl::domain::repositories::crawl_job_repository::CrawlJobRepository;
use vericrawl::domain::repositories::office_document_repository::OfficeDocumentRepository;
use vericrawl::infrastructure::repositories::crawl_job_repo_impl::CrawlJobRepositoryImpl;
use vericrawl::infrastructure::repositories::office_document_repo_impl::OfficeDocumentRepositoryImpl;

fn job_id(body: &Value) -> Uuid {
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");

    let response = app.server.get("/health/engine").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["engine"], "stub");

    app.engine.unavailable.store(true, Ordering::SeqCst);
    let response = app.server.get("/health/engine").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    // No worker is running in the test app
    let response = app.server.get("/health/validation").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["state"], "unhealthy");
}

#[tokio::test]
async fn test_start_job_is_tracked_and_persisted() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({
            "domain": "example.com/",
            "date": "15-03-2026",
            "reportEmail": "ops@example.com"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["crawl_url"], "https://example.com");
    assert_eq!(body["status"], "running");
    assert_eq!(body["scheduled_date"], "2026-03-15");

    let id = job_id(&body);
    assert_eq!(
        app.engine.actions_for(id),
        vec!["create", "build", "launch"]
    );

    let stored = CrawlJobRepositoryImpl::new(app.db.clone())
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.crawl_url, "https://example.com");
    assert_eq!(stored.report_email.as_deref(), Some("ops@example.com"));

    // Same URL without force returns the existing job
    let again = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({ "domain": "https://example.com" }))
        .await
        .json::<Value>();
    assert_eq!(job_id(&again), id);
}

#[tokio::test]
async fn test_start_job_rejects_malformed_input() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({ "domain": "example.com", "date": "2026-03-15" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({ "domain": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_job_yields_not_found() {
    let app = create_test_app().await;
    let id = Uuid::new_v4();

    let response = app.server.get(&format!("/api/crawl-jobs/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!("/api/crawl-jobs/{}/pause", id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pause_and_unpause_report_whether_applied() {
    let app = create_test_app().await;
    let body = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({ "domain": "example.org" }))
        .await
        .json::<Value>();
    let id = job_id(&body);

    let paused = app
        .server
        .post(&format!("/api/crawl-jobs/{}/pause", id))
        .await
        .json::<Value>();
    assert_eq!(paused["applied"], true);
    assert_eq!(paused["job"]["status"], "paused");

    let again = app
        .server
        .post(&format!("/api/crawl-jobs/{}/pause", id))
        .await;
    assert_eq!(again.status_code(), StatusCode::OK);
    assert_eq!(again.json::<Value>()["applied"], false);

    let resumed = app
        .server
        .post(&format!("/api/crawl-jobs/{}/unpause", id))
        .await
        .json::<Value>();
    assert_eq!(resumed["job"]["status"], "running");
}

#[tokio::test]
async fn test_finished_job_notifies_once() {
    let app = create_test_app().await;
    let body = app
        .server
        .post("/api/crawl-jobs")
        .json(&json!({ "domain": "example.net", "reportEmail": "ops@example.com" }))
        .await
        .json::<Value>();
    let id = job_id(&body);

    app.engine.set_status(id, "FINISHED");
    let report = app
        .server
        .get(&format!("/api/crawl-jobs/{}", id))
        .await
        .json::<Value>();
    assert_eq!(report["status"], "finished");
    assert_eq!(report["result_url"], format!("/jobs/{}/latest/", id));
    assert_eq!(report["email_notification_sent"], true);

    app.server.get(&format!("/api/crawl-jobs/{}", id)).await;
    assert_eq!(app.notifier.count(), 1);
    let (recipient, subject, text) = app.notifier.sent.lock()[0].clone();
    assert_eq!(recipient, "ops@example.com");
    assert_eq!(subject, "Crawl job");
    assert!(text.ends_with(&format!("http://vericrawl.test/jobinfo?id={}", id)));
    assert!(app.engine.actions_for(id).contains(&"teardown".to_string()));
}

#[tokio::test]
async fn test_set_report_email_after_finish_delivers_on_next_query() {
    let app = create_test_app().await;
    let id = job_id(
        &app.server
            .post("/api/crawl-jobs")
            .json(&json!({ "domain": "example.io" }))
            .await
            .json::<Value>(),
    );
    app.engine.set_status(id, "Finished: ABORTED");
    let report = app
        .server
        .get(&format!("/api/crawl-jobs/{}", id))
        .await
        .json::<Value>();
    assert_eq!(report["status"], "aborted");
    assert_eq!(app.notifier.count(), 0);

    let response = app
        .server
        .post("/api/email")
        .json(&json!({ "job": id, "emailAddress": "late@example.com" }))
        .await;
    assert_eq!(response.json::<Value>()["applied"], true);

    app.server.get(&format!("/api/crawl-jobs/{}", id)).await;
    assert_eq!(app.notifier.count(), 1);
}

#[tokio::test]
async fn test_deleted_job_falls_back_to_stored_record() {
    let app = create_test_app().await;
    let id = job_id(
        &app.server
            .post("/api/crawl-jobs")
            .json(&json!({ "domain": "example.edu" }))
            .await
            .json::<Value>(),
    );

    let response = app.server.delete(&format!("/api/crawl-jobs/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.engine.actions_for(id).contains(&"terminate".to_string()));
    assert!(!app.lifecycle.registry().contains(id));

    let historical = app.server.get(&format!("/api/crawl-jobs/{}", id)).await;
    assert_eq!(historical.status_code(), StatusCode::OK);
    assert_eq!(historical.json::<Value>()["crawl_url"], "https://example.edu");

    let tracked = CrawlJobRepositoryImpl::new(app.db.clone())
        .find_tracked()
        .await
        .unwrap();
    assert!(tracked.iter().all(|job| job.id != id));
}

#[tokio::test]
async fn test_batch_finishes_when_all_members_terminal() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/api/batch")
        .json(&json!({
            "domains": ["a.example.com", "b.example.com"],
            "reportEmail": "ops@example.com"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let batch = response.json::<Value>();
    let batch_id = batch["id"].as_str().unwrap().to_string();
    let members: Vec<Uuid> = batch["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(job_id)
        .collect();
    assert_eq!(members.len(), 2);

    let pending = app
        .server
        .get(&format!("/api/batch/{}", batch_id))
        .await
        .json::<Value>();
    assert_eq!(pending["finished"], false);

    app.engine.set_status(members[0], "FINISHED");
    app.engine.set_status(members[1], "Finished: ABORTED");
    let done = app
        .server
        .get(&format!("/api/batch/{}", batch_id))
        .await
        .json::<Value>();
    assert_eq!(done["finished"], true);
    assert_eq!(app.notifier.count(), 2);

    let missing = app
        .server
        .get(&format!("/api/batch/{}", Uuid::new_v4()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_task_intake() {
    let app = create_test_app().await;
    let id = job_id(
        &app.server
            .post("/api/crawl-jobs")
            .json(&json!({ "domain": "docs.example.com" }))
            .await
            .json::<Value>(),
    );

    let response = app
        .server
        .post("/api/validation")
        .json(&json!({
            "uri": "https://docs.example.com/a.pdf",
            "filepath": "/tmp/heritrix/a.pdf",
            "jobDirectory": format!("/opt/heritrix/jobs/{}/20260301120000/mirror", id),
            "time": "2026-03-01T12:00:00Z"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    assert_eq!(response.json::<Value>()["queueSize"], 1);

    let depth = app.server.get("/api/validation/queue").await.json::<Value>();
    assert_eq!(depth["queueSize"], 1);
    assert!(app.queue.snapshot_path().exists());

    let orphan = app
        .server
        .post("/api/validation")
        .json(&json!({
            "uri": "https://docs.example.com/b.pdf",
            "filepath": "/tmp/heritrix/b.pdf",
            "jobDirectory": format!("/opt/heritrix/jobs/{}/latest/mirror", Uuid::new_v4()),
            "time": "2026-03-01T12:00:00Z"
        }))
        .await;
    assert_eq!(orphan.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.queue.len().await, 1);
}

#[tokio::test]
async fn test_office_documents_are_recorded() {
    let app = create_test_app().await;
    let job = Uuid::new_v4();

    for (path, file) in [
        ("/api/microsoft_office", "https://example.com/a.docx"),
        ("/api/odf", "https://example.com/b.odt"),
    ] {
        let response = app
            .server
            .post(path)
            .json(&json!({ "fileUrl": file, "jobId": job, "lastModified": "2026-03-01" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let count = OfficeDocumentRepositoryImpl::new(app.db.clone())
        .count_by_job(job)
        .await
        .unwrap();
    assert_eq!(count, 2);
}
