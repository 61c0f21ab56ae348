// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::memory_database;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use vericrawl::domain::models::crawl_job::{CrawlJob, CrawlJobStatus};
use vericrawl::domain::models::validation::RuleViolation;
use vericrawl::domain::repositories::crawl_job_repository::{CrawlJobRepository, RepositoryError};
use vericrawl::domain::repositories::validated_document_repository::ValidatedDocumentRepository;
use vericrawl::infrastructure::database::entities::{
    crawl_job as crawl_job_entity, document_error, document_property, pdf_property,
    processing_error,
};
use vericrawl::infrastructure::repositories::crawl_job_repo_impl::CrawlJobRepositoryImpl;
use vericrawl::infrastructure::repositories::validated_document_repo_impl::ValidatedDocumentRepositoryImpl;

#[tokio::test]
async fn test_crawl_job_round_trip_and_update() {
    let db = memory_database().await;
    let repo = CrawlJobRepositoryImpl::new(db.clone());

    let mut job = CrawlJob::new(
        "https://example.com",
        NaiveDate::from_ymd_opt(2026, 3, 1),
        Some("ops@example.com".to_string()),
    );
    job.status = CrawlJobStatus::Running;
    repo.create(&job).await.unwrap();

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.crawl_url, job.crawl_url);
    assert_eq!(stored.status, CrawlJobStatus::Running);
    assert_eq!(stored.scheduled_date, job.scheduled_date);
    assert_eq!(stored.start_time.timestamp(), job.start_time.timestamp());
    assert!(stored.finish_time.is_none());

    job.record_finish(CrawlJobStatus::Aborted, "/jobs/x/latest/".to_string(), Utc::now());
    job.claim_notification();
    repo.update(&job).await.unwrap();

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CrawlJobStatus::Aborted);
    assert_eq!(stored.result_url, "/jobs/x/latest/");
    assert!(stored.finish_time.is_some());
    assert!(stored.email_notification_sent);
    assert_eq!(stored.ledger.snapshot().valid_documents, 0);
}

#[tokio::test]
async fn test_untracked_jobs_are_not_restored() {
    let db = memory_database().await;
    let repo = CrawlJobRepositoryImpl::new(db.clone());

    let kept = CrawlJob::new("https://kept.example.com", None, None);
    let dropped = CrawlJob::new("https://dropped.example.com", None, None);
    repo.create(&kept).await.unwrap();
    repo.create(&dropped).await.unwrap();
    repo.untrack(dropped.id).await.unwrap();

    let tracked = repo.find_tracked().await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].id, kept.id);
    assert!(repo.find_by_id(dropped.id).await.unwrap().is_some());

    repo.remove(dropped.id).await.unwrap();
    assert!(repo.find_by_id(dropped.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_of_missing_job_is_not_found() {
    let db = memory_database().await;
    let repo = CrawlJobRepositoryImpl::new(db);
    let job = CrawlJob::new("https://example.com", None, None);

    assert!(matches!(
        repo.update(&job).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_unknown_status_is_reported_as_corrupt() {
    let db = memory_database().await;
    let repo = CrawlJobRepositoryImpl::new(db.clone());
    let job = CrawlJob::new("https://example.com", None, None);
    repo.create(&job).await.unwrap();

    crawl_job_entity::ActiveModel {
        id: Set(job.id),
        status: Set("exploded".to_string()),
        ..Default::default()
    }
    .update(db.as_ref())
    .await
    .unwrap();

    assert!(matches!(
        repo.find_by_id(job.id).await,
        Err(RepositoryError::Corrupt(_))
    ));
}

#[tokio::test]
async fn test_validated_document_findings_are_stored() {
    let db = memory_database().await;
    let repo = ValidatedDocumentRepositoryImpl::new(db.clone());
    let url = "https://example.com/a.pdf";

    repo.add_error(
        url,
        &RuleViolation {
            rule_id: "6.2.11.4".to_string(),
            message: "font not embedded".to_string(),
        },
    )
    .await
    .unwrap();
    repo.add_property(url, "producer", "LibreOffice").await.unwrap();
    repo.add_processing_error(url, "timed out").await.unwrap();

    let errors = document_error::Entity::find().all(db.as_ref()).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule_id, "6.2.11.4");
    let properties = document_property::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(properties[0].value, "LibreOffice");
    let processing = processing_error::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(processing[0].message, "timed out");
}

#[tokio::test]
async fn test_pdf_property_selectors() {
    let db = memory_database().await;
    let repo = ValidatedDocumentRepositoryImpl::new(db.clone());
    assert!(repo.pdf_properties_with_xpath().await.unwrap().is_empty());

    for (name, xpath) in [
        ("producer", "//pdf:Producer"),
        ("creatorTool", "//xmp:CreatorTool"),
    ] {
        pdf_property::ActiveModel {
            name: Set(name.to_string()),
            xpath: Set(xpath.to_string()),
        }
        .insert(db.as_ref())
        .await
        .unwrap();
    }

    let selectors = repo.pdf_properties_with_xpath().await.unwrap();
    assert_eq!(selectors.len(), 2);
    assert_eq!(selectors["producer"], "//pdf:Producer");
}
