// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::office_document::OfficeDocument;
use crate::domain::repositories::office_document_repository::OfficeDocumentRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::office_document as office_document_entity;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 办公文档仓库实现
pub struct OfficeDocumentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OfficeDocumentRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OfficeDocumentRepository for OfficeDocumentRepositoryImpl {
    async fn add(&self, document: &OfficeDocument) -> Result<(), RepositoryError> {
        let model = office_document_entity::ActiveModel {
            file_url: Set(document.file_url.clone()),
            job_id: Set(document.job_id),
            kind: Set(document.kind.to_string()),
            last_modified: Set(document.last_modified.clone()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn count_by_job(&self, job_id: Uuid) -> Result<u64, RepositoryError> {
        let count = office_document_entity::Entity::find()
            .filter(office_document_entity::Column::JobId.eq(job_id))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
