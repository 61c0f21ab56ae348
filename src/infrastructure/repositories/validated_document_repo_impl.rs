// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::validation::RuleViolation;
use crate::domain::repositories::validated_document_repository::ValidatedDocumentRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    document_error, document_property, pdf_property, processing_error,
};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 校验文档仓库实现
pub struct ValidatedDocumentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ValidatedDocumentRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ValidatedDocumentRepository for ValidatedDocumentRepositoryImpl {
    async fn add_error(
        &self,
        document_url: &str,
        error: &RuleViolation,
    ) -> Result<(), RepositoryError> {
        let model = document_error::ActiveModel {
            document_url: Set(document_url.to_string()),
            rule_id: Set(error.rule_id.clone()),
            message: Set(error.message.clone()),
            ..Default::default()
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn add_property(
        &self,
        document_url: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let model = document_property::ActiveModel {
            document_url: Set(document_url.to_string()),
            name: Set(name.to_string()),
            value: Set(value.to_string()),
            ..Default::default()
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn add_processing_error(
        &self,
        document_url: &str,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let model = processing_error::ActiveModel {
            document_url: Set(document_url.to_string()),
            message: Set(message.to_string()),
            ..Default::default()
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn pdf_properties_with_xpath(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        let rows = pdf_property::Entity::find().all(self.db.as_ref()).await?;
        Ok(rows.into_iter().map(|m| (m.name, m.xpath)).collect())
    }
}
