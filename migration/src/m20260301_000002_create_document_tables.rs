// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use sea_orm_migration::prelude::*;

/// 创建文档校验结果相关表
///
/// 校验错误、提取属性和处理错误各自一张表，均以文档URL关联
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentErrors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentErrors::DocumentUrl).string().not_null())
                    .col(ColumnDef::new(DocumentErrors::RuleId).string().not_null())
                    .col(ColumnDef::new(DocumentErrors::Message).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentProperties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentProperties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentProperties::DocumentUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentProperties::Name).string().not_null())
                    .col(ColumnDef::new(DocumentProperties::Value).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessingErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessingErrors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProcessingErrors::DocumentUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessingErrors::Message).text().not_null())
                    .to_owned(),
            )
            .await?;

        // Property name -> XPath selector, sent to the validation service as settings
        manager
            .create_table(
                Table::create()
                    .table(PdfProperties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PdfProperties::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PdfProperties::Xpath).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_errors_document_url")
                    .table(DocumentErrors::Table)
                    .col(DocumentErrors::DocumentUrl)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_properties_document_url")
                    .table(DocumentProperties::Table)
                    .col(DocumentProperties::DocumentUrl)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PdfProperties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessingErrors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentProperties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentErrors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DocumentErrors {
    Table,
    Id,
    DocumentUrl,
    RuleId,
    Message,
}

#[derive(DeriveIden)]
enum DocumentProperties {
    Table,
    Id,
    DocumentUrl,
    Name,
    Value,
}

#[derive(DeriveIden)]
enum ProcessingErrors {
    Table,
    Id,
    DocumentUrl,
    Message,
}

#[derive(DeriveIden)]
enum PdfProperties {
    Table,
    Name,
    Xpath,
}
