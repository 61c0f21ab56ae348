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

/// 创建办公文档元数据表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfficeDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfficeDocuments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OfficeDocuments::FileUrl).string().not_null())
                    .col(ColumnDef::new(OfficeDocuments::JobId).uuid().not_null())
                    .col(ColumnDef::new(OfficeDocuments::Kind).string().not_null())
                    .col(ColumnDef::new(OfficeDocuments::LastModified).string())
                    .col(
                        ColumnDef::new(OfficeDocuments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_office_documents_job_id")
                    .table(OfficeDocuments::Table)
                    .col(OfficeDocuments::JobId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OfficeDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OfficeDocuments {
    Table,
    Id,
    FileUrl,
    JobId,
    Kind,
    LastModified,
    CreatedAt,
}
