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

/// 创建爬取任务表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CrawlJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrawlJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrawlJobs::CrawlUrl).string().not_null())
                    .col(ColumnDef::new(CrawlJobs::Status).string().not_null())
                    .col(ColumnDef::new(CrawlJobs::ScheduledDate).date())
                    .col(
                        ColumnDef::new(CrawlJobs::StartTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(CrawlJobs::FinishTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CrawlJobs::ResultUrl)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(CrawlJobs::ReportEmail).string())
                    .col(
                        ColumnDef::new(CrawlJobs::EmailNotificationSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CrawlJobs::Tracked)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crawl_jobs_crawl_url")
                    .table(CrawlJobs::Table)
                    .col(CrawlJobs::CrawlUrl)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CrawlJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CrawlJobs {
    Table,
    Id,
    CrawlUrl,
    Status,
    ScheduledDate,
    StartTime,
    FinishTime,
    ResultUrl,
    ReportEmail,
    EmailNotificationSent,
    Tracked,
}
