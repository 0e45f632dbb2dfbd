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

use crate::domain::models::index_record::{
    IndexRecord, QueuedDomainFrequency, QueuedIndexRecord, QueuedOmceSignature,
};
use crate::domain::repositories::index_repository::{IndexRepository, RepositoryError};
use crate::infrastructure::database::entities::{
    index_domain_split, index_record, index_url_split, omce_signature,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Postgres implementation of the durable index store.
pub struct IndexRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl IndexRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl IndexRepository for IndexRepositoryImpl {
    async fn query_url_level(
        &self,
        level: i16,
        url_hash: &str,
        newer_than: DateTime<Utc>,
        range_start: u64,
        range_end: u64,
    ) -> Result<Vec<String>, RepositoryError> {
        if range_end < range_start {
            return Err(RepositoryError::InvalidParameter(
                "empty row range".to_string(),
            ));
        }
        let rows = index_url_split::Entity::find()
            .filter(index_url_split::Column::Level.eq(level))
            .filter(index_url_split::Column::UrlHash.eq(url_hash))
            .filter(index_url_split::Column::CreatedAt.gt(newer_than))
            .order_by_desc(index_url_split::Column::CreatedAt)
            .offset(range_start)
            .limit(range_end - range_start + 1)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|row| row.url).collect())
    }

    async fn query_domain_level(
        &self,
        level: i16,
        domain_hash: &str,
        newer_than: DateTime<Utc>,
        range_start: u64,
        range_end: u64,
    ) -> Result<Vec<String>, RepositoryError> {
        if range_end < range_start {
            return Err(RepositoryError::InvalidParameter(
                "empty row range".to_string(),
            ));
        }
        let rows = index_domain_split::Entity::find()
            .filter(index_domain_split::Column::Level.eq(level))
            .filter(index_domain_split::Column::DomainHash.eq(domain_hash))
            .filter(index_domain_split::Column::CreatedAt.gt(newer_than))
            .order_by_desc(index_domain_split::Column::CreatedAt)
            .offset(range_start)
            .limit(range_end - range_start + 1)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|row| row.url).collect())
    }

    async fn query_omce_signatures(
        &self,
        domain_hash: &str,
        newer_than: DateTime<Utc>,
    ) -> Result<Vec<String>, RepositoryError> {
        let rows = omce_signature::Entity::find()
            .filter(omce_signature::Column::DomainHash.eq(domain_hash))
            .filter(omce_signature::Column::CreatedAt.gt(newer_than))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|row| row.signature).collect())
    }

    async fn find_record(
        &self,
        url_hash: &str,
    ) -> Result<Option<IndexRecord>, RepositoryError> {
        let model = index_record::Entity::find()
            .filter(index_record::Column::UrlHash.eq(url_hash))
            .order_by_desc(index_record::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(model.map(|m| IndexRecord {
            id: m.id,
            url: m.url,
            status_code: m.status_code,
            title: m.title,
            description: m.description,
            has_html: m.has_html,
            error: m.error,
            screenshot_url: m.screenshot_url,
            page_count: m.page_count,
            created_at: m.created_at.into(),
        }))
    }

    async fn insert_records(
        &self,
        batch: Vec<QueuedIndexRecord>,
    ) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut records = Vec::new();
        let mut url_splits = Vec::new();
        let mut domain_splits = Vec::new();

        for queued in batch {
            let created_at: DateTimeWithTimeZone = queued.record.created_at.into();
            records.push(index_record::ActiveModel {
                id: Set(queued.record.id),
                url: Set(queued.record.url.clone()),
                url_hash: Set(queued.url_hash),
                status_code: Set(queued.record.status_code),
                title: Set(queued.record.title),
                description: Set(queued.record.description),
                has_html: Set(queued.record.has_html),
                error: Set(queued.record.error),
                screenshot_url: Set(queued.record.screenshot_url),
                page_count: Set(queued.record.page_count),
                created_at: Set(created_at),
            });
            for split in queued.url_splits {
                url_splits.push(index_url_split::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    level: Set(split.level),
                    url_hash: Set(split.hash),
                    url: Set(queued.record.url.clone()),
                    created_at: Set(created_at),
                });
            }
            for split in queued.domain_splits {
                domain_splits.push(index_domain_split::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    level: Set(split.level),
                    domain_hash: Set(split.hash),
                    url: Set(queued.record.url.clone()),
                    created_at: Set(created_at),
                });
            }
        }

        index_record::Entity::insert_many(records)
            .on_conflict(
                OnConflict::column(index_record::Column::UrlHash)
                    .update_columns([
                        index_record::Column::Url,
                        index_record::Column::StatusCode,
                        index_record::Column::Title,
                        index_record::Column::Description,
                        index_record::Column::HasHtml,
                        index_record::Column::Error,
                        index_record::Column::ScreenshotUrl,
                        index_record::Column::PageCount,
                        index_record::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if !url_splits.is_empty() {
            index_url_split::Entity::insert_many(url_splits)
                .exec(self.db.as_ref())
                .await
                .map_err(db_error)?;
        }
        if !domain_splits.is_empty() {
            index_domain_split::Entity::insert_many(domain_splits)
                .exec(self.db.as_ref())
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }

    async fn bump_domain_frequencies(
        &self,
        batch: Vec<QueuedDomainFrequency>,
    ) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }

        // Collapse the batch so each domain takes one round-trip.
        let mut aggregated: HashMap<String, (String, i64)> = HashMap::new();
        for bump in batch {
            let entry = aggregated
                .entry(bump.domain_hash)
                .or_insert((bump.domain, 0));
            entry.1 += bump.hits;
        }

        for (domain_hash, (domain, hits)) in aggregated {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"INSERT INTO domain_frequencies (domain_hash, domain, hits, updated_at)
                   VALUES ($1, $2, $3, NOW())
                   ON CONFLICT (domain_hash)
                   DO UPDATE SET hits = domain_frequencies.hits + EXCLUDED.hits, updated_at = NOW()"#,
                [domain_hash.into(), domain.into(), hits.into()],
            );
            self.db.execute(stmt).await.map_err(db_error)?;
        }
        Ok(())
    }

    async fn upsert_omce_signatures(
        &self,
        batch: Vec<QueuedOmceSignature>,
    ) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }

        let models: Vec<omce_signature::ActiveModel> = batch
            .into_iter()
            .map(|signature| omce_signature::ActiveModel {
                id: Set(Uuid::new_v4()),
                domain_hash: Set(signature.domain_hash),
                signature: Set(signature.signature),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        omce_signature::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    omce_signature::Column::DomainHash,
                    omce_signature::Column::Signature,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
