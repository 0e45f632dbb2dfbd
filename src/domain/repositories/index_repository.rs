// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::index_record::{
    IndexRecord, QueuedDomainFrequency, QueuedIndexRecord, QueuedOmceSignature,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Contract of the durable index store. Reads are windowed by server-side
/// row ranges so the query loop can paginate; writes are bulk inserts driven
/// by the queue drain.
#[async_trait]
pub trait IndexRepository: Send + Sync {
    /// URLs stored under a path-prefix split `(level, hash)` that are newer
    /// than `newer_than`, windowed to `[range_start, range_end]` inclusive.
    async fn query_url_level(
        &self,
        level: i16,
        url_hash: &str,
        newer_than: DateTime<Utc>,
        range_start: u64,
        range_end: u64,
    ) -> Result<Vec<String>, RepositoryError>;

    /// URLs stored under a subdomain split `(level, hash)`, same windowing.
    async fn query_domain_level(
        &self,
        level: i16,
        domain_hash: &str,
        newer_than: DateTime<Utc>,
        range_start: u64,
        range_end: u64,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Cross-encounter dedup signatures stored for a bare domain.
    async fn query_omce_signatures(
        &self,
        domain_hash: &str,
        newer_than: DateTime<Utc>,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Stored record for a canonical URL hash, for metadata enrichment.
    async fn find_record(&self, url_hash: &str)
        -> Result<Option<IndexRecord>, RepositoryError>;

    async fn insert_records(
        &self,
        batch: Vec<QueuedIndexRecord>,
    ) -> Result<(), RepositoryError>;

    async fn bump_domain_frequencies(
        &self,
        batch: Vec<QueuedDomainFrequency>,
    ) -> Result<(), RepositoryError>;

    /// Upsert-if-needed: re-inserting an existing (domain, signature) pair is
    /// a no-op.
    async fn upsert_omce_signatures(
        &self,
        batch: Vec<QueuedOmceSignature>,
    ) -> Result<(), RepositoryError>;
}
