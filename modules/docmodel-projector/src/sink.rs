//! RowSink implementations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::ProjectorError;
use crate::migrate::{Migrator, COLUMNS, PRIMARY_KEY};
use crate::row::WorkstreamRow;

/// Destination for projected rows. Upserts are keyed by `workstream_phid`
/// and must be idempotent.
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn upsert(&self, row: &WorkstreamRow) -> Result<(), ProjectorError>;

    async fn get(&self, workstream_phid: &str) -> Result<Option<WorkstreamRow>, ProjectorError>;
}

#[async_trait]
impl<S: RowSink> RowSink for Arc<S> {
    async fn upsert(&self, row: &WorkstreamRow) -> Result<(), ProjectorError> {
        (**self).upsert(row).await
    }

    async fn get(&self, workstream_phid: &str) -> Result<Option<WorkstreamRow>, ProjectorError> {
        (**self).get(workstream_phid).await
    }
}

// ---------------------------------------------------------------------------
// PgRowSink (Postgres)
// ---------------------------------------------------------------------------

/// Writes rows into the migrator's table.
#[derive(Clone)]
pub struct PgRowSink {
    pool: PgPool,
    upsert_sql: String,
    select_sql: String,
}

impl PgRowSink {
    pub fn new(pool: PgPool, migrator: &Migrator) -> Self {
        let table = migrator.table();
        let names: Vec<&str> = COLUMNS.iter().map(|c| c.name).collect();
        let placeholders = (1..=names.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let updates = names
            .iter()
            .filter(|n| **n != PRIMARY_KEY)
            .map(|n| format!("{n} = EXCLUDED.{n}"))
            .collect::<Vec<_>>()
            .join(", ");

        let upsert_sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
             ON CONFLICT ({PRIMARY_KEY}) DO UPDATE SET {updates}",
            columns = names.join(", "),
        );
        let select_sql = format!(
            "SELECT {columns} FROM {table} WHERE {PRIMARY_KEY} = $1",
            columns = names.join(", "),
        );

        Self {
            pool,
            upsert_sql,
            select_sql,
        }
    }
}

#[async_trait]
impl RowSink for PgRowSink {
    async fn upsert(&self, row: &WorkstreamRow) -> Result<(), ProjectorError> {
        // Bind order follows COLUMNS.
        sqlx::query(&self.upsert_sql)
            .bind(&row.workstream_phid)
            .bind(&row.workstream_slug)
            .bind(&row.workstream_title)
            .bind(&row.workstream_status)
            .bind(&row.network_phid)
            .bind(&row.network_slug)
            .bind(&row.drive_id)
            .bind(&row.rfp_phid)
            .bind(&row.initial_proposal_status)
            .bind(&row.initial_proposal_author)
            .bind(&row.sow_phid)
            .bind(&row.payment_terms_phid)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, workstream_phid: &str) -> Result<Option<WorkstreamRow>, ProjectorError> {
        let row = sqlx::query_as::<_, WorkstreamRow>(&self.select_sql)
            .bind(workstream_phid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// MemoryRowSink (tests, no database)
// ---------------------------------------------------------------------------

/// In-memory row table. Thread-safe.
#[derive(Default)]
pub struct MemoryRowSink {
    rows: Mutex<BTreeMap<String, WorkstreamRow>>,
    writes: Mutex<usize>,
}

impl MemoryRowSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in key order (for test assertions).
    pub fn rows(&self) -> Vec<WorkstreamRow> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    /// Number of upserts received, including re-deliveries.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl RowSink for MemoryRowSink {
    async fn upsert(&self, row: &WorkstreamRow) -> Result<(), ProjectorError> {
        self.rows
            .lock()
            .unwrap()
            .insert(row.workstream_phid.clone(), row.clone());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn get(&self, workstream_phid: &str) -> Result<Option<WorkstreamRow>, ProjectorError> {
        Ok(self.rows.lock().unwrap().get(workstream_phid).cloned())
    }
}
