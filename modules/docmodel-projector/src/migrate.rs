//! Idempotent, additive schema migrations for the projection table.
//!
//! The default strategy introspects `information_schema` first and issues
//! only the statements the catalog says are missing. `AttemptAndIgnore` is
//! kept for engines whose catalogs can't be trusted: it issues every
//! statement and swallows only the named duplicate-object errors.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::error::{ConfigError, ProjectorError};
use crate::TABLE;

/// SQLSTATE `duplicate_table`.
pub const SQLSTATE_DUPLICATE_TABLE: &str = "42P07";
/// SQLSTATE `duplicate_column`.
pub const SQLSTATE_DUPLICATE_COLUMN: &str = "42701";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

pub const PRIMARY_KEY: &str = "workstream_phid";

/// Fixed column set of this projector version. New columns are appended
/// here and reach existing tables through `ALTER TABLE ... ADD COLUMN`.
pub const COLUMNS: &[Column] = &[
    Column { name: PRIMARY_KEY, sql_type: "TEXT" },
    Column { name: "workstream_slug", sql_type: "TEXT" },
    Column { name: "workstream_title", sql_type: "TEXT" },
    Column { name: "workstream_status", sql_type: "TEXT" },
    Column { name: "network_phid", sql_type: "TEXT" },
    Column { name: "network_slug", sql_type: "TEXT" },
    Column { name: "drive_id", sql_type: "TEXT" },
    Column { name: "rfp_phid", sql_type: "TEXT" },
    Column { name: "initial_proposal_status", sql_type: "TEXT" },
    Column { name: "initial_proposal_author", sql_type: "TEXT" },
    Column { name: "sow_phid", sql_type: "TEXT" },
    Column { name: "payment_terms_phid", sql_type: "TEXT" },
    Column { name: "created_at", sql_type: "TIMESTAMPTZ" },
    Column { name: "updated_at", sql_type: "TIMESTAMPTZ" },
];

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStrategy {
    /// Probe the catalog, then create or extend only what is missing.
    #[default]
    Introspect,
    /// Issue every statement; ignore duplicate table / column errors.
    AttemptAndIgnore,
}

impl fmt::Display for MigrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MigrationStrategy::Introspect => "introspect",
            MigrationStrategy::AttemptAndIgnore => "attempt",
        })
    }
}

impl FromStr for MigrationStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "introspect" => Ok(MigrationStrategy::Introspect),
            "attempt" | "attempt_and_ignore" => Ok(MigrationStrategy::AttemptAndIgnore),
            _ => Err(ConfigError::Invalid {
                key: "PROJECTOR_MIGRATION_STRATEGY",
                value: s.to_string(),
                reason: "expected `introspect` or `attempt`".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// What the catalog reported about the owned table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub table_exists: bool,
    pub columns: BTreeSet<String>,
}

impl Catalog {
    pub fn missing_columns(&self) -> Vec<&'static Column> {
        COLUMNS
            .iter()
            .filter(|c| !self.columns.contains(c.name))
            .collect()
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn create_table_sql(table: &str) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| {
            if c.name == PRIMARY_KEY {
                format!("{} {} PRIMARY KEY", c.name, c.sql_type)
            } else {
                format!("{} {}", c.name, c.sql_type)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {table} ({columns})")
}

fn add_column_sql(table: &str, column: &Column) -> String {
    format!("ALTER TABLE {table} ADD COLUMN {} {}", column.name, column.sql_type)
}

/// Statements that bring `catalog` up to the current column set, in order.
/// Empty when nothing is missing.
pub fn plan(table: &str, catalog: &Catalog) -> Vec<String> {
    if !catalog.table_exists {
        return vec![create_table_sql(table)];
    }
    catalog
        .missing_columns()
        .into_iter()
        .map(|column| add_column_sql(table, column))
        .collect()
}

// ---------------------------------------------------------------------------
// Migrator
// ---------------------------------------------------------------------------

/// Outcome of one `migrate` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub created_table: bool,
    pub added_columns: Vec<String>,
    /// Statements skipped because the object already existed.
    pub skipped: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        !self.created_table && self.added_columns.is_empty()
    }
}

/// Owns the projection table inside one namespace (a Postgres schema).
#[derive(Debug, Clone)]
pub struct Migrator {
    namespace: String,
    strategy: MigrationStrategy,
}

impl Migrator {
    pub fn new(namespace: impl Into<String>, strategy: MigrationStrategy) -> Self {
        Self {
            namespace: namespace.into(),
            strategy,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Schema-qualified, quoted table name.
    pub fn table(&self) -> String {
        format!("{}.{}", quote_ident(&self.namespace), quote_ident(TABLE))
    }

    /// Create the namespace and table, or add any missing columns.
    /// Safe to run any number of times, including concurrently: runs for the
    /// same namespace are serialized on a session advisory lock.
    pub async fn migrate(&self, pool: &PgPool) -> Result<MigrationReport, ProjectorError> {
        info!(namespace = %self.namespace, strategy = %self.strategy, "Running projection migrations...");

        let mut conn = pool.acquire().await?;
        sqlx::query("SELECT pg_advisory_lock(hashtext($1))")
            .bind(&self.namespace)
            .execute(&mut *conn)
            .await?;

        let result = self.migrate_locked(&mut conn).await;

        let unlocked = sqlx::query("SELECT pg_advisory_unlock(hashtext($1))")
            .bind(&self.namespace)
            .execute(&mut *conn)
            .await;
        if unlocked.is_err() {
            // Session locks die with the session.
            drop(conn.detach());
        }
        let report = result?;
        unlocked?;

        info!(
            namespace = %self.namespace,
            created_table = report.created_table,
            added_columns = report.added_columns.len(),
            skipped = report.skipped,
            "Projection migrations complete"
        );
        Ok(report)
    }

    async fn migrate_locked(&self, conn: &mut PgConnection) -> Result<MigrationReport, ProjectorError> {
        let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.namespace));
        execute(conn, &create_schema).await?;

        match self.strategy {
            MigrationStrategy::Introspect => self.migrate_introspect(conn).await,
            MigrationStrategy::AttemptAndIgnore => self.migrate_attempt(conn).await,
        }
    }

    async fn migrate_introspect(&self, conn: &mut PgConnection) -> Result<MigrationReport, ProjectorError> {
        // A failed probe propagates: guessing either way could skip columns
        // or collide with an existing table.
        let catalog = self.read_catalog(conn).await?;
        let table = self.table();

        for statement in plan(&table, &catalog) {
            execute(conn, &statement).await?;
        }

        Ok(MigrationReport {
            created_table: !catalog.table_exists,
            added_columns: if catalog.table_exists {
                catalog
                    .missing_columns()
                    .iter()
                    .map(|c| c.name.to_string())
                    .collect()
            } else {
                Vec::new()
            },
            skipped: 0,
        })
    }

    async fn migrate_attempt(&self, conn: &mut PgConnection) -> Result<MigrationReport, ProjectorError> {
        let table = self.table();
        let mut report = MigrationReport::default();

        if run_ignoring_duplicates(conn, &create_table_sql(&table)).await? {
            report.created_table = true;
            return Ok(report);
        }
        report.skipped += 1;

        for column in COLUMNS.iter().filter(|c| c.name != PRIMARY_KEY) {
            if run_ignoring_duplicates(conn, &add_column_sql(&table, column)).await? {
                report.added_columns.push(column.name.to_string());
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }

    /// Read the table's presence and column names from `information_schema`.
    pub async fn inspect(&self, pool: &PgPool) -> Result<Catalog, ProjectorError> {
        let mut conn = pool.acquire().await?;
        self.read_catalog(&mut conn).await
    }

    async fn read_catalog(&self, conn: &mut PgConnection) -> Result<Catalog, ProjectorError> {
        let (table_exists,) = sqlx::query_as::<_, (bool,)>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )
            "#,
        )
        .bind(&self.namespace)
        .bind(TABLE)
        .fetch_one(&mut *conn)
        .await?;

        if !table_exists {
            return Ok(Catalog::default());
        }

        let columns = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT column_name::TEXT FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            "#,
        )
        .bind(&self.namespace)
        .bind(TABLE)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|(name,)| name)
        .collect();

        Ok(Catalog {
            table_exists,
            columns,
        })
    }

    /// Drop the owned table. Used for full namespace teardown only.
    pub async fn down(&self, pool: &PgPool) -> Result<(), ProjectorError> {
        let statement = format!("DROP TABLE IF EXISTS {}", self.table());
        let mut conn = pool.acquire().await?;
        execute(&mut conn, &statement).await?;
        info!(namespace = %self.namespace, "Projection table dropped");
        Ok(())
    }
}

async fn execute(conn: &mut PgConnection, statement: &str) -> Result<(), ProjectorError> {
    sqlx::query(statement)
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|source| ProjectorError::Migration {
            statement: statement.to_string(),
            source,
        })
}

/// `Ok(true)` when the statement ran, `Ok(false)` when it hit a duplicate
/// table or column.
async fn run_ignoring_duplicates(conn: &mut PgConnection, statement: &str) -> Result<bool, ProjectorError> {
    match sqlx::query(statement).execute(&mut *conn).await {
        Ok(_) => Ok(true),
        Err(e) => match duplicate_object(&e) {
            Some(kind) => {
                warn!(kind, statement = %statement, "Already exists (skipped)");
                Ok(false)
            }
            None => Err(ProjectorError::Migration {
                statement: statement.to_string(),
                source: e,
            }),
        },
    }
}

/// Name of the duplicate-object error, if `err` is one we tolerate.
fn duplicate_object(err: &sqlx::Error) -> Option<&'static str> {
    let code = err.as_database_error()?.code()?;
    match code.as_ref() {
        SQLSTATE_DUPLICATE_TABLE => Some("duplicate_table"),
        SQLSTATE_DUPLICATE_COLUMN => Some("duplicate_column"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: &str = r#""ns"."workstreams""#;

    fn catalog(columns: &[&str]) -> Catalog {
        Catalog {
            table_exists: true,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn fresh_catalog_creates_full_table() {
        let statements = plan(T, &Catalog::default());
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with(r#"CREATE TABLE "ns"."workstreams" (workstream_phid TEXT PRIMARY KEY"#));
        for column in COLUMNS {
            assert!(statements[0].contains(column.name));
        }
    }

    #[test]
    fn complete_catalog_needs_nothing() {
        let all: Vec<&str> = COLUMNS.iter().map(|c| c.name).collect();
        assert!(plan(T, &catalog(&all)).is_empty());
    }

    #[test]
    fn partial_catalog_adds_only_missing_columns_in_order() {
        let present: Vec<&str> = COLUMNS
            .iter()
            .map(|c| c.name)
            .filter(|n| *n != "rfp_phid" && *n != "updated_at")
            .collect();

        assert_eq!(
            plan(T, &catalog(&present)),
            vec![
                format!("ALTER TABLE {T} ADD COLUMN rfp_phid TEXT"),
                format!("ALTER TABLE {T} ADD COLUMN updated_at TIMESTAMPTZ"),
            ]
        );
    }

    #[test]
    fn unknown_extra_columns_are_left_alone() {
        let mut all: Vec<&str> = COLUMNS.iter().map(|c| c.name).collect();
        all.push("legacy_column");
        assert!(plan(T, &catalog(&all)).is_empty());
    }

    #[test]
    fn quoted_table_name() {
        let migrator = Migrator::new("workstreams_drive_1a2b3c4d", MigrationStrategy::Introspect);
        assert_eq!(migrator.table(), r#""workstreams_drive_1a2b3c4d"."workstreams""#);
    }

    #[test]
    fn strategy_parses_from_env_values() {
        assert_eq!("introspect".parse::<MigrationStrategy>().unwrap(), MigrationStrategy::Introspect);
        assert_eq!("ATTEMPT".parse::<MigrationStrategy>().unwrap(), MigrationStrategy::AttemptAndIgnore);
        assert!("guess".parse::<MigrationStrategy>().is_err());
    }
}
