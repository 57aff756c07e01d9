//! Database-backed commands: migrate, down, project.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use docmodel_projector::{
    DocumentEvent, Migrator, PgRowSink, ProjectorConfig, WorkstreamProjector,
};

fn load_config(filter_file: Option<&Path>) -> Result<ProjectorConfig> {
    let config = ProjectorConfig::from_env().context("Failed to load projector config")?;
    match filter_file {
        Some(path) => Ok(config.with_filter_file(path)?),
        None => Ok(config),
    }
}

async fn connect(config: &ProjectorConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to DATABASE_URL")?;
    info!(max_connections = config.max_connections, "Connected to database");
    Ok(pool)
}

fn migrator(config: &ProjectorConfig) -> Migrator {
    Migrator::new(config.namespace(), config.migration_strategy)
}

pub async fn migrate(filter_file: Option<&Path>) -> Result<()> {
    let config = load_config(filter_file)?;
    let pool = connect(&config).await?;

    let report = migrator(&config).migrate(&pool).await?;
    println!(
        "{}",
        serde_json::json!({
            "namespace": config.namespace(),
            "createdTable": report.created_table,
            "addedColumns": report.added_columns,
            "skipped": report.skipped,
        })
    );
    Ok(())
}

pub async fn down(filter_file: Option<&Path>) -> Result<()> {
    let config = load_config(filter_file)?;
    let pool = connect(&config).await?;

    migrator(&config).down(&pool).await?;
    println!("{}", serde_json::json!({ "namespace": config.namespace(), "dropped": true }));
    Ok(())
}

/// Parse a JSONL event file. Blank lines are skipped.
pub fn read_events(path: &Path) -> Result<Vec<DocumentEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            DocumentEvent::from_json_line(line)
                .with_context(|| format!("{}:{}: invalid document event", path.display(), i + 1))
        })
        .collect()
}

pub async fn project(filter_file: Option<&Path>, events_path: &Path, run_migrations: bool) -> Result<()> {
    let config = load_config(filter_file)?;
    let events = read_events(events_path)?;
    let pool = connect(&config).await?;

    let migrator = migrator(&config);
    if run_migrations {
        migrator.migrate(&pool).await?;
    }

    let projector = WorkstreamProjector::new(&config.drive_id, PgRowSink::new(pool, &migrator))
        .with_filter(config.filter.clone());
    let stats = projector.handle_batch(&events).await?;

    println!(
        "{}",
        serde_json::json!({
            "namespace": projector.namespace(),
            "events": events.len(),
            "applied": stats.applied,
            "noop": stats.noop,
            "errors": stats.errors,
        })
    );
    Ok(())
}
