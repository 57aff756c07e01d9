//! File-backed document commands: new, apply.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use docmodel_core::{
    ActionEnvelope, DispatchOutcome, Dispatcher, Document, DocumentHeader, DocumentModel,
};
use docmodel_models::{ModelKind, PaymentTerms, Rfp, Workstream};

/// Inline JSON, or `@path` to read the envelope from a file.
pub fn parse_action(raw: &str) -> Result<ActionEnvelope> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read action file: {path}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("Invalid action envelope")
}

fn create_document<M: DocumentModel>(
    dir: &Path,
    name: Option<String>,
    slug: Option<String>,
) -> Result<PathBuf> {
    let mut header = DocumentHeader::new(M::DOCUMENT_TYPE);
    if let Some(name) = name {
        header = header.with_name(name);
    }
    if let Some(slug) = slug {
        header = header.with_slug(slug);
    }

    let document = Document::<M>::with_header(header);
    let path = document
        .save(dir)
        .with_context(|| format!("Failed to write document into {}", dir.display()))?;
    info!(document_id = document.id(), path = %path.display(), "Document created");
    Ok(path)
}

fn apply_action<M: DocumentModel>(path: &Path, action: ActionEnvelope) -> Result<DispatchOutcome> {
    let mut document = Document::<M>::load(path)
        .with_context(|| format!("Failed to load document: {}", path.display()))?;

    let action_type = action.action_type.clone();
    let outcome = Dispatcher::<M>::new()
        .dispatch(&mut document, action)
        .with_context(|| format!("{action_type} rejected"))?;

    if outcome != DispatchOutcome::Ignored {
        document
            .save_as(path)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
    }
    info!(document_id = document.id(), action_type = %action_type, ?outcome, "Action applied");
    Ok(outcome)
}

pub fn create(
    model: ModelKind,
    dir: &Path,
    name: Option<String>,
    slug: Option<String>,
) -> Result<()> {
    let path = match model {
        ModelKind::PaymentTerms => create_document::<PaymentTerms>(dir, name, slug)?,
        ModelKind::Workstream => create_document::<Workstream>(dir, name, slug)?,
        ModelKind::Rfp => create_document::<Rfp>(dir, name, slug)?,
    };
    println!("{}", json!({ "model": model.name(), "path": path.display().to_string() }));
    Ok(())
}

pub fn apply(model: ModelKind, path: &Path, raw_action: &str) -> Result<()> {
    let action = parse_action(raw_action)?;
    let outcome = match model {
        ModelKind::PaymentTerms => apply_action::<PaymentTerms>(path, action)?,
        ModelKind::Workstream => apply_action::<Workstream>(path, action)?,
        ModelKind::Rfp => apply_action::<Rfp>(path, action)?,
    };
    println!("{}", outcome_json(&outcome));
    Ok(())
}

fn outcome_json(outcome: &DispatchOutcome) -> serde_json::Value {
    match outcome {
        DispatchOutcome::Committed { scope, index } => {
            json!({ "outcome": "committed", "scope": scope, "index": index })
        }
        DispatchOutcome::Delegated => json!({ "outcome": "delegated" }),
        DispatchOutcome::Ignored => json!({ "outcome": "ignored" }),
    }
}
