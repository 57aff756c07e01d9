//! Dispatcher contract tests against a small two-scope model.

use std::sync::{Arc, Mutex};

use docmodel_core::collection::{find_mut, insert_unique, remove_by_id};
use docmodel_core::{
    ActionEnvelope, DispatchError, DispatchOutcome, Dispatcher, Document, DocumentHeader,
    DocumentModel, DomainError, FieldViolation, Identified, LifecycleHandler, OperationLogs,
    PersistError, ReplayError, Scope, Validate, ValidationError, ViolationKind, Violations,
};
use docmodel_core::registry::ActionRegistry;
use serde::{Deserialize, Serialize};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Checklist;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ChecklistState {
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: String,
    label: String,
    done: bool,
}

impl Identified for Item {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ViewState {
    selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddItemInput {
    id: String,
    label: String,
}

impl Validate for AddItemInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id).non_empty("label", &self.label);
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdInput {
    id: String,
}

impl Validate for IdInput {}

#[derive(Debug, Clone)]
enum ChecklistAction {
    AddItem(AddItemInput),
    CheckItem(IdInput),
    RemoveItem(IdInput),
}

#[derive(Debug, Clone)]
enum ViewAction {
    Select(IdInput),
}

impl DocumentModel for Checklist {
    const DOCUMENT_TYPE: &'static str = "docmodel/checklist";

    type GlobalState = ChecklistState;
    type LocalState = ViewState;
    type GlobalAction = ChecklistAction;
    type LocalAction = ViewAction;

    fn register(registry: &mut ActionRegistry<Self>) {
        registry
            .global("ADD_ITEM", ChecklistAction::AddItem)
            .global("CHECK_ITEM", ChecklistAction::CheckItem)
            .global("REMOVE_ITEM", ChecklistAction::RemoveItem)
            .local("SELECT_ITEM", ViewAction::Select);
    }

    fn reduce_global(state: &mut ChecklistState, action: &ChecklistAction) -> Result<(), DomainError> {
        match action {
            ChecklistAction::AddItem(input) => insert_unique(
                &mut state.items,
                Item {
                    id: input.id.clone(),
                    label: input.label.clone(),
                    done: false,
                },
                "items",
            ),
            ChecklistAction::CheckItem(input) => {
                find_mut(&mut state.items, &input.id, "items")?.done = true;
                Ok(())
            }
            ChecklistAction::RemoveItem(input) => {
                remove_by_id(&mut state.items, &input.id, "items").map(|_| ())
            }
        }
    }

    fn reduce_local(state: &mut ViewState, action: &ViewAction) -> Result<(), DomainError> {
        match action {
            ViewAction::Select(input) => {
                state.selected = Some(input.id.clone());
                Ok(())
            }
        }
    }
}

fn add(id: &str, label: &str) -> ActionEnvelope {
    ActionEnvelope::global("ADD_ITEM", json!({"id": id, "label": label}))
}

fn labels(doc: &Document<Checklist>) -> Vec<String> {
    doc.global().items.iter().map(|i| i.label.clone()).collect()
}

// =========================================================================
// Commit path
// =========================================================================

#[test]
fn committed_action_appends_at_next_index() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();

    let first = dispatcher.dispatch(&mut doc, add("a", "Alpha")).unwrap();
    let second = dispatcher.dispatch(&mut doc, add("b", "Beta")).unwrap();

    assert_eq!(first, DispatchOutcome::Committed { scope: Scope::Global, index: 0 });
    assert_eq!(second, DispatchOutcome::Committed { scope: Scope::Global, index: 1 });
    assert_eq!(doc.revision(Scope::Global), 2);
    assert_eq!(doc.revision(Scope::Local), 0);

    let log = doc.log(Scope::Global);
    assert_eq!(log.get(1).unwrap().action.action_type, "ADD_ITEM");
    assert_eq!(log.get(1).unwrap().hash, doc.state_hash(Scope::Global));
    assert_eq!(labels(&doc), vec!["Alpha", "Beta"]);
}

#[test]
fn host_supplied_id_and_timestamp_are_kept() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();
    let id = uuid::Uuid::new_v4();
    let ts = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    dispatcher
        .dispatch(&mut doc, add("a", "Alpha").with_id(id).with_timestamp(ts))
        .unwrap();

    let op = doc.log(Scope::Global).last().unwrap();
    assert_eq!(op.id, id);
    assert_eq!(op.timestamp, ts);
    assert_eq!(doc.header().last_modified, ts);
}

#[test]
fn local_actions_only_touch_the_local_slice() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();
    dispatcher.dispatch(&mut doc, add("a", "Alpha")).unwrap();

    let outcome = dispatcher
        .dispatch(&mut doc, ActionEnvelope::local("SELECT_ITEM", json!({"id": "a"})))
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Committed { scope: Scope::Local, index: 0 });
    assert_eq!(doc.local().selected.as_deref(), Some("a"));
    assert_eq!(doc.revision(Scope::Global), 1);
    assert_eq!(doc.revision(Scope::Local), 1);
}

// =========================================================================
// Rejections leave the document untouched
// =========================================================================

#[test]
fn unknown_action_type_is_ignored() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();
    dispatcher.dispatch(&mut doc, add("a", "Alpha")).unwrap();
    let before = doc.to_json().unwrap();

    let outcome = dispatcher
        .dispatch(&mut doc, ActionEnvelope::global("ARCHIVE_ITEM", json!({"id": "a"})))
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert_eq!(doc.to_json().unwrap(), before);
}

#[test]
fn invalid_input_is_rejected_before_reduce() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();
    let before = doc.clone();

    let err = dispatcher
        .dispatch(&mut doc, ActionEnvelope::global("ADD_ITEM", json!({"id": "a b", "label": ""})))
        .unwrap_err();

    let DispatchError::Validation(validation) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(validation.has_field("id"));
    assert!(validation.has_field("label"));
    assert_eq!(err.kind(), "VALIDATION_ERROR");
    assert_eq!(doc, before);
}

#[test]
fn declared_scope_must_match_registration() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();

    let err = dispatcher
        .dispatch(&mut doc, ActionEnvelope::local("ADD_ITEM", json!({"id": "a", "label": "A"})))
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::Validation(ValidationError::single(
            "ADD_ITEM",
            FieldViolation::new("scope", ViolationKind::NotAllowed("local".into())),
        ))
    );
    assert_eq!(doc.revision(Scope::Local), 0);
    assert_eq!(doc.revision(Scope::Global), 0);
}

#[test]
fn domain_error_does_not_append() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();
    dispatcher.dispatch(&mut doc, add("a", "Alpha")).unwrap();
    let before = doc.clone();

    let err = dispatcher.dispatch(&mut doc, add("a", "Again")).unwrap_err();
    assert_eq!(err, DispatchError::Domain(DomainError::duplicate("items", "a")));

    let err = dispatcher
        .dispatch(&mut doc, ActionEnvelope::global("CHECK_ITEM", json!({"id": "zz"})))
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");

    assert_eq!(doc, before);
}

#[test]
fn dispatch_all_stops_at_first_failure() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();

    let result = dispatcher.dispatch_all(
        &mut doc,
        vec![add("a", "Alpha"), add("a", "Dup"), add("b", "Beta")],
    );

    assert!(result.is_err());
    assert_eq!(doc.revision(Scope::Global), 1);
    assert_eq!(labels(&doc), vec!["Alpha"]);
}

#[test]
fn validate_does_not_dispatch() {
    let dispatcher = Dispatcher::<Checklist>::new();

    assert!(dispatcher.validate(&add("a", "Alpha")).unwrap().is_some());
    assert!(dispatcher
        .validate(&ActionEnvelope::global("UNKNOWN", json!(null)))
        .unwrap()
        .is_none());
    assert!(dispatcher
        .validate(&ActionEnvelope::global("ADD_ITEM", json!({"label": "x"})))
        .is_err());
}

// =========================================================================
// Lifecycle actions
// =========================================================================

#[test]
fn set_name_is_delegated_and_not_logged() {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::new();

    let outcome = dispatcher
        .dispatch(&mut doc, ActionEnvelope::global("SET_NAME", json!("Launch checklist")))
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Delegated);
    assert_eq!(doc.header().name, "Launch checklist");
    assert_eq!(doc.operations().total(), 0);
    assert_eq!(doc.global(), &Default::default());
}

#[derive(Clone, Default)]
struct RecordingLifecycle {
    seen: Arc<Mutex<Vec<String>>>,
}

impl LifecycleHandler for RecordingLifecycle {
    fn handle(
        &self,
        _header: &mut DocumentHeader,
        action: &ActionEnvelope,
    ) -> Result<(), ValidationError> {
        self.seen.lock().unwrap().push(action.action_type.clone());
        Ok(())
    }
}

#[test]
fn custom_lifecycle_handler_receives_host_actions() {
    let recorder = RecordingLifecycle::default();
    let dispatcher = Dispatcher::<Checklist>::with_lifecycle(recorder.clone());
    let mut doc = Document::<Checklist>::new();

    dispatcher
        .dispatch(&mut doc, ActionEnvelope::global("UNDO", json!({"count": 1})))
        .unwrap();
    dispatcher
        .dispatch(&mut doc, ActionEnvelope::local("PRUNE", json!({})))
        .unwrap();

    assert_eq!(*recorder.seen.lock().unwrap(), vec!["UNDO", "PRUNE"]);
    assert_eq!(doc.operations().total(), 0);
}

// =========================================================================
// Replay and persistence
// =========================================================================

fn populated() -> Document<Checklist> {
    let dispatcher = Dispatcher::<Checklist>::new();
    let mut doc = Document::<Checklist>::with_header(
        DocumentHeader::new(Checklist::DOCUMENT_TYPE).with_slug("launch"),
    );
    dispatcher
        .dispatch_all(
            &mut doc,
            vec![
                add("a", "Alpha"),
                add("b", "Beta"),
                ActionEnvelope::global("CHECK_ITEM", json!({"id": "a"})),
                ActionEnvelope::local("SELECT_ITEM", json!({"id": "b"})),
                ActionEnvelope::global("REMOVE_ITEM", json!({"id": "b"})),
            ],
        )
        .unwrap();
    doc
}

#[test]
fn replay_rebuilds_an_identical_document() {
    let doc = populated();
    let dispatcher = Dispatcher::<Checklist>::new();

    let replayed = dispatcher
        .replay(doc.header().clone(), doc.operations())
        .unwrap();

    assert_eq!(replayed, doc);
}

#[test]
fn replay_detects_divergent_hash() {
    let doc = populated();
    let mut raw: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    raw["operations"]["global"][1]["hash"] = json!("0000");
    let logs: OperationLogs = serde_json::from_value(raw["operations"].clone()).unwrap();

    let err = Dispatcher::<Checklist>::new()
        .replay(doc.header().clone(), &logs)
        .unwrap_err();

    assert!(matches!(
        err,
        ReplayError::HashMismatch { scope: Scope::Global, index: 1, .. }
    ));
}

#[test]
fn replay_rejects_operations_that_no_longer_commit() {
    let doc = populated();
    let mut raw: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    raw["operations"]["global"][0]["action"]["type"] = json!("RETIRED_ACTION");
    let logs: OperationLogs = serde_json::from_value(raw["operations"].clone()).unwrap();

    let err = Dispatcher::<Checklist>::new()
        .replay(doc.header().clone(), &logs)
        .unwrap_err();

    assert!(matches!(err, ReplayError::NotReducible { index: 0, .. }));
}

#[test]
fn save_and_load_round_trip() {
    let doc = populated();
    let dir = tempfile::tempdir().unwrap();

    let path = doc.save(dir.path()).unwrap();
    assert!(path.ends_with("launch.phdm"));

    let loaded = Document::<Checklist>::load(&path).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn load_rejects_other_extensions_and_types() {
    let doc = populated();
    let dir = tempfile::tempdir().unwrap();

    let wrong_ext = dir.path().join("launch.json");
    doc.save_as(&wrong_ext).unwrap();
    assert!(matches!(
        Document::<Checklist>::load(&wrong_ext),
        Err(PersistError::WrongExtension { .. })
    ));

    let mut raw: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    raw["header"]["documentType"] = json!("docmodel/other");
    assert!(matches!(
        Document::<Checklist>::from_json(&raw.to_string()),
        Err(PersistError::WrongDocumentType { .. })
    ));
}

#[test]
fn load_rejects_gapped_logs() {
    let doc = populated();
    let mut raw: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    raw["operations"]["global"][2]["index"] = json!(7);

    assert!(matches!(
        Document::<Checklist>::from_json(&raw.to_string()),
        Err(PersistError::Json(_))
    ));
}
