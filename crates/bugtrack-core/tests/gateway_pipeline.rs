use bugtrack_core::store::SqliteStore;
use bugtrack_core::{Gateway, Priority, Status};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::thread;

fn draft(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test draft must be an object, got {other}"),
    }
}

fn file_gateway(dir: &tempfile::TempDir) -> Gateway {
    let url = format!("sqlite://{}", dir.path().join("bugs.db").display());
    Gateway::new(Arc::new(SqliteStore::open(&url).expect("open file store")))
}

#[test]
fn create_update_delete_round_through_a_file_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let gateway = file_gateway(&dir);

    let created = gateway
        .create(&draft(json!({
            "title": "Crash on submit",
            "reporter": "QA Tester",
            "priority": "high",
            "tags": ["ui", "regression"],
            "dueDate": "2030-01-15",
        })))
        .expect("create");
    assert_eq!(created.status, Status::Open);
    assert_eq!(created.priority, Priority::High);
    assert!(created.due_date.is_some());

    let updated = gateway
        .update(&created.id, &draft(json!({"status": "resolved", "dueDate": null})))
        .expect("update");
    assert_eq!(updated.status, Status::Resolved);
    assert_eq!(updated.due_date, None);
    assert!(updated.updated_at >= created.updated_at);

    gateway.delete(&created.id).expect("delete");
    assert!(gateway.list().expect("list").is_empty());
    gateway.close().expect("close");
}

#[test]
fn concurrent_creates_share_one_store_handle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let gateway = file_gateway(&dir);

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let gateway = gateway.clone();
            thread::spawn(move || {
                gateway
                    .create(&draft(json!({"title": format!("Bug number {n}"), "reporter": "Sam"})))
                    .expect("create")
            })
        })
        .collect();

    let mut ids: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread").id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(gateway.list().expect("list").len(), 8);
}

#[test]
fn record_serializes_with_wire_field_names() {
    let gateway = Gateway::new(Arc::new(SqliteStore::open(":memory:").expect("open")));
    let created = gateway
        .create(&draft(json!({"title": "Wire names", "reporter": "Sam", "status": "in-progress"})))
        .expect("create");

    let wire = serde_json::to_value(&created).expect("serialize");
    assert_eq!(wire["status"], "in-progress");
    assert_eq!(wire["priority"], "medium");
    assert!(wire.get("createdAt").is_some());
    assert!(wire.get("updatedAt").is_some());
    assert!(wire.get("assignee").is_none());
    assert!(wire.get("severity").is_none());
}
