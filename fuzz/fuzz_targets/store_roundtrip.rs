#![no_main]

use bugtrack_core::Gateway;
use bugtrack_core::store::SqliteStore;
use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Object(draft)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let Ok(store) = SqliteStore::open(":memory:") else {
        return;
    };
    let gateway = Gateway::new(Arc::new(store));

    // Errors are fine; panics and inconsistent reads are not.
    if let Ok(created) = gateway.create(&draft) {
        let listed = gateway.list().expect("list after create");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
        assert!(created.title.trim().chars().count() >= 3);
        assert!(created.tags.len() <= 5);

        let _ = gateway.update(&created.id, &draft);
        gateway.delete(&created.id).expect("delete created bug");
    }
});
