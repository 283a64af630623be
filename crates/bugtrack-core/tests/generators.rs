#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::{Map, Value, json};

/// Arbitrary JSON leaf values, the kind a client can put in any field.
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[ -~]{0,24}".prop_map(Value::String),
    ]
}

/// Tag entries: mostly padded mixed-case words, sometimes blanks or non-strings.
pub fn arb_tag_entry() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => "[ ]{0,2}[A-Za-z]{1,8}[ ]{0,2}".prop_map(Value::String),
        1 => "[ ]{0,3}".prop_map(Value::String),
        1 => Just(Value::Null),
        1 => any::<i16>().prop_map(|n| json!(n)),
    ]
}

pub fn arb_tags() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_tag_entry(), 0..10)
}

pub fn arb_enum_value(known: &'static [&'static str]) -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::sample::select(known).prop_map(|value| Value::String(value.to_string())),
        arb_scalar(),
    ]
}

/// A draft with any subset of the known fields plus an unknown one.
pub fn arb_draft() -> impl Strategy<Value = Map<String, Value>> {
    (
        prop::option::of(prop_oneof![".{0,10}".prop_map(Value::String), arb_scalar()]),
        prop::option::of(arb_scalar()),
        prop::option::of(arb_enum_value(&["low", "medium", "high"])),
        prop::option::of(arb_enum_value(&["open", "in-progress", "resolved"])),
        prop::option::of(arb_tags()),
        prop::option::of(prop_oneof![
            Just(Value::String("2030-05-01".to_string())),
            arb_scalar()
        ]),
        prop::option::of(arb_scalar()),
    )
        .prop_map(|(title, reporter, priority, status, tags, due, extra)| {
            let mut draft = Map::new();
            let fields = [
                ("title", title),
                ("reporter", reporter),
                ("priority", priority),
                ("status", status),
                ("tags", tags.map(Value::Array)),
                ("dueDate", due),
                ("severity", extra),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    draft.insert(key.to_string(), value);
                }
            }
            draft
        })
}
