#![no_main]

use bugtrack_core::{ValidateOptions, validate_bug_payload};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Object(draft)) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    for options in [ValidateOptions::full(), ValidateOptions::partial()] {
        let first = validate_bug_payload(&draft, options);
        let again = validate_bug_payload(&draft, options);
        assert_eq!(first.errors, again.errors);

        if first.is_valid() {
            // Sanitized output must itself validate cleanly.
            let resanitized = validate_bug_payload(&first.sanitized, options);
            assert!(resanitized.is_valid());
            assert_eq!(resanitized.sanitized, first.sanitized);
        }
    }
});
