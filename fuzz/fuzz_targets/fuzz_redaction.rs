//! Fuzz query-string redaction and body truncation.
//!
//! A redacted key's value must never survive into the logged map, whatever
//! the encoding of the query string.

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use user_api::middleware::{REDACTED, Redactor, truncate_text};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let redactor = Redactor::new(&[], &["token".to_string()], &[]);
    let query = redactor.query(Some(s));
    for (key, value) in &query {
        if key.eq_ignore_ascii_case("token") {
            match value {
                Value::Array(values) => assert!(values.iter().all(|v| v == REDACTED)),
                other => assert_eq!(other, REDACTED),
            }
        }
    }

    let truncated = truncate_text(s, 16);
    assert!(truncated.chars().count() <= 16 + "...[truncated]".len());
});
