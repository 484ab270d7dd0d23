//! Fuzz the `Authorization` header parsers.
//!
//! Arbitrary header values must never panic, and must never yield a
//! principal without the configured credentials.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_auth_header -- -max_total_time=60
//! ```

#![no_main]

use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use user_api::auth::{decode_basic_credentials, extract_bearer_token};
use user_api::{AuthGate, SecurityScheme};

fn gate() -> &'static AuthGate {
    static GATE: OnceLock<AuthGate> = OnceLock::new();
    GATE.get_or_init(|| AuthGate::new("fuzz-secret"))
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok((user, pass)) = decode_basic_credentials(s) {
            assert!(!user.is_empty() && !pass.is_empty());
        }
    }

    let Ok(value) = HeaderValue::from_bytes(data) else {
        return;
    };
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    if let Some(token) = extract_bearer_token(&headers) {
        assert!(!token.is_empty());
    }
    let _ = gate().authenticate(&headers, SecurityScheme::Bearer);
    let _ = gate().authenticate(&headers, SecurityScheme::Basic);
});
