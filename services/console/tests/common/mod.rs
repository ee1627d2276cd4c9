//! services/console/tests/common/mod.rs
//!
//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;

/// Builds a three-segment bearer token whose payload carries the given
/// claims. The header and signature segments are opaque filler, which is
/// exactly how the session layer treats them.
pub fn make_token(exp: i64, role: &str, user_id: i64, school_name: Option<&str>) -> String {
    let mut claims = json!({ "exp": exp, "role": role, "user_id": user_id });
    if let Some(name) = school_name {
        claims["school_name"] = json!(name);
    }
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// An expiry comfortably past any test's runtime.
pub fn far_future() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}

/// The deterministic token the stub API hands out (expires in 2100).
pub fn stub_token() -> String {
    make_token(4_102_444_800, "school", 7, Some("Лицей №1"))
}
