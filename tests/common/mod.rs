//! Shared helpers for integration tests.

// Allow dead code: each test binary uses a subset of these helpers
#![allow(dead_code)]

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use watchb_client::Config;

/// Config pointed at a mock server, with a short token lifetime so
/// timer-driven behavior is observable in tests.
pub fn test_config(backend_host: &str) -> Config {
    Config {
        backend_host: backend_host.to_string(),
        access_token_lifetime: Duration::from_millis(250),
        refresh_margin: Duration::ZERO,
    }
}

/// Config whose refresh timer will not fire within a test's lifetime.
pub fn slow_refresh_config(backend_host: &str) -> Config {
    Config {
        backend_host: backend_host.to_string(),
        access_token_lifetime: Duration::from_secs(3600),
        refresh_margin: Duration::from_secs(60),
    }
}

/// Unsigned access token carrying the given `user_id` claim, shaped like
/// the backend's compact JWS.
pub fn fake_access_token(user_id: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        format!(r#"{{"token_type":"access","exp":1999999999,"jti":"t","user_id":{user_id}}}"#)
            .as_bytes(),
    );
    format!("{header}.{payload}.sig")
}
