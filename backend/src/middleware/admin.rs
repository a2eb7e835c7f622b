//! Admin portal guard
//!
//! HTTP Basic credentials checked against the configured admin account.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::auth::unauthorized_response;
use crate::config::AdminConfig;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const TAG_KEY: &[u8] = b"godown-admin-credential";

/// Check an `Authorization: Basic ...` header against the admin account.
///
/// Stateless: the outcome depends only on the configured credentials and
/// the header. A disabled admin account never matches.
pub fn check_admin_credentials(admin: &AdminConfig, authorization: Option<&str>) -> bool {
    if !admin.is_enabled() {
        return false;
    }

    let Some(encoded) = authorization.and_then(|h| h.strip_prefix("Basic ")) else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    let Some((username, password)) = decoded.split_once(':') else {
        return false;
    };

    // Evaluate both so a wrong username costs the same as a wrong password
    let username_ok = tags_match(&admin.username, username);
    let password_ok = tags_match(&admin.password, password);
    username_ok & password_ok
}

/// Compare via HMAC tags so the check runs in constant time
fn tags_match(expected: &str, provided: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(TAG_KEY) else {
        return false;
    };
    mac.update(expected.as_bytes());
    let expected_tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(TAG_KEY) else {
        return false;
    };
    mac.update(provided.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

/// Middleware guarding the admin routes
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if !check_admin_credentials(&state.config.admin, authorization) {
        tracing::warn!("Rejected admin request to {}", request.uri().path());
        let mut response = unauthorized_response("Admin credentials required");
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"godown-admin\""),
        );
        return response;
    }

    next.run(request).await
}
