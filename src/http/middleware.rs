//! Signature middleware for commands relayed by the chat transport

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::app::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying `t=<unix seconds>,v1=<hex signature>`
pub const SIGNATURE_HEADER: &str = "X-Dispatch-Signature";

/// Largest command body we are willing to buffer
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Verify a dispatch signature over `payload`.
///
/// The signed message is `"{t}.{payload}"`, HMAC-SHA256 with the shared
/// secret, hex encoded. Any `v1` entry may match. Signatures older or newer
/// than `tolerance_secs` relative to `now` are rejected.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), AuthError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
            match key {
                "t" => timestamp = Some(value),
                "v1" => signatures.push(value),
                _ => {}
            }
        }
    }

    let timestamp = timestamp.ok_or(AuthError::InvalidFormat)?;
    if signatures.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    let issued: i64 = timestamp.parse().map_err(|_| AuthError::InvalidFormat)?;
    if now.abs_diff(issued) > tolerance_secs.unsigned_abs() {
        return Err(AuthError::Expired);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::InvalidSignature)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let valid = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|raw| mac.clone().verify_slice(&raw).is_ok())
            .unwrap_or(false)
    });
    if !valid {
        return Err(AuthError::InvalidSignature);
    }

    Ok(())
}

/// Signature error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing X-Dispatch-Signature header")]
    MissingHeader,

    #[error("Invalid signature header format")]
    InvalidFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Signature timestamp outside tolerance")]
    Expired,

    #[error("Request body too large or unreadable")]
    InvalidBody,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingHeader => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat => StatusCode::BAD_REQUEST,
            AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AuthError::Expired => StatusCode::UNAUTHORIZED,
            AuthError::InvalidBody => StatusCode::PAYLOAD_TOO_LARGE,
        };

        (status, self.to_string()).into_response()
    }
}

/// Middleware to require a valid dispatch signature on the raw body
pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingHeader)?
        .to_string();

    let (parts, body) = request.into_parts();
    let body: Bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| AuthError::InvalidBody)?;

    if let Err(e) = verify_signature(
        &body,
        &header,
        &state.config.dispatch_secret,
        state.config.signature_tolerance_secs,
        chrono::Utc::now().timestamp(),
    ) {
        warn!(error = %e, "Rejected unsigned or mis-signed command");
        return Err(e);
    }

    let request = Request::from_parts(parts, Body::from(body));
    Ok(next.run(request).await)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a header value the way the chat transport does
    pub(crate) fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_passes() {
        let body = br#"{"participant":"1","verb":"create"}"#;
        let header = sign(body, "secret", 1_000);
        assert!(verify_signature(body, &header, "secret", 300, 1_100).is_ok());
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign(b"original", "secret", 1_000);
        assert!(matches!(
            verify_signature(b"tampered", &header, "secret", 300, 1_000),
            Err(AuthError::InvalidSignature)
        ));
        assert!(matches!(
            verify_signature(b"original", &header, "other", 300, 1_000),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn stale_signature_fails() {
        let header = sign(b"body", "secret", 1_000);
        assert!(matches!(
            verify_signature(b"body", &header, "secret", 300, 1_301),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn extreme_timestamps_are_expired() {
        for ts in [i64::MIN, i64::MAX] {
            let header = format!("t={ts},v1=00");
            assert!(matches!(
                verify_signature(b"body", &header, "secret", 300, 1_700_000_000),
                Err(AuthError::Expired)
            ));
        }

        let header = sign(b"body", "secret", 1_700_000_000);
        assert!(verify_signature(b"body", &header, "secret", 300, i64::MIN).is_err());
    }

    #[test]
    fn malformed_header_fails() {
        for header in ["", "t=1000", "v1=abcd", "t=soon,v1=abcd"] {
            assert!(matches!(
                verify_signature(b"body", header, "secret", 300, 1_000),
                Err(AuthError::InvalidFormat)
            ));
        }
        assert!(matches!(
            verify_signature(b"body", "t=1000,v1=not-hex", "secret", 300, 1_000),
            Err(AuthError::InvalidSignature)
        ));
    }
}
