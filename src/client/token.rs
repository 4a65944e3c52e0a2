//! Access-token inspection
//!
//! Tokens are issued by the web login flow and pasted into `callwatch init`.
//! The CLI never refreshes them; it only reads the `exp` claim so it can warn
//! before the server starts rejecting requests.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;

/// Decode base64url (URL-safe base64 without padding)
fn base64_decode_url(input: &str) -> Result<Vec<u8>, String> {
    use base64::{Engine as _, engine::general_purpose};

    general_purpose::URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| e.to_string())
}

/// Read the expiry from a JWT's `exp` claim, without verifying the signature.
pub fn jwt_expiry(token: &str) -> Result<DateTime<Utc>, ApiError> {
    #[derive(Deserialize)]
    struct JwtPayload {
        exp: i64,
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ApiError::InvalidResponse(
            "Access token is not a JWT".to_string(),
        ));
    }

    let payload_bytes = base64_decode_url(parts[1])
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode JWT payload: {}", e)))?;

    let payload: JwtPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JWT payload: {}", e)))?;

    DateTime::from_timestamp(payload.exp, 0)
        .ok_or_else(|| ApiError::InvalidResponse("Invalid JWT expiration timestamp".to_string()))
}

#[cfg(test)]
pub(crate) fn make_jwt(exp: i64) -> String {
    use base64::{Engine as _, engine::general_purpose};

    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"rep@example.com","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_expiry_decodes_exp_claim() {
        let token = make_jwt(1_767_225_600);
        let expires_at = jwt_expiry(&token).unwrap();
        assert_eq!(expires_at.timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_jwt_expiry_rejects_non_jwt() {
        assert!(jwt_expiry("not-a-token").is_err());
    }

    #[test]
    fn test_jwt_expiry_rejects_garbage_payload() {
        assert!(jwt_expiry("aaa.!!!.ccc").is_err());
    }

    #[test]
    fn test_jwt_expiry_requires_exp() {
        use base64::{Engine as _, engine::general_purpose};
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#);
        assert!(jwt_expiry(&format!("h.{}.s", payload)).is_err());
    }
}
