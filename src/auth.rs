use base64::{
    Engine, alphabet,
    engine::{GeneralPurpose, general_purpose::PAD},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// Role
///
/// The closed set of roles a credential may carry. Any other value in the `role`
/// claim makes the whole credential malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Teacher => f.write_str("teacher"),
        }
    }
}

/// Claims
///
/// The decoded payload of a credential. Only the three claims the guards need are kept;
/// everything else in the payload is dropped during deserialization.
///
/// Claims are never persisted. Guards recompute them from the stored credential on
/// every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): opaque principal id, used as the key for profile lookups.
    pub sub: String,
    /// The principal's role.
    pub role: Role,
    /// Expiration Time (exp): seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// Whether the credential is no longer valid at `now`.
    ///
    /// Compared in milliseconds: expired once `now >= exp * 1000`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let expiry_ms = self.exp.saturating_mul(1000);
        now.timestamp_millis() >= expiry_ms
    }
}

/// decode_credential
///
/// Parses a bearer credential into [`Claims`] without contacting any server and
/// without verifying the signature (the backend does that).
///
/// The credential must have exactly three dot-separated segments. The middle one is
/// URL-safe base64: it is re-mapped to the standard alphabet, re-padded and decoded,
/// and the bytes must form a UTF-8 JSON object with `sub`, `role` and `exp`.
pub fn decode_credential(credential: &str) -> Result<Claims, AuthError> {
    let segments: Vec<&str> = credential.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(AuthError::MalformedCredential(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let bytes = decode_segment(payload)?;

    serde_json::from_slice::<Claims>(&bytes)
        .map_err(|e| AuthError::MalformedCredential(format!("invalid payload: {e}")))
}

// Standard alphabet, but lenient about non-zero trailing bits in the last symbol,
// which browsers' `atob` ignores.
const PAYLOAD_ENGINE: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    let mut standard: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match standard.len() % 4 {
        0 => {}
        2 => standard.push_str("=="),
        3 => standard.push('='),
        _ => {
            return Err(AuthError::MalformedCredential(
                "payload segment has an impossible base64 length".to_string(),
            ));
        }
    }

    PAYLOAD_ENGINE
        .decode(standard.as_bytes())
        .map_err(|e| AuthError::MalformedCredential(format!("invalid base64: {e}")))
}
