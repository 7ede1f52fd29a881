//! JWT payload decoding for display and expiry checks. Signatures are never
//! verified here; the backends do that.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use voketag_core::JWT_GRACE_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "operador")]
    Operator,
}

impl Role {
    /// `admin` and `administrator` are admins, everything else operates
    #[must_use]
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some("admin" | "administrator") => Role::Admin,
            _ => Role::Operator,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Operator => "operador",
        })
    }
}

/// Decode the middle segment of a three-part token. Accepts both base64
/// alphabets, with or without padding.
#[must_use]
pub fn decode_payload(token: &str) -> Option<Map<String, Value>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let normalized: String = parts[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Role from the `role` claim, or the first entry of `roles`
#[must_use]
pub fn role_from_jwt(token: &str) -> Role {
    let Some(payload) = decode_payload(token) else {
        return Role::Operator;
    };
    let claim = payload.get("role").and_then(Value::as_str).or_else(|| {
        payload
            .get("roles")
            .and_then(Value::as_array)
            .and_then(|roles| roles.first())
            .and_then(Value::as_str)
    });
    Role::from_claim(claim)
}

/// Has a numeric `exp` later than `now - 60s`
#[must_use]
pub fn is_jwt_valid(token: &str, now_seconds: i64) -> bool {
    decode_payload(token)
        .and_then(|payload| payload.get("exp").and_then(Value::as_f64))
        .is_some_and(|exp| exp > (now_seconds - JWT_GRACE_SECONDS) as f64)
}

/// Email-ish subject for `whoami`
#[must_use]
pub fn subject(token: &str) -> Option<String> {
    let payload = decode_payload(token)?;
    ["email", "sub"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    fn token(payload: Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{body}.sig")
    }

    #[test]
    fn test_role_claims() {
        assert_eq!(role_from_jwt(&token(json!({"role": "admin"}))), Role::Admin);
        assert_eq!(role_from_jwt(&token(json!({"role": "administrator"}))), Role::Admin);
        assert_eq!(role_from_jwt(&token(json!({"roles": ["admin", "x"]}))), Role::Admin);
        assert_eq!(role_from_jwt(&token(json!({"role": "factory"}))), Role::Operator);
        assert_eq!(role_from_jwt("garbage"), Role::Operator);
    }

    #[test]
    fn test_padded_standard_alphabet_is_accepted() {
        let body = STANDARD.encode(json!({"exp": 10, "n": "??>"}).to_string());
        let token = format!("h.{body}.s");
        assert_eq!(decode_payload(&token).unwrap()["exp"], 10);
    }

    #[test]
    fn test_validity_uses_grace_window() {
        let now = 1_700_000_000;
        assert!(is_jwt_valid(&token(json!({"exp": now - 30})), now));
        assert!(!is_jwt_valid(&token(json!({"exp": now - 60})), now));
        assert!(!is_jwt_valid(&token(json!({"exp": "soon"})), now));
        assert!(!is_jwt_valid(&token(json!({})), now));
        assert!(!is_jwt_valid("a.b", now));
    }

    #[test]
    fn test_subject_prefers_email() {
        assert_eq!(
            subject(&token(json!({"sub": "u-1", "email": "a@b.c"}))).as_deref(),
            Some("a@b.c")
        );
        assert_eq!(subject(&token(json!({"sub": "u-1"}))).as_deref(), Some("u-1"));
    }
}
