//! Bearer token extraction and verification.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{CredentialFault, GatewayError};

/// Cookie the web client stores the access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Identity extracted from a verified token. Immutable once parsed; lives
/// for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
}

/// Pull the raw token out of the request: cookie first, then
/// `Authorization: Bearer <token>`.
///
/// A present but malformed Authorization header is an error distinct from a
/// missing credential so clients get actionable feedback.
pub fn extract_token(headers: &HeaderMap) -> Result<String, GatewayError> {
    if let Some(token) = cookie_value(headers, ACCESS_TOKEN_COOKIE) {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(GatewayError::MissingCredential)?;

    let mut parts = auth.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(GatewayError::MalformedCredential),
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let mut kv = pair.trim().splitn(2, '=');
            if kv.next() == Some(name) {
                return kv.next().map(str::to_string);
            }
        }
    }
    None
}

/// Verify signature and expiry, returning the identity claims.
///
/// Purely functional; no global state. All verification failures collapse
/// to [`GatewayError::InvalidCredential`] with the real fault preserved for
/// logging.
pub fn validate(raw_token: &str, secret: &[u8]) -> Result<TokenClaims, GatewayError> {
    let token_header = decode_header(raw_token)
        .map_err(|_| GatewayError::InvalidCredential(CredentialFault::MalformedToken))?;

    // Pin the algorithm before touching the signature. A token declaring
    // "none" or an asymmetric scheme never reaches verification.
    if token_header.alg != Algorithm::HS256 {
        return Err(GatewayError::InvalidCredential(CredentialFault::AlgorithmMismatch));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<RawClaims>(raw_token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            let fault = match err.kind() {
                ErrorKind::ExpiredSignature => CredentialFault::Expired,
                ErrorKind::InvalidSignature => CredentialFault::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    CredentialFault::AlgorithmMismatch
                }
                _ => CredentialFault::MalformedToken,
            };
            GatewayError::InvalidCredential(fault)
        })?;

    Ok(TokenClaims {
        subject: data.claims.sub,
        email: data.claims.email,
        role: data.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &[u8] = b"test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        email: &'a str,
        role: &'a str,
        iat: i64,
        exp: i64,
    }

    fn unix_now() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
    }

    fn mint(sub: &str, role: &str, ttl_secs: i64, secret: &[u8]) -> String {
        let now = unix_now();
        let claims = TestClaims {
            sub,
            email: "rider@example.com",
            role,
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extract_prefers_cookie_over_header() {
        let mut headers = headers_with_auth("Bearer from-header");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=from-cookie"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "from-cookie");
    }

    #[test]
    fn extract_falls_back_to_bearer_header() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn extract_missing_everything() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(GatewayError::MissingCredential)));
    }

    #[test]
    fn extract_rejects_malformed_header() {
        for bad in ["Token abc", "Bearer", "Bearer a b", "bearer abc"] {
            let headers = headers_with_auth(bad);
            assert!(
                matches!(extract_token(&headers), Err(GatewayError::MalformedCredential)),
                "expected malformed for {bad:?}"
            );
        }
    }

    #[test]
    fn validate_round_trips_claims() {
        let token = mint("user-42", "USER", 3600, SECRET);
        let claims = validate(&token, SECRET).unwrap();
        assert_eq!(claims.subject, "user-42");
        assert_eq!(claims.email, "rider@example.com");
        assert_eq!(claims.role, "USER");
    }

    #[test]
    fn validate_rejects_wrong_secret() {
        let token = mint("user-42", "USER", 3600, b"other-secret");
        let err = validate(&token, SECRET).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidCredential(CredentialFault::BadSignature)
        ));
    }

    #[test]
    fn validate_rejects_expired_even_with_valid_signature() {
        // Well past the default leeway.
        let token = mint("user-42", "USER", -3600, SECRET);
        let err = validate(&token, SECRET).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredential(CredentialFault::Expired)));
    }

    #[test]
    fn validate_rejects_algorithm_confusion() {
        let now = unix_now();
        let claims = TestClaims {
            sub: "user-42",
            email: "rider@example.com",
            role: "USER",
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let err = validate(&token, SECRET).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidCredential(CredentialFault::AlgorithmMismatch)
        ));
    }

    #[test]
    fn validate_rejects_garbage() {
        let err = validate("not-a-jwt", SECRET).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidCredential(CredentialFault::MalformedToken)
        ));
    }
}
