//! Signed-token codec.
//!
//! Every credential this API hands out is a stateless JWT: the payload is a
//! [`Claim`] tagged by purpose, optionally bounded by an expiry, and signed
//! with a process-wide secret. Nothing is persisted; a token is valid exactly
//! when its signature matches and its expiry, if present, has not elapsed.
//!
//! Two [`TokenCodec`] instances live in [`crate::state::AppState`]: one keyed
//! for access/verification/recovery claims and one keyed separately for
//! refresh claims, so leaking either secret never forges the other family.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Payload carried inside a signed token.
///
/// The `purpose` tag travels with the signature, so a token minted for one
/// flow can never be replayed into another: callers match on the variant and
/// reject everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum Claim {
    /// Short-lived credential presented on each authenticated request.
    Access { user_id: Uuid },
    /// Long-lived credential, stored only in an HTTP-only cookie, used solely
    /// to mint new access tokens.
    Refresh { user_id: Uuid },
    /// The entire pending signup. The password is still plaintext here; it is
    /// hashed only when the link is confirmed and the row is created.
    Verification {
        username: String,
        email: String,
        password: String,
    },
    /// Authorizes exactly one password replacement for `email`.
    Recovery { email: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct RegisteredClaims {
    #[serde(flatten)]
    claim: Claim,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Why a token failed verification.
///
/// Garbage input is never a panic; every failure mode maps to one of these so
/// flows can pick a response status without inspecting strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// An HMAC-SHA256 keyed signer/verifier for [`Claim`]s.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs `claim`, embedding an expiry `ttl_seconds` from now when given.
    ///
    /// Pure computation: no I/O, deterministic for a fixed secret, claim, and
    /// clock reading.
    pub fn mint(&self, claim: Claim, ttl_seconds: Option<i64>) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = RegisteredClaims {
            claim,
            iat: now,
            exp: ttl_seconds.map(|ttl| now + ttl),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to sign token: {e}")))
    }

    /// Recomputes the signature (constant-time compare inside jsonwebtoken)
    /// and checks the embedded expiry, if any, with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claim, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The default 60s leeway would stretch the 5-minute recovery window.
        validation.leeway = 0;
        // Verification claims may be minted without an expiry.
        validation.required_spec_claims = HashSet::new();

        decode::<RegisteredClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims.claim)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
