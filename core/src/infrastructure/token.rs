// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Bearer Token Issue & Verify
//!
//! HS256 JWTs carrying the subject id and role. The verifier is the
//! identity-and-role resolver of the service: given the raw token from an
//! `Authorization: Bearer` header it returns an [`Identity`] or a typed
//! `Unauthenticated` failure, distinguishing expiry from any other
//! verification defect.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthRejection, Identity, RegistryError, Role};
use crate::infrastructure::config::TokenConfig;

/// Claims carried by every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id.
    pub sub: i64,
    /// Role string from the closed enumeration.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs tokens at login.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, RegistryError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: identity.user_id,
            role: identity.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RegistryError::Internal(format!("token signing failed: {e}")))
    }
}

/// Verifies bearer tokens and resolves the caller's identity.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, RegistryError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    RegistryError::Unauthenticated(AuthRejection::ExpiredToken)
                }
                _ => RegistryError::Unauthenticated(AuthRejection::InvalidToken),
            })?;

        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| RegistryError::Unauthenticated(AuthRejection::InvalidToken))?;

        Ok(Identity::new(data.claims.sub, role))
    }
}
