// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Bearer Extraction
//!
//! [`Identity`] is an axum extractor: a handler that takes an `Identity`
//! parameter only runs after the `Authorization: Bearer` credential has
//! been verified. Rejections go out through the standard envelope.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::{AuthRejection, Identity, RegistryError};
use crate::presentation::api::AppState;
use crate::presentation::envelope::ApiFailure;

impl<S> FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Err(RegistryError::Unauthenticated(AuthRejection::MissingToken).into());
        };

        state.verifier.verify(token).map_err(Into::into)
    }
}
