use crate::app::AppState;
use crate::error::AppError;
use crate::validate::validate_admin_key;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct AdminKeyParam {
    #[serde(rename = "adminKey")]
    admin_key: Option<String>,
}

/// Extractor guarding mutating routes with the `adminKey` query parameter.
///
/// Only reads the URI, so it must come before any body extractor: a request
/// with a bad key is rejected before its payload is parsed or stored.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = Query::<AdminKeyParam>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(p)| p.admin_key)
            .unwrap_or_default();

        if validate_admin_key(&provided, &state.admin_key) {
            Ok(RequireAdmin)
        } else {
            tracing::warn!(
                path = %parts.uri.path(),
                method = %parts.method,
                key_present = !provided.is_empty(),
                "auth rejected: admin key mismatch"
            );
            Err(AppError::Auth(state.messages.common.unauthorized))
        }
    }
}
