//! Custom Axum extractors.

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use clubdesk_core::types::OrgId;
use uuid::Uuid;

/// The caller's tenant organization, taken from the `X-Org-Id` header.
///
/// Authorization of the tenant and user happens upstream (gateway/session
/// layer); this service trusts the header and only scopes data access.
#[derive(Debug, Clone, Copy)]
pub struct OrgContext(pub OrgId);

#[async_trait]
impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("X-Org-Id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::bad_request("missing X-Org-Id header"))?;

        let org = Uuid::parse_str(header)
            .map_err(|_| ApiError::bad_request("X-Org-Id must be a UUID"))?;

        Ok(Self(OrgId::from_uuid(org)))
    }
}
