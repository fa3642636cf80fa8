// ============================================================================
// TrustedUser Extractor - Gateway Auth Pattern
// ============================================================================
//
// Extracts user identity from the X-User-Id header set by the gateway.
//
// SECURITY: This extractor trusts the X-User-Id header unconditionally.
// The service MUST only be reachable through the gateway.
//
// ============================================================================

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use stayhub_error::AppError;
use uuid::Uuid;

/// User identity propagated from the gateway via the trusted X-User-Id header
#[derive(Debug, Clone, Copy)]
pub struct TrustedUser(pub Uuid);

/// Header name for user ID propagation
pub const USER_ID_HEADER: &str = "x-user-id";

#[async_trait]
impl<S> FromRequestParts<S> for TrustedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(TrustedUser)
            .ok_or_else(|| {
                tracing::warn!("Missing or invalid X-User-Id header");
                AppError::auth("Missing or invalid X-User-Id header")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<TrustedUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        TrustedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header_is_accepted() {
        let id = Uuid::new_v4();
        let user = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(user.0, id);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_rejected() {
        assert!(matches!(extract(None).await, Err(AppError::Auth(_))));
        assert!(matches!(
            extract(Some("not-a-uuid")).await,
            Err(AppError::Auth(_))
        ));
    }
}
