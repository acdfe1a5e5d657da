//! # DELETE /{slug}
//!
//! 登録済みスラッグを削除する。署名対象の本文は `{"slug": <パスのスラッグ>}` で、
//! パスと一致しない署名では削除できない。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use shortlink_types::SlugDeletion;

use crate::auth::guard_write;
use crate::config::GatewayState;
use crate::endpoints::parse_body;
use crate::error::GatewayError;
use crate::storage::WriteOutcome;

/// DELETE /{slug}: スラッグを削除し、204を返す。
pub async fn handle_delete(
    State(state): State<Arc<GatewayState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, GatewayError> {
    guard_write(&state, &headers, &body)?;
    let request: SlugDeletion = parse_body(&body)?;
    if request.slug != slug {
        tracing::info!(slug = %slug, signed_slug = %request.slug, "署名されたスラッグとパスが一致しません");
        return Err(GatewayError::BadRequest);
    }

    match state.store.delete_if_present(&slug).await? {
        WriteOutcome::Applied => {
            tracing::info!(slug = %slug, "スラッグを削除しました");
            Ok(StatusCode::NO_CONTENT)
        }
        WriteOutcome::PreconditionFailed => Err(GatewayError::NothingToDelete),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::storage::MemorySlugStore;
    use crate::test_support;

    fn signed(payload: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&test_support::signed_header(payload)).unwrap(),
        );
        headers
    }

    fn store() -> MemorySlugStore {
        MemorySlugStore::with_entries([("a", "https://a.example.com"), ("b", "https://b.example.com")])
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let state = test_support::state_with(store());
        let payload = "{\"slug\":\"a\"}";

        let status = handle_delete(
            State(state.clone()),
            Path("a".to_string()),
            signed(payload),
            Bytes::from_static(payload.as_bytes()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.store.get("a").await.unwrap(), None);

        let err = handle_delete(
            State(state.clone()),
            Path("a".to_string()),
            signed(payload),
            Bytes::from_static(payload.as_bytes()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::NothingToDelete));
    }

    #[tokio::test]
    async fn test_signature_for_other_slug_cannot_delete() {
        let state = test_support::state_with(store());
        let payload = "{\"slug\":\"a\"}";

        let err = handle_delete(
            State(state.clone()),
            Path("b".to_string()),
            signed(payload),
            Bytes::from_static(payload.as_bytes()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest));
        assert!(state.store.get("b").await.unwrap().is_some());
    }
}
