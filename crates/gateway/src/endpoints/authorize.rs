//! # POST /authorize
//!
//! 認可判定エンドポイント。前段のゲートウェイ層から呼ばれ、
//! 判定結果のみを常に200で返す。

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use shortlink_core::authorize_request;
use shortlink_types::AuthorizationOutcome;

use crate::auth::request_context;
use crate::config::GatewayState;

/// POST /authorize: `Authorization` ヘッダーの署名を検証し、鮮度を判定する。
pub async fn handle_authorize(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Json<AuthorizationOutcome> {
    let ctx = request_context(&headers, "");
    Json(authorize_request(&ctx, &state.keys, state.grace_period))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::test_support;

    async fn authorize(state: Arc<GatewayState>, authorization: Option<&str>) -> bool {
        let mut headers = HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        }
        handle_authorize(State(state), headers).await.0.authorize
    }

    #[tokio::test]
    async fn test_fresh_signature_is_authorized() {
        let state = test_support::test_state();
        let header = test_support::signed_header("{\"target\":\"https://example.com\"}");
        assert!(authorize(state, Some(&header)).await);
    }

    #[tokio::test]
    async fn test_denials() {
        let state = test_support::test_state();
        let payload = "{\"target\":\"https://example.com\"}";
        assert!(!authorize(state.clone(), None).await);
        assert!(!authorize(state.clone(), Some("not base64!")).await);
        assert!(!authorize(state.clone(), Some(&test_support::stale_header(payload))).await);
        assert!(!authorize(state, Some(&test_support::untrusted_header(payload))).await);
    }
}
