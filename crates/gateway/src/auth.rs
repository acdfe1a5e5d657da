//! # 書き込みリクエストの保護
//!
//! 書き込み系エンドポイントの前段で2段階の検証を行う。
//! 1. 認可ゲート: 署名が有効かつ猶予期間内か（失敗は401）
//! 2. 本文バインド: 受信した本文が署名対象と一致するか（失敗は400）

use axum::http::HeaderMap;
use shortlink_core::{authenticate_request, authorize_request};
use shortlink_types::RequestContext;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// HTTPヘッダーと本文から認証用のリクエストコンテキストを構築する。
/// 値がASCII文字列でないヘッダーは無視する。
pub(crate) fn request_context(headers: &HeaderMap, body: &str) -> RequestContext {
    RequestContext::new(
        headers.iter().filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str(), value.to_string()))
        }),
        body,
    )
}

/// 書き込みリクエストを検証する。
///
/// 認可ゲートの拒否理由はクライアントに区別させない。
pub(crate) fn guard_write(
    state: &GatewayState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), GatewayError> {
    let text = std::str::from_utf8(body);
    let ctx = request_context(headers, text.unwrap_or_default());

    if !authorize_request(&ctx, &state.keys, state.grace_period).authorize {
        return Err(GatewayError::Unauthorized);
    }
    if text.is_err() {
        tracing::info!("リクエスト本文がUTF-8ではありません");
        return Err(GatewayError::BadRequest);
    }
    if !authenticate_request(&ctx, &state.keys) {
        return Err(GatewayError::BadRequest);
    }
    Ok(())
}
