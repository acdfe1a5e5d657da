//! # Gatewayエンドポイント
//!
//! - `POST /authorize`: 認可判定（`{"isAuthorized": bool}`）
//! - `GET /{slug}`: 転送先へのリダイレクト
//! - `POST /{slug}`: スラッグの新規登録
//! - `PUT /{slug}`: 登録済みスラッグの転送先更新
//! - `DELETE /{slug}`: 登録済みスラッグの削除
//! - `GET /.well-known/shortlink-keys`: 信頼済み公開鍵の公開

pub mod authorize;
pub mod create;
pub mod delete;
pub mod redirect;
pub mod trust_info;
pub mod update;

pub use authorize::handle_authorize;
pub use create::handle_create;
pub use delete::handle_delete;
pub use redirect::handle_redirect;
pub use trust_info::handle_trust_info;
pub use update::handle_update;

use serde::de::DeserializeOwned;
use shortlink_types::SlugTarget;

use crate::error::GatewayError;

/// 検証済みの本文をデシリアライズする。
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::info!(error = %e, "リクエスト本文の形式が不正です");
        GatewayError::BadRequest
    })
}

/// 本文を転送先として解釈する。転送先は絶対URL（http/https）に限る。
pub(crate) fn parse_target(body: &[u8]) -> Result<SlugTarget, GatewayError> {
    let request: SlugTarget = parse_body(body)?;
    let url = reqwest::Url::parse(&request.target).map_err(|_| GatewayError::InvalidTarget)?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(GatewayError::InvalidTarget);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        let request = parse_target(b"{\"target\":\"https://example.com/a?b=c\"}").unwrap();
        assert_eq!(request.target, "https://example.com/a?b=c");

        assert!(matches!(
            parse_target(b"{\"target\":\"javascript:alert(1)\"}"),
            Err(GatewayError::InvalidTarget)
        ));
        assert!(matches!(
            parse_target(b"{\"target\":\"/relative\"}"),
            Err(GatewayError::InvalidTarget)
        ));
        assert!(matches!(
            parse_target(b"{\"url\":\"https://example.com\"}"),
            Err(GatewayError::BadRequest)
        ));
        assert!(matches!(parse_target(b"[]"), Err(GatewayError::BadRequest)));
    }
}
