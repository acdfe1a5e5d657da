//! # Gateway エラー型
//!
//! クライアントへ返すメッセージは固定文言とし、本文は `{"code", "message"}` 形式。
//! 認可ゲートの拒否理由は区別せず、すべて401の同一レスポンスになる。

use axum::http::StatusCode;
use axum::Json;
use shortlink_types::ErrorBody;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 認可ゲートで拒否（署名無効・期限切れ・ヘッダー欠落）
    #[error("Unauthorized")]
    Unauthorized,
    /// 本文が署名対象と一致しない、または本文が不正
    #[error("Bad Request")]
    BadRequest,
    /// 転送先URLとして使えない値
    #[error("Target must be an absolute http(s) URL")]
    InvalidTarget,
    /// GET対象のスラッグが未登録
    #[error("Slug has no target.")]
    SlugNotFound,
    /// POST対象のスラッグが登録済み
    #[error("Slug already has a registered target.")]
    SlugExists,
    /// PUT対象のスラッグが未登録
    #[error("Slug has no registered target to update")]
    NothingToUpdate,
    /// DELETE対象のスラッグが未登録
    #[error("No slug to delete")]
    NothingToDelete,
    /// ストレージ操作に失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::BadRequest | GatewayError::InvalidTarget => StatusCode::BAD_REQUEST,
            GatewayError::SlugNotFound
            | GatewayError::NothingToUpdate
            | GatewayError::NothingToDelete => StatusCode::NOT_FOUND,
            GatewayError::SlugExists => StatusCode::CONFLICT,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            GatewayError::Storage(detail) => {
                tracing::error!(error = %detail, "ストレージ操作に失敗しました");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
