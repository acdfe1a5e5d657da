//! # GET /{slug}
//!
//! 登録済みの転送先へ308で恒久リダイレクトする。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /{slug}: 転送先へリダイレクト。未登録なら404。
pub async fn handle_redirect(
    State(state): State<Arc<GatewayState>>,
    Path(slug): Path<String>,
) -> Result<Response, GatewayError> {
    let Some(target) = state.store.get(&slug).await? else {
        tracing::debug!(slug = %slug, "未登録のスラッグです");
        return Err(GatewayError::SlugNotFound);
    };

    tracing::debug!(slug = %slug, target = %target, "リダイレクトします");
    Ok((
        StatusCode::PERMANENT_REDIRECT,
        [(header::LOCATION, target)],
        "redirecting",
    )
        .into_response())
}
