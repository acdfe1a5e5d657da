//! # PUT /{slug}
//!
//! 登録済みスラッグの転送先を置き換える。未登録なら404。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use shortlink_types::SlugTarget;

use crate::auth::guard_write;
use crate::config::GatewayState;
use crate::endpoints::parse_target;
use crate::error::GatewayError;
use crate::storage::WriteOutcome;

/// PUT /{slug}: 本文 `{"target": URL}` で転送先を更新する。
pub async fn handle_update(
    State(state): State<Arc<GatewayState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SlugTarget>, GatewayError> {
    guard_write(&state, &headers, &body)?;
    let request = parse_target(&body)?;

    match state.store.update_if_present(&slug, &request.target).await? {
        WriteOutcome::Applied => {
            tracing::info!(slug = %slug, target = %request.target, "転送先を更新しました");
            Ok(Json(request))
        }
        WriteOutcome::PreconditionFailed => Err(GatewayError::NothingToUpdate),
    }
}
