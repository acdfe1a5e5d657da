//! # POST /{slug}
//!
//! 署名付きリクエストでスラッグを新規登録する。登録済みなら409。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use shortlink_types::SlugTarget;

use crate::auth::guard_write;
use crate::config::GatewayState;
use crate::endpoints::parse_target;
use crate::error::GatewayError;
use crate::storage::WriteOutcome;

/// POST /{slug}: 本文 `{"target": URL}` でスラッグを登録する。
pub async fn handle_create(
    State(state): State<Arc<GatewayState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SlugTarget>), GatewayError> {
    guard_write(&state, &headers, &body)?;
    let request = parse_target(&body)?;

    match state.store.create_if_absent(&slug, &request.target).await? {
        WriteOutcome::Applied => {
            tracing::info!(slug = %slug, target = %request.target, "スラッグを登録しました");
            Ok((StatusCode::CREATED, Json(request)))
        }
        WriteOutcome::PreconditionFailed => Err(GatewayError::SlugExists),
    }
}
