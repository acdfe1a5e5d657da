//! # Shortlink Gateway
//!
//! 署名付きリクエストでのみ書き込めるURL短縮サービス。
//!
//! ## 役割
//! - 認可判定（署名の有効性と鮮度）
//! - スラッグからのリダイレクト
//! - 署名付きリクエストによるスラッグの登録・更新・削除
//!
//! ## API エンドポイント
//! - `POST /authorize`: 認可判定
//! - `GET /{slug}`: リダイレクト
//! - `POST /{slug}` / `PUT /{slug}` / `DELETE /{slug}`: 書き込み（要署名）
//! - `GET /.well-known/shortlink-keys`: 信頼済み公開鍵の公開
//!
//! 公開鍵素材は起動時に一度だけ取得し、取得や解析に失敗した場合は起動しない。

mod auth;
mod config;
mod endpoints;
mod error;
mod key_source;
mod request_id;
mod storage;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use config::{GatewayConfig, GatewayState};
use endpoints::*;
use storage::MemorySlugStore;

/// ルーティングを構築する。
pub(crate) fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/authorize", post(handle_authorize))
        .route("/.well-known/shortlink-keys", get(handle_trust_info))
        .route(
            "/{slug}",
            get(handle_redirect)
                .post(handle_create)
                .put(handle_update)
                .delete(handle_delete),
        )
        .layer(axum::middleware::from_fn(request_id::with_request_id))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?)
        .init();

    let config = GatewayConfig::from_env()?;

    let source = key_source::from_location(&config.key_location);
    let keys = key_source::load_trusted_keys(source.as_ref()).await?;

    tracing::info!(
        keys = keys.len(),
        grace_period = config.grace_period.as_secs(),
        "Gatewayの設定を読み込みました"
    );

    let state = Arc::new(GatewayState {
        keys,
        grace_period: config.grace_period,
        store: Box::new(MemorySlugStore::new()),
    });

    let app = build_router(state);

    tracing::info!("Gatewayを {} で起動します", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
