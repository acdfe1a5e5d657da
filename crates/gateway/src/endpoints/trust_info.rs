//! # GET /.well-known/shortlink-keys
//!
//! 信頼済み公開鍵と猶予期間の公開エンドポイント。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use shortlink_types::TrustInfo;

use crate::config::GatewayState;

/// GET /.well-known/shortlink-keys: 署名者が自分の鍵が信頼されているか確認するために使う。
pub async fn handle_trust_info(State(state): State<Arc<GatewayState>>) -> Json<TrustInfo> {
    Json(TrustInfo {
        keys: state.keys.key_infos(),
        grace_period_secs: state.grace_period.as_secs(),
    })
}
