//! テスト用の署名者・状態・サーバー起動ヘルパー

use std::sync::Arc;

use base64::Engine;
use shortlink_core::{unix_now, GracePeriod, TrustedKeySet};
use shortlink_crypto::Ed25519Signer;

use crate::config::GatewayState;
use crate::storage::MemorySlugStore;

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// 信頼済み鍵セットに登録される署名者
pub(crate) fn signer() -> Ed25519Signer {
    Ed25519Signer::from_seed([7u8; 32], "Writer <writer@example.com>", 1_700_000_000)
}

/// 信頼済み鍵セットに登録されない署名者
fn untrusted_signer() -> Ed25519Signer {
    Ed25519Signer::from_seed([8u8; 32], "Mallory <mallory@example.com>", 1_700_000_000)
}

pub(crate) fn trusted_keys() -> TrustedKeySet {
    TrustedKeySet::bootstrap(signer().public_key_armor().as_bytes()).unwrap()
}

pub(crate) fn state_with(store: MemorySlugStore) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        keys: trusted_keys(),
        grace_period: GracePeriod::from_secs(60),
        store: Box::new(store),
    })
}

pub(crate) fn test_state() -> Arc<GatewayState> {
    state_with(MemorySlugStore::new())
}

fn header_at(signer: &Ed25519Signer, payload: &str, created: u64) -> String {
    b64().encode(signer.clearsign(payload, created as u32))
}

/// 現在時刻で署名したAuthorizationヘッダー値
pub(crate) fn signed_header(payload: &str) -> String {
    header_at(&signer(), payload, unix_now())
}

/// 猶予期間を過ぎた署名のAuthorizationヘッダー値
pub(crate) fn stale_header(payload: &str) -> String {
    header_at(&signer(), payload, unix_now() - 3600)
}

/// 信頼されていない鍵で現在時刻に署名したAuthorizationヘッダー値
pub(crate) fn untrusted_header(payload: &str) -> String {
    header_at(&untrusted_signer(), payload, unix_now())
}

/// Gatewayを `127.0.0.1:0` で起動し、ベースURLを返す
pub(crate) async fn spawn_gateway(state: Arc<GatewayState>) -> String {
    let app = crate::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}
