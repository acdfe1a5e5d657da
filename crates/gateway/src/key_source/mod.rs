//! # 公開鍵素材ソース
//!
//! 起動時に一度だけ公開鍵素材を取得する方法を抽象化する。
//!
//! ## 実装
//! - `FileKeySource`: ローカルファイルから読み込む（`PUBLIC_KEY_FILE`）
//! - `HttpKeySource`: URLから取得する（`PUBLIC_KEY_URL`）

pub mod file;
pub mod http;

pub use file::FileKeySource;
pub use http::HttpKeySource;

use std::future::Future;
use std::pin::Pin;

use shortlink_core::{BootstrapError, TrustedKeySet};

use crate::config::KeyLocation;

/// 公開鍵素材を取得するトレイト。
pub trait KeySource: Send + Sync {
    /// 公開鍵素材（Armorまたはバイナリ）を取得する。
    fn fetch<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>>;

    /// ログ用の取得元表示
    fn describe(&self) -> String;
}

/// 設定された取得元に対応するソースを構築する。
pub fn from_location(location: &KeyLocation) -> Box<dyn KeySource> {
    match location {
        KeyLocation::File(path) => Box::new(FileKeySource::new(path.clone())),
        KeyLocation::Url(url) => Box::new(HttpKeySource::new(url.clone())),
    }
}

/// 公開鍵素材を取得し、信頼済み鍵セットを構築する。
///
/// 取得失敗・形式不正・利用可能な鍵なしのいずれもエラーとなり、起動を中止すべきである。
pub async fn load_trusted_keys(source: &dyn KeySource) -> Result<TrustedKeySet, BootstrapError> {
    tracing::info!(source = %source.describe(), "公開鍵素材を取得します");
    let material = source.fetch().await.map_err(BootstrapError::Fetch)?;
    TrustedKeySet::bootstrap(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticKeySource(Vec<u8>);

    impl KeySource for StaticKeySource {
        fn fetch<'a>(
            &'a self,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingKeySource;

    impl KeySource for FailingKeySource {
        fn fetch<'a>(
            &'a self,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
            Box::pin(async move { Err("connection refused".to_string()) })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_trusted_keys() {
        let signer = shortlink_crypto::Ed25519Signer::from_seed(
            [9u8; 32],
            "Key Source <keys@example.com>",
            1_700_000_000,
        );
        let source = StaticKeySource(signer.public_key_armor().into_bytes());
        let keys = load_trusted_keys(&source).await.unwrap();
        assert_eq!(keys.fingerprints(), vec![signer.fingerprint_hex()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let err = load_trusted_keys(&FailingKeySource).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_material_without_keys_aborts() {
        let err = load_trusted_keys(&StaticKeySource(b"not a key".to_vec()))
            .await
            .unwrap_err();
        assert!(!matches!(err, BootstrapError::Fetch(_)));
    }
}
