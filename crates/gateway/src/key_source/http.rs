//! # HTTP 公開鍵ソース
//!
//! URL経由で公開鍵素材を取得する。本番環境用。

use std::future::Future;
use std::pin::Pin;

use super::KeySource;

/// URL経由で公開鍵素材を取得するソース。
///
/// 2xx以外のステータス、または空のレスポンスは取得失敗として扱う。
pub struct HttpKeySource {
    url: String,
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

impl KeySource for HttpKeySource {
    fn fetch<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
        Box::pin(async move {
            let url = &self.url;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| format!("公開鍵の取得に失敗 ({url}): {e}"))?;
            let status = response.status();
            if !status.is_success() {
                return Err(format!("公開鍵の取得でHTTPエラー: ステータス {status} ({url})"));
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| format!("公開鍵の読み込みに失敗 ({url}): {e}"))?;
            if body.is_empty() {
                return Err(format!("公開鍵の取得: 空のレスポンス ({url})"));
            }
            Ok(body.to_vec())
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
